//! Event router — the single writer over the rotation engine.
//!
//! All external events (channel messages and reminder ticks) funnel into one
//! queue and are handled here one at a time, so engine operations never
//! interleave and the snapshot write of one event completes before the next
//! event is looked at. There is no locking because there is no concurrent
//! access.

use tokio::sync::mpsc;

use crate::channels::{ChannelManager, IncomingMessage};
use crate::commands::{self, Command, HELP_TEXT};
use crate::error::Error;
use crate::rotation::engine::{Audience, EngineReply, RotationEngine};
use crate::rotation::model::ParticipantId;

/// An external event, processed strictly in arrival order.
#[derive(Debug)]
pub enum Event {
    /// A chat message from any channel.
    Message(IncomingMessage),
    /// The reminder schedule fired.
    ReminderTick,
}

/// Owns the engine and the channels; consumes the event queue.
pub struct Router {
    engine: RotationEngine,
    channels: ChannelManager,
    group_address: String,
}

impl Router {
    pub fn new(engine: RotationEngine, channels: ChannelManager) -> Self {
        let group_address = engine.config().group_chat_id.to_string();
        Self {
            engine,
            channels,
            group_address,
        }
    }

    /// Process events until the queue closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        while let Some(event) = events.recv().await {
            match event {
                Event::Message(msg) => self.handle_message(msg).await,
                Event::ReminderTick => self.handle_reminder().await,
            }
        }
        self.channels.shutdown_all().await;
    }

    async fn handle_message(&mut self, msg: IncomingMessage) {
        let command = match commands::parse(&msg.text) {
            None => {
                tracing::debug!(channel = %msg.channel, "Ignoring non-command message");
                return;
            }
            Some(Err(usage)) => {
                self.reply(&msg, usage).await;
                return;
            }
            Some(Ok(command)) => command,
        };

        tracing::info!(channel = %msg.channel, user = %msg.user_id, ?command, "Handling command");

        match self.dispatch(&msg, command).await {
            Ok(reply) => self.deliver(&msg, reply).await,
            Err(Error::Rotation(e)) => self.reply(&msg, &e.to_string()).await,
            Err(e) => {
                tracing::error!("Command failed: {e}");
                self.reply(&msg, "Something went wrong; please try again.")
                    .await;
            }
        }
    }

    /// Translate a command into one engine operation.
    async fn dispatch(
        &mut self,
        msg: &IncomingMessage,
        command: Command,
    ) -> crate::error::Result<EngineReply> {
        let actor = msg.participant();
        match command {
            Command::Start => Ok(self.engine.on_start(&actor)),
            Command::Help => Ok(help_reply()),
            Command::Status => Ok(self.engine.on_status_query()),
            Command::Join { category } => self.engine.on_join_request(&category, &actor).await,
            Command::Leave { category } => self.engine.on_leave_request(&category, &actor).await,
            Command::Done { category } => self.engine.on_completion_claim(&category, &actor).await,
            Command::Confirm { category } => {
                self.engine.on_supervisor_approve(&category, &actor.id).await
            }
            Command::Reject { category } => {
                self.engine.on_supervisor_reject(&category, &actor.id).await
            }
            Command::AddUser { username, category } => {
                self.engine
                    .on_supervisor_add_participant(&category, &actor.id, &username)
                    .await
            }
            Command::RemoveUser { username, category } => {
                self.engine
                    .on_supervisor_remove_participant(&category, &actor.id, &username)
                    .await
            }
        }
    }

    /// Render the engine's notification directives to their audiences.
    async fn deliver(&self, msg: &IncomingMessage, reply: EngineReply) {
        for notification in reply.notifications {
            let result = match &notification.audience {
                Audience::Actor => self.channels.respond(msg, &notification.text).await,
                Audience::Group => {
                    self.channels
                        .announce(&self.group_address, &notification.text)
                        .await
                }
                Audience::Participant(ParticipantId::Telegram(id)) => {
                    // A Telegram DM chat id equals the user id
                    self.channels
                        .announce(&id.to_string(), &notification.text)
                        .await
                }
                Audience::Participant(ParticipantId::Synthetic(_)) => {
                    // Placeholder participants have no chat to reach
                    tracing::debug!("Skipping direct notification to placeholder participant");
                    continue;
                }
            };
            if let Err(e) = result {
                tracing::warn!("Failed to deliver notification: {e}");
            }
        }
    }

    /// Announce the current duty-holder of every non-empty queue.
    async fn handle_reminder(&self) {
        for (category, head) in self.engine.reminder_heads() {
            let Some(head) = head else {
                continue;
            };
            let text = format!("Duty reminder — {category}: it is {}'s turn.", head.username);
            if let Err(e) = self.channels.announce(&self.group_address, &text).await {
                tracing::warn!(category, "Failed to send reminder: {e}");
            }
        }
    }

    async fn reply(&self, msg: &IncomingMessage, text: &str) {
        if let Err(e) = self.channels.respond(msg, text).await {
            tracing::warn!("Failed to reply: {e}");
        }
    }
}

fn help_reply() -> EngineReply {
    EngineReply {
        notifications: vec![crate::rotation::engine::Notification {
            audience: Audience::Actor,
            text: HELP_TEXT.to_string(),
        }],
    }
}
