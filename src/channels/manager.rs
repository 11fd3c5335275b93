//! Channel manager — owns the active channels and routes outbound sends.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::channels::{Channel, IncomingMessage, OutgoingResponse};
use crate::error::ChannelError;
use crate::router::Event;

/// Holds the active channels, keyed by name.
#[derive(Default)]
pub struct ChannelManager {
    channels: HashMap<String, Arc<dyn Channel>>,
    /// Channel used for group announcements (reminders, rotation notices).
    announce: Option<String>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Arc<dyn Channel>) {
        // Telegram wins the announce role when present; otherwise the first
        // added channel keeps it.
        if channel.name() == "telegram" || self.announce.is_none() {
            self.announce = Some(channel.name().to_string());
        }
        self.channels.insert(channel.name().to_string(), channel);
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.keys().map(String::as_str).collect()
    }

    /// Start every channel and forward its messages into the event queue.
    pub async fn start_all(&self, events: mpsc::Sender<Event>) -> Result<(), ChannelError> {
        for channel in self.channels.values() {
            let mut stream = channel.start().await?;
            let tx = events.clone();
            let name = channel.name().to_string();
            tokio::spawn(async move {
                while let Some(msg) = stream.next().await {
                    if tx.send(Event::Message(msg)).await.is_err() {
                        tracing::info!(channel = %name, "Event queue closed, stopping forwarder");
                        break;
                    }
                }
            });
        }
        Ok(())
    }

    /// Reply to the sender of `msg` on the channel it arrived on.
    pub async fn respond(&self, msg: &IncomingMessage, text: &str) -> Result<(), ChannelError> {
        let channel =
            self.channels
                .get(&msg.channel)
                .ok_or_else(|| ChannelError::SendFailed {
                    name: msg.channel.clone(),
                    reason: "unknown channel".to_string(),
                })?;
        channel.respond(msg, OutgoingResponse::new(text)).await
    }

    /// Send to an address on the announce channel.
    pub async fn announce(&self, address: &str, text: &str) -> Result<(), ChannelError> {
        let Some(name) = self.announce.as_deref() else {
            return Err(ChannelError::SendFailed {
                name: "announce".to_string(),
                reason: "no channels configured".to_string(),
            });
        };
        // announce is always a key of channels
        self.channels[name].send_text(address, text).await
    }

    pub async fn shutdown_all(&self) {
        for channel in self.channels.values() {
            if let Err(e) = channel.shutdown().await {
                tracing::warn!(channel = %channel.name(), "Shutdown error: {e}");
            }
        }
    }
}
