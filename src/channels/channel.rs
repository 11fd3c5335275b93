//! The `Channel` trait and message types shared by all transports.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::rotation::model::{Participant, ParticipantId};

/// Stream of incoming messages produced by a started channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// An inbound message from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Name of the channel the message arrived on.
    pub channel: String,
    /// Channel-native stable user id (numeric for Telegram).
    pub user_id: String,
    /// Display name, when the channel provides one.
    pub user_name: Option<String>,
    /// Raw message text.
    pub text: String,
    /// Channel-specific routing data (e.g. Telegram chat_id).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, text: &str) -> Self {
        Self {
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: None,
            text: text.to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// The acting participant for the rotation engine. Numeric user ids
    /// become Telegram ids; anything else is treated as a synthetic id.
    pub fn participant(&self) -> Participant {
        let id = match self.user_id.parse::<i64>() {
            Ok(n) => ParticipantId::Telegram(n),
            Err(_) => ParticipantId::Synthetic(self.user_id.clone()),
        };
        let username = self.user_name.clone().unwrap_or_else(|| self.user_id.clone());
        Participant::new(id, username)
    }
}

/// An outbound reply to a specific incoming message.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// A message transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Stable channel name ("telegram", "cli").
    fn name(&self) -> &str;

    /// Start listening; returns the stream of incoming messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Reply to the sender of `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Send to a channel-native address (a chat id for Telegram).
    async fn send_text(&self, address: &str, text: &str) -> Result<(), ChannelError>;

    /// Verify the channel can reach its backend.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Release resources on shutdown.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_user_id_becomes_telegram_participant() {
        let msg = IncomingMessage::new("telegram", "1344592813", "/status").with_user_name("ali");
        let p = msg.participant();
        assert_eq!(p.id, ParticipantId::Telegram(1344592813));
        assert_eq!(p.username, "ali");
    }

    #[test]
    fn non_numeric_user_id_becomes_synthetic() {
        let msg = IncomingMessage::new("cli", "local-user", "/status");
        let p = msg.participant();
        assert_eq!(p.id, ParticipantId::Synthetic("local-user".into()));
        // No display name: falls back to the id
        assert_eq!(p.username, "local-user");
    }

    #[test]
    fn metadata_defaults_to_null() {
        let msg = IncomingMessage::new("cli", "u", "hi");
        assert!(msg.metadata.is_null());
    }
}
