//! Participant identity and wire types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable participant identity.
///
/// Either the numeric Telegram user id, or a synthetic unique id minted for
/// supervisor-entered placeholder participants who have never talked to the
/// bot themselves. Serializes untagged so queue entries keep the
/// `{id: integer|string, username: string}` wire schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParticipantId {
    Telegram(i64),
    Synthetic(String),
}

impl ParticipantId {
    /// Mint a fresh synthetic id.
    pub fn synthetic() -> Self {
        Self::Synthetic(Uuid::new_v4().to_string())
    }

    /// Stable string form, used as a JSON object key in the membership
    /// document.
    pub fn key(&self) -> String {
        match self {
            Self::Telegram(id) => id.to_string(),
            Self::Synthetic(id) => id.clone(),
        }
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Telegram(id) => write!(f, "{id}"),
            Self::Synthetic(id) => write!(f, "{id}"),
        }
    }
}

/// A queue member.
///
/// `username` is cosmetic and mutable; identity comparisons always go
/// through `id`. The name is only used for rendering and for supervisor
/// lookup-by-name commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub username: String,
}

impl Participant {
    pub fn new(id: ParticipantId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// A placeholder participant entered by the supervisor by name.
    pub fn placeholder(username: impl Into<String>) -> Self {
        Self::new(ParticipantId::synthetic(), username)
    }
}
