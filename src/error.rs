//! Error types for rotabot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Rotation error: {0}")]
    Rotation(#[from] RotationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Malformed {document} document: {reason}")]
    Malformed { document: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Rotation state machine errors.
///
/// All of these are recoverable: the router renders them back to the user
/// as a chat message, they never terminate the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("Queue for {category} is empty")]
    Empty { category: String },

    #[error("It is not {username}'s turn in {category}")]
    NotYourTurn { category: String, username: String },

    #[error("A completion claim is already awaiting approval in {category}")]
    AlreadyPending { category: String },

    #[error("No completion claim is pending in {category}")]
    NoPendingClaim { category: String },

    #[error("Only the supervisor may do that")]
    Forbidden,
}

impl RotationError {
    /// Convenience constructor for an unknown category name.
    pub fn unknown_category(name: &str) -> Self {
        Self::NotFound {
            entity: "category",
            name: name.to_string(),
        }
    }
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
