//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration.
///
/// The category set is static: it is fixed here at startup and is not
/// user-mutable at runtime.
#[derive(Debug, Clone)]
pub struct RotaConfig {
    /// Duty categories, each with its own independent rotation queue.
    pub categories: Vec<String>,
    /// The single fixed supervisor identity (numeric Telegram id).
    pub supervisor_id: i64,
    /// Group chat that receives rotation announcements and reminders.
    pub group_chat_id: i64,
    /// Whether a self-service leave is refused (supervisor removal only).
    pub leave_requires_approval: bool,
    /// Whether the supervisor may reject a pending completion claim.
    pub allow_reject: bool,
    /// Path of the persisted snapshot file.
    pub snapshot_path: PathBuf,
    /// Cron expression for the daily duty reminder.
    pub reminder_cron: String,
}

impl Default for RotaConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                "Trash".to_string(),
                "Dishes".to_string(),
                "Cleaning".to_string(),
            ],
            supervisor_id: 0,
            group_chat_id: 0,
            leave_requires_approval: false,
            allow_reject: false,
            snapshot_path: PathBuf::from("./data/rotabot.json"),
            // 09:00 every day
            reminder_cron: "0 0 9 * * *".to_string(),
        }
    }
}

impl RotaConfig {
    /// Build configuration from environment variables.
    ///
    /// Required: `ROTABOT_SUPERVISOR_ID`, `ROTABOT_GROUP_CHAT_ID`.
    /// Optional: `ROTABOT_CATEGORIES` (comma-separated),
    /// `ROTABOT_SNAPSHOT_PATH`, `ROTABOT_REMINDER_CRON`,
    /// `ROTABOT_LEAVE_REQUIRES_APPROVAL`, `ROTABOT_ALLOW_REJECT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let supervisor_id = require_i64("ROTABOT_SUPERVISOR_ID")?;
        let group_chat_id = require_i64("ROTABOT_GROUP_CHAT_ID")?;

        let categories = match std::env::var("ROTABOT_CATEGORIES") {
            Ok(raw) => {
                let cats: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if cats.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: "ROTABOT_CATEGORIES".to_string(),
                        message: "category list is empty".to_string(),
                    });
                }
                cats
            }
            Err(_) => defaults.categories,
        };

        let snapshot_path = std::env::var("ROTABOT_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.snapshot_path);

        let reminder_cron =
            std::env::var("ROTABOT_REMINDER_CRON").unwrap_or(defaults.reminder_cron);
        // Fail at startup rather than at first tick.
        cron::Schedule::from_str(&reminder_cron).map_err(|e| ConfigError::InvalidValue {
            key: "ROTABOT_REMINDER_CRON".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            categories,
            supervisor_id,
            group_chat_id,
            leave_requires_approval: env_flag("ROTABOT_LEAVE_REQUIRES_APPROVAL"),
            allow_reject: env_flag("ROTABOT_ALLOW_REJECT"),
            snapshot_path,
            reminder_cron,
        })
    }

    /// Whether `name` is one of the configured categories.
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

/// Telegram credentials, kept out of `RotaConfig` so the engine and tests
/// never see them.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
}

impl TelegramConfig {
    /// Read the bot token from `TELEGRAM_BOT_TOKEN`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(|t| Self {
                bot_token: SecretString::from(t),
            })
    }
}

fn require_i64(key: &str) -> Result<i64, ConfigError> {
    let raw = std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected an integer, got {raw:?}"),
    })
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_categories() {
        let config = RotaConfig::default();
        assert!(!config.categories.is_empty());
        assert!(config.has_category("Trash"));
        assert!(!config.has_category("Nope"));
    }

    #[test]
    fn default_cron_parses() {
        let config = RotaConfig::default();
        assert!(cron::Schedule::from_str(&config.reminder_cron).is_ok());
    }

    #[test]
    fn category_match_is_exact() {
        let config = RotaConfig::default();
        assert!(!config.has_category("trash"));
        assert!(!config.has_category("Tras"));
    }
}
