//! Application settings and Telegram configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Telegram Bot API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub const fn new(bot_token: String) -> Self {
        Self { bot_token }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_BOT_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("TG_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TG_BOT_TOKEN"))?;

        if bot_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        Ok(Self::new(bot_token.trim().to_owned()))
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// JSON document file for user records. In-memory when unset.
    pub users_db_path: Option<PathBuf>,

    /// Seconds of inactivity before a session is discarded (0 disables).
    #[serde(default = "default_session_idle_timeout")]
    pub session_idle_timeout_secs: u64,

    /// Seconds between idle-session sweeps.
    #[serde(default = "default_janitor_interval")]
    pub janitor_interval_secs: u64,
}

fn default_session_idle_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_janitor_interval() -> u64 {
    60
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            users_db_path: None,
            session_idle_timeout_secs: default_session_idle_timeout(),
            janitor_interval_secs: default_janitor_interval(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            users_db_path: std::env::var("USERS_DB_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            session_idle_timeout_secs: std::env::var("SESSION_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_session_idle_timeout),
            janitor_interval_secs: std::env::var("JANITOR_INTERVAL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or_else(default_janitor_interval),
        }
    }

    /// Returns whether idle sessions should be pruned at all.
    #[must_use]
    pub const fn prunes_sessions(&self) -> bool {
        self.session_idle_timeout_secs > 0
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Bot token is empty")]
    EmptyToken,
}
