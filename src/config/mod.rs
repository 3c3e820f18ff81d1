//! Configuration module for the group configuration bot.
//!
//! Handles environment settings, the groups seed file, the activation
//! time window and validation of user-entered values.

mod groups;
mod settings;
mod validation;
mod window;

pub use groups::{
    BlacklistEdit, BlacklistOutcome, BotConfig, DEFAULT_ETH_LIMIT, DEFAULT_SOL_LIMIT, GroupConfig, SeedError,
};
pub use settings::{BotSettings, ConfigError, TelegramConfig};
pub use validation::{ValidationError, check_limit, normalize_handle, parse_limit};
pub use window::{DEFAULT_TIME_WINDOW, TimeWindow};
