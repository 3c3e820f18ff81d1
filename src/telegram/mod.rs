//! Telegram Bot API adapter.
//!
//! Provides the long-polling dispatcher that feeds private-chat messages and
//! button presses into the conversation and delivers its renders.

mod dispatch;
mod keyboard;

pub use dispatch::{TransportError, callback_event, message_event, run};
pub use keyboard::inline_markup;
pub use teloxide::Bot;
