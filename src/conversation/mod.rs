//! Menu-driven configuration conversation.
//!
//! Inbound events are matched against a static transition table; each
//! matched row runs one step against the stores and yields exactly one
//! render for the chat.

mod engine;
pub mod render;
pub mod table;
mod types;

#[cfg(test)]
mod proptests;

pub use engine::{Conversation, Outcome};
pub use render::{Button, Keyboard, Render, RenderMode};
pub use types::{Action, BlacklistOp, BotCommand, Event, GroupId, LimitKind, State, UserId};
