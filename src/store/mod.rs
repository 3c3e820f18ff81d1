//! In-memory conversation state.
//!
//! Sessions are keyed by user and group configurations by group; both use
//! one lock per key.

mod groups;
mod janitor;
mod session;
mod window;

pub use groups::{GroupStore, GroupStoreError};
pub use janitor::{JanitorMessage, SessionJanitor};
pub use session::{PendingInput, Session, SessionStore};
pub use window::TimeWindowStore;
