//! Shared activation window.

use tokio::sync::RwLock;

use crate::config::TimeWindow;

/// The single activation window configured for the bot.
#[derive(Debug, Default)]
pub struct TimeWindowStore {
    window: RwLock<TimeWindow>,
}

impl TimeWindowStore {
    #[must_use]
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window: RwLock::new(window),
        }
    }

    /// Returns the current window.
    pub async fn get(&self) -> TimeWindow {
        self.window.read().await.clone()
    }

    /// Replaces the window, returning the previous one.
    pub async fn set(&self, window: TimeWindow) -> TimeWindow {
        std::mem::replace(&mut *self.window.write().await, window)
    }
}
