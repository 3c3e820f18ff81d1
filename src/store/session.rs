//! Per-user conversation sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::conversation::{BlacklistOp, GroupId, LimitKind, State, UserId};

/// Input the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    Limit(LimitKind),
    Blacklist(BlacklistOp),
}

/// Conversation context of one user.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current position in the menu tree.
    pub state: State,

    /// Group chosen in the group selection menu.
    pub selected_group: Option<GroupId>,

    /// Operation waiting for a text reply.
    pub pending: Option<PendingInput>,

    /// Last time slot this user entered successfully.
    pub custom_time_slot: Option<String>,

    last_activity: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session positioned at the main menu.
    #[must_use]
    pub fn new() -> Self {
        Self::at(State::MainMenu)
    }

    /// Creates a placeholder for a user without an active conversation.
    #[must_use]
    pub fn terminated() -> Self {
        Self::at(State::Terminated)
    }

    fn at(state: State) -> Self {
        Self {
            state,
            selected_group: None,
            pending: None,
            custom_time_slot: None,
            last_activity: Instant::now(),
        }
    }

    /// Records activity on the session.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Time since the last recorded activity.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Resets the session to the main menu.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        if let Some(earlier) = self.last_activity.checked_sub(by) {
            self.last_activity = earlier;
        }
    }
}

/// Sessions keyed by user, each behind its own lock.
///
/// Holding a session's lock for a whole event keeps one user's events
/// strictly sequential without blocking other users.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session of a user, if one exists.
    pub async fn get(&self, user: UserId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&user).cloned()
    }

    /// Returns the session of a user, creating one at the main menu.
    pub async fn get_or_create(&self, user: UserId) -> Arc<Mutex<Session>> {
        if let Some(session) = self.get(user).await {
            return session;
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(Session::new()))),
        )
    }

    /// Discards the session of a user.
    pub async fn remove(&self, user: UserId) -> bool {
        self.sessions.write().await.remove(&user).is_some()
    }

    /// Returns the current state of a user's session.
    pub async fn state_of(&self, user: UserId) -> Option<State> {
        let session = self.get(user).await?;
        let state = session.lock().await.state;
        Some(state)
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Checks if there are no live sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops sessions idle for longer than `max_idle`.
    ///
    /// Sessions currently handling an event are kept. Returns the number of
    /// sessions dropped.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| {
            session
                .try_lock()
                .map_or(true, |session| session.idle_for() < max_idle)
        });

        before - sessions.len()
    }
}
