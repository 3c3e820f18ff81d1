//! Background pruning of idle sessions.
//!
//! A session left waiting for input is otherwise kept forever. The janitor
//! ticks on a fixed interval and drops sessions idle past the timeout; the
//! user's next `/start` creates a fresh one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info};

use super::SessionStore;

/// Messages that can be sent to the janitor.
#[derive(Debug, Clone)]
pub enum JanitorMessage {
    /// Run a sweep immediately.
    PruneNow,
    /// Stop the janitor.
    Shutdown,
}

/// Periodically discards idle sessions.
pub struct SessionJanitor {
    sessions: Arc<SessionStore>,

    /// Sessions idle for longer than this are discarded.
    max_idle: Duration,

    /// Time between sweeps.
    check_interval: Duration,
}

impl SessionJanitor {
    /// Creates a new janitor sweeping once a minute.
    #[must_use]
    pub fn new(sessions: Arc<SessionStore>, max_idle: Duration) -> Self {
        Self {
            sessions,
            max_idle,
            check_interval: Duration::from_secs(60),
        }
    }

    /// Sets the time between sweeps.
    #[must_use]
    pub const fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Runs the sweep loop until shut down.
    pub async fn run(&self, mut rx: mpsc::Receiver<JanitorMessage>) {
        info!(
            "Session janitor started (idle timeout: {}s)",
            self.max_idle.as_secs()
        );

        let mut sweep_timer = interval(self.check_interval);

        loop {
            tokio::select! {
                _ = sweep_timer.tick() => {
                    self.sweep().await;
                }
                msg = rx.recv() => {
                    match msg {
                        Some(JanitorMessage::PruneNow) => {
                            debug!("Received prune request");
                            self.sweep().await;
                        }
                        Some(JanitorMessage::Shutdown) | None => {
                            info!("Session janitor shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Single sweep over all sessions.
    pub async fn sweep(&self) -> usize {
        let pruned = self.sessions.prune_idle(self.max_idle).await;
        if pruned > 0 {
            info!("Discarded {} idle session(s)", pruned);
        }
        pruned
    }
}

impl std::fmt::Debug for SessionJanitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionJanitor")
            .field("max_idle", &self.max_idle)
            .field("check_interval", &self.check_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::UserId;

    #[tokio::test]
    async fn test_sweep_prunes_stale_sessions() {
        let sessions = Arc::new(SessionStore::new());
        let stale = sessions.get_or_create(UserId(1)).await;
        stale.lock().await.backdate(Duration::from_secs(600));
        sessions.get_or_create(UserId(2)).await;

        let janitor = SessionJanitor::new(Arc::clone(&sessions), Duration::from_secs(300));
        assert_eq!(janitor.sweep().await, 1);
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let sessions = Arc::new(SessionStore::new());
        let janitor = SessionJanitor::new(sessions, Duration::from_secs(300))
            .with_check_interval(Duration::from_secs(3600));
        let (tx, rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move { janitor.run(rx).await });
        tx.send(JanitorMessage::PruneNow).await.unwrap();
        tx.send(JanitorMessage::Shutdown).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
