//! User status persistence.
//!
//! The conversation only needs one operation from storage: mark a user as
//! started. Stores implement [`UserRepository`] so the conversation does not
//! depend on any particular backend.

mod json_file;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conversation::UserId;

pub use json_file::JsonFileUserRepository;
pub use memory::InMemoryUserRepository;

/// Errors raised by user record stores.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access user store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode user records: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Lifecycle status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Started,
}

/// Stored document for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub tg_id: UserId,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a freshly started record.
    #[must_use]
    pub fn started(tg_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            tg_id,
            status: UserStatus::Started,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks an existing record as started again.
    pub fn mark_started(&mut self, now: DateTime<Utc>) {
        self.status = UserStatus::Started;
        self.updated_at = now;
    }
}

/// Storage port for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user if absent, otherwise marks the record as started.
    async fn upsert_started(&self, user: UserId) -> Result<(), PersistenceError>;

    /// Looks up a user record.
    async fn find(&self, user: UserId) -> Result<Option<UserRecord>, PersistenceError>;
}
