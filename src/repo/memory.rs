//! In-memory user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{PersistenceError, UserRecord, UserRepository};
use crate::conversation::UserId;

/// Keeps user records for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    records: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Checks if no user has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_started(&self, user: UserId) -> Result<(), PersistenceError> {
        let now = Utc::now();
        self.records
            .write()
            .await
            .entry(user)
            .and_modify(|record| record.mark_started(now))
            .or_insert_with(|| UserRecord::started(user, now));
        Ok(())
    }

    async fn find(&self, user: UserId) -> Result<Option<UserRecord>, PersistenceError> {
        Ok(self.records.read().await.get(&user).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::UserStatus;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = InMemoryUserRepository::new();
        let user = UserId(77);

        repo.upsert_started(user).await.unwrap();
        let first = repo.find(user).await.unwrap().unwrap();

        repo.upsert_started(user).await.unwrap();
        let second = repo.find(user).await.unwrap().unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(second.status, UserStatus::Started);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find(UserId(1)).await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }
}
