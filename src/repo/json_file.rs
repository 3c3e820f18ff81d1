//! User repository backed by a JSON document file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{PersistenceError, UserRecord, UserRepository};
use crate::conversation::UserId;

/// Stores all user records as a JSON array in a single file.
///
/// The whole file is rewritten after every upsert.
#[derive(Debug)]
pub struct JsonFileUserRepository {
    path: PathBuf,
    records: Mutex<BTreeMap<UserId, UserRecord>>,
}

impl JsonFileUserRepository {
    /// Opens the store, loading existing records if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                let list: Vec<UserRecord> = serde_json::from_str(&content)?;
                list.into_iter().map(|r| (r.tg_id, r)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("User store {} not found, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded {} user records from {}", records.len(), path.display());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, records: &BTreeMap<UserId, UserRecord>) -> Result<(), PersistenceError> {
        let list: Vec<&UserRecord> = records.values().collect();
        let json = serde_json::to_string_pretty(&list)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for JsonFileUserRepository {
    async fn upsert_started(&self, user: UserId) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let mut records = self.records.lock().await;
        let previous = records.get(&user).cloned();

        records
            .entry(user)
            .and_modify(|record| record.mark_started(now))
            .or_insert_with(|| UserRecord::started(user, now));

        // Memory must not get ahead of the file.
        if let Err(e) = self.flush(&records).await {
            match previous {
                Some(record) => records.insert(user, record),
                None => records.remove(&user),
            };
            return Err(e);
        }

        Ok(())
    }

    async fn find(&self, user: UserId) -> Result<Option<UserRecord>, PersistenceError> {
        Ok(self.records.lock().await.get(&user).cloned())
    }
}
