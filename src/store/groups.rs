//! Group configurations shared by all users.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{BlacklistEdit, GroupConfig, ValidationError};
use crate::conversation::{GroupId, LimitKind};

/// Errors raised by group store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupStoreError {
    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Fixed set of groups, each behind its own mutation lock.
///
/// Two users editing the same group are serialized; edits to different
/// groups proceed independently.
#[derive(Debug)]
pub struct GroupStore {
    /// Group ids and display names in menu order.
    order: Vec<(GroupId, String)>,

    groups: HashMap<GroupId, Arc<Mutex<GroupConfig>>>,
}

impl GroupStore {
    /// Builds the store from seed configurations, keeping their order.
    ///
    /// Later duplicates of an id are ignored.
    #[must_use]
    pub fn new(configs: impl IntoIterator<Item = GroupConfig>) -> Self {
        let mut order = Vec::new();
        let mut groups = HashMap::new();

        for config in configs {
            if groups.contains_key(&config.id) {
                debug!("Ignoring duplicate group {}", config.id);
                continue;
            }
            order.push((config.id.clone(), config.display_name().to_owned()));
            groups.insert(config.id.clone(), Arc::new(Mutex::new(config)));
        }

        Self { order, groups }
    }

    /// Group ids and display names in menu order.
    #[must_use]
    pub fn entries(&self) -> &[(GroupId, String)] {
        &self.order
    }

    /// Display name of a group.
    #[must_use]
    pub fn label(&self, id: &GroupId) -> Option<&str> {
        self.order
            .iter()
            .find(|(gid, _)| gid == id)
            .map(|(_, label)| label.as_str())
    }

    fn group(&self, id: &GroupId) -> Result<&Arc<Mutex<GroupConfig>>, GroupStoreError> {
        self.groups
            .get(id)
            .ok_or_else(|| GroupStoreError::UnknownGroup(id.clone()))
    }

    /// Returns a copy of a group's current configuration.
    pub async fn snapshot(&self, id: &GroupId) -> Result<GroupConfig, GroupStoreError> {
        Ok(self.group(id)?.lock().await.clone())
    }

    /// Returns copies of all groups in menu order.
    pub async fn snapshot_all(&self) -> Vec<GroupConfig> {
        let mut all = Vec::with_capacity(self.order.len());
        for (id, _) in &self.order {
            if let Ok(config) = self.snapshot(id).await {
                all.push(config);
            }
        }
        all
    }

    /// Sets one of a group's limits.
    pub async fn set_limit(
        &self,
        id: &GroupId,
        kind: LimitKind,
        value: f64,
    ) -> Result<(), GroupStoreError> {
        let mut group = self.group(id)?.lock().await;
        group.set_limit(kind, value)?;
        debug!("Group {} {} limit set to {}", id, kind.label(), value);
        Ok(())
    }

    /// Adds a handle to a group's blacklist.
    pub async fn blacklist_add(
        &self,
        id: &GroupId,
        handle: &str,
    ) -> Result<BlacklistEdit, GroupStoreError> {
        let mut group = self.group(id)?.lock().await;
        Ok(group.blacklist_add(handle)?)
    }

    /// Removes a handle from a group's blacklist.
    pub async fn blacklist_remove(
        &self,
        id: &GroupId,
        handle: &str,
    ) -> Result<BlacklistEdit, GroupStoreError> {
        let mut group = self.group(id)?.lock().await;
        Ok(group.blacklist_remove(handle)?)
    }
}
