//! Group configuration and the seed file that provides it.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::{ValidationError, check_limit, normalize_handle};
use super::window::TimeWindow;
use crate::conversation::{GroupId, LimitKind};

/// Default primary limit for newly seeded groups.
pub const DEFAULT_ETH_LIMIT: f64 = 0.1;

/// Default secondary limit for newly seeded groups.
pub const DEFAULT_SOL_LIMIT: f64 = 0.8;

/// Errors that can occur while loading or validating the seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Group at index {index} has an empty id")]
    EmptyId { index: usize },

    #[error("Duplicate group id found: {id}")]
    DuplicateId { id: GroupId },

    #[error("Group {id} has an invalid {} limit: {source}", .kind.label())]
    InvalidLimit {
        id: GroupId,
        kind: LimitKind,
        source: ValidationError,
    },

    #[error("Group {id} has a blacklist entry that is not a canonical handle: '{handle}'")]
    InvalidHandle { id: GroupId, handle: String },

    #[error("No groups configured")]
    NoGroups,

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Outcome of a blacklist mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotFound,
}

/// A blacklist mutation and the canonical handle it applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEdit {
    pub handle: String,
    pub outcome: BlacklistOutcome,
}

/// Limits and blacklist configured for one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    /// Unique identifier, also used in selection tokens.
    pub id: GroupId,

    /// Name shown on the group button. Falls back to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Primary value limit (ETH, base chain).
    #[serde(default = "default_eth_limit")]
    pub eth_limit: f64,

    /// Secondary value limit (SOL).
    #[serde(default = "default_sol_limit")]
    pub sol_limit: f64,

    /// Blacklisted handles in `@handle` form.
    #[serde(default)]
    pub blacklist: BTreeSet<String>,
}

fn default_eth_limit() -> f64 {
    DEFAULT_ETH_LIMIT
}

fn default_sol_limit() -> f64 {
    DEFAULT_SOL_LIMIT
}

impl GroupConfig {
    /// Creates a group with default limits and an empty blacklist.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(id),
            label: None,
            eth_limit: DEFAULT_ETH_LIMIT,
            sol_limit: DEFAULT_SOL_LIMIT,
            blacklist: BTreeSet::new(),
        }
    }

    /// Returns the display name of the group.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    #[must_use]
    pub const fn limit(&self, kind: LimitKind) -> f64 {
        match kind {
            LimitKind::Eth => self.eth_limit,
            LimitKind::Sol => self.sol_limit,
        }
    }

    /// Sets a limit after checking it is finite and non-negative.
    pub fn set_limit(&mut self, kind: LimitKind, value: f64) -> Result<(), ValidationError> {
        let value = check_limit(value)?;
        match kind {
            LimitKind::Eth => self.eth_limit = value,
            LimitKind::Sol => self.sol_limit = value,
        }
        Ok(())
    }

    /// Adds a handle to the blacklist, normalizing it first.
    pub fn blacklist_add(&mut self, handle: &str) -> Result<BlacklistEdit, ValidationError> {
        let handle = normalize_handle(handle)?;
        let outcome = if self.blacklist.insert(handle.clone()) {
            BlacklistOutcome::Added
        } else {
            BlacklistOutcome::AlreadyPresent
        };
        Ok(BlacklistEdit { handle, outcome })
    }

    /// Removes a handle from the blacklist, normalizing it first.
    pub fn blacklist_remove(&mut self, handle: &str) -> Result<BlacklistEdit, ValidationError> {
        let handle = normalize_handle(handle)?;
        let outcome = if self.blacklist.remove(&handle) {
            BlacklistOutcome::Removed
        } else {
            BlacklistOutcome::NotFound
        };
        Ok(BlacklistEdit { handle, outcome })
    }

    fn check(&self, index: usize) -> Result<(), SeedError> {
        if self.id.as_str().trim().is_empty() {
            return Err(SeedError::EmptyId { index });
        }

        for kind in [LimitKind::Eth, LimitKind::Sol] {
            if let Err(source) = check_limit(self.limit(kind)) {
                return Err(SeedError::InvalidLimit {
                    id: self.id.clone(),
                    kind,
                    source,
                });
            }
        }

        for handle in &self.blacklist {
            if normalize_handle(handle).ok().as_ref() != Some(handle) {
                return Err(SeedError::InvalidHandle {
                    id: self.id.clone(),
                    handle: handle.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Contents of the groups seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Groups offered in the group selection menu, in display order.
    pub groups: Vec<GroupConfig>,

    /// Initial activation window.
    #[serde(default)]
    pub time_window: TimeWindow,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            groups: vec![GroupConfig::new("Group1"), GroupConfig::new("Group2")],
            time_window: TimeWindow::default(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SeedError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates all groups in the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), SeedError> {
        self.validate_all().into_iter().find_map(Result::err).map_or(Ok(()), Err)
    }

    /// Returns one validation result per group.
    #[must_use]
    pub fn validate_all(&self) -> Vec<Result<(), SeedError>> {
        if self.groups.is_empty() {
            return vec![Err(SeedError::NoGroups)];
        }

        let mut seen_ids = HashSet::new();

        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                if !seen_ids.insert(&group.id) {
                    return Err(SeedError::DuplicateId {
                        id: group.id.clone(),
                    });
                }
                group.check(index)
            })
            .collect()
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Checks if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Creates an example configuration for users to reference.
    #[must_use]
    pub fn example() -> Self {
        let mut whales = GroupConfig::new("whales");
        whales.label = Some("Whale Watchers".to_owned());
        whales.eth_limit = 2.5;
        whales.sol_limit = 40.0;
        whales.blacklist.insert("@rugpuller".to_owned());

        let mut degens = GroupConfig::new("degens");
        degens.label = Some("Degen Calls".to_owned());

        Self {
            groups: vec![whales, degens],
            time_window: TimeWindow::default(),
        }
    }
}
