//! # Configuration Storage
//!
//! Saved builds, keyed by an opaque user id and a configuration name.
//!
//! Two backends:
//! - [`MemoryStore`]: a `BTreeMap`, volatile
//! - [`RedbStore`]: disk-backed, one ACID write transaction per mutation
//!
//! Both list configurations sorted by name, and both overwrite on a repeated
//! save under the same name.

mod redb_store;

pub use redb_store::RedbStore;

use crate::formats::{ConfigurationSummary, SavedConfiguration};
use crate::{SetupError, UserId};
use std::collections::BTreeMap;

/// Save/load/delete/list for named configurations.
pub trait ConfigurationStore: Send + Sync {
    /// Store `config` under its name, replacing any previous one.
    fn save(&mut self, user: &UserId, config: &SavedConfiguration) -> Result<(), SetupError>;

    /// Fetch a configuration, or `ConfigurationNotFound`.
    fn load(&self, user: &UserId, name: &str) -> Result<SavedConfiguration, SetupError>;

    /// Remove a configuration. Returns whether it existed.
    fn delete(&mut self, user: &UserId, name: &str) -> Result<bool, SetupError>;

    /// Summaries of a user's configurations, sorted by name.
    fn list(&self, user: &UserId) -> Result<Vec<ConfigurationSummary>, SetupError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<(UserId, String), SavedConfiguration>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurationStore for MemoryStore {
    fn save(&mut self, user: &UserId, config: &SavedConfiguration) -> Result<(), SetupError> {
        self.entries
            .insert((user.clone(), config.name.clone()), config.clone());
        Ok(())
    }

    fn load(&self, user: &UserId, name: &str) -> Result<SavedConfiguration, SetupError> {
        self.entries
            .get(&(user.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| SetupError::ConfigurationNotFound(name.to_string()))
    }

    fn delete(&mut self, user: &UserId, name: &str) -> Result<bool, SetupError> {
        Ok(self
            .entries
            .remove(&(user.clone(), name.to_string()))
            .is_some())
    }

    fn list(&self, user: &UserId) -> Result<Vec<ConfigurationSummary>, SetupError> {
        Ok(self
            .entries
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|(_, config)| config.summary())
            .collect())
    }
}
