//! # redb-backed Configuration Storage
//!
//! Saved configurations on disk in a single redb table:
//!
//! | key | value |
//! |-----|-------|
//! | `(user, name)` | `USCF` header + postcard payload |
//!
//! Composite keys keep one user's entries contiguous and name-ordered, so
//! listing is a range scan.

use super::ConfigurationStore;
use crate::formats::{
    ConfigurationSummary, SavedConfiguration, configuration_from_bytes, configuration_to_bytes,
};
use crate::{SetupError, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// `(user, configuration name)` -> encoded configuration.
const CONFIGURATIONS: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("configurations");

fn io_err(e: impl std::fmt::Display) -> SetupError {
    SetupError::IoError(e.to_string())
}

/// Disk-backed configuration store.
#[derive(Debug)]
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(CONFIGURATIONS).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }
        tracing::debug!(path = %path.as_ref().display(), "configuration store opened");
        Ok(Self { db })
    }
}

impl ConfigurationStore for RedbStore {
    fn save(&mut self, user: &UserId, config: &SavedConfiguration) -> Result<(), SetupError> {
        let bytes = configuration_to_bytes(config)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(CONFIGURATIONS).map_err(io_err)?;
            table
                .insert((user.as_str(), config.name.as_str()), bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        tracing::debug!(user = %user, name = %config.name, "configuration saved");
        Ok(())
    }

    fn load(&self, user: &UserId, name: &str) -> Result<SavedConfiguration, SetupError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(CONFIGURATIONS).map_err(io_err)?;
        let entry = table.get((user.as_str(), name)).map_err(io_err)?;
        match entry {
            Some(guard) => configuration_from_bytes(guard.value()),
            None => Err(SetupError::ConfigurationNotFound(name.to_string())),
        }
    }

    fn delete(&mut self, user: &UserId, name: &str) -> Result<bool, SetupError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed = {
            let mut table = write_txn.open_table(CONFIGURATIONS).map_err(io_err)?;
            let removed = table.remove((user.as_str(), name)).map_err(io_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn list(&self, user: &UserId) -> Result<Vec<ConfigurationSummary>, SetupError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(CONFIGURATIONS).map_err(io_err)?;

        let mut summaries = Vec::new();
        for entry in table.range((user.as_str(), "")..).map_err(io_err)? {
            let (key, value) = entry.map_err(io_err)?;
            let (owner, name) = key.value();
            if owner != user.as_str() {
                break;
            }
            match configuration_from_bytes(value.value()) {
                Ok(config) => summaries.push(config.summary()),
                Err(e) => {
                    tracing::warn!(user = %user, name, error = %e, "skipping unreadable configuration");
                }
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryId, Component, ComponentId, Price};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn saved(name: &str, gpu_id: &str) -> SavedConfiguration {
        let gpu = Component::new(gpu_id, CategoryId::Gpu, "GPU", Price(50_000))
            .with_compat("minPsu", 650);
        let mut notes = BTreeMap::new();
        notes.insert(ComponentId::new(gpu_id), "quiet fans".to_string());
        SavedConfiguration {
            name: name.to_string(),
            components: [(CategoryId::Gpu, gpu)].into(),
            notes,
            total_price: Price(50_000),
        }
    }

    #[test]
    fn save_load_round_trip() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("configs.redb")).expect("open");
        let user = UserId::new("alice");
        let config = saved("rig", "gpu-1");

        store.save(&user, &config).expect("save");
        assert_eq!(store.load(&user, "rig").expect("load"), config);
    }

    #[test]
    fn survives_reopen() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("configs.redb");
        let user = UserId::new("alice");
        {
            let mut store = RedbStore::open(&path).expect("open");
            store.save(&user, &saved("rig", "gpu-1")).expect("save");
        }
        let store = RedbStore::open(&path).expect("reopen");
        assert_eq!(store.list(&user).expect("list").len(), 1);
    }

    #[test]
    fn list_is_scoped_to_user_and_sorted() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("configs.redb")).expect("open");
        let alice = UserId::new("alice");
        let alicia = UserId::new("alicia");
        store.save(&alice, &saved("b-rig", "g1")).expect("save");
        store.save(&alice, &saved("a-rig", "g2")).expect("save");
        store.save(&alicia, &saved("other", "g3")).expect("save");

        let names: Vec<String> = store
            .list(&alice)
            .expect("list")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["a-rig", "b-rig"]);
    }

    #[test]
    fn overwrite_and_delete() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("configs.redb")).expect("open");
        let user = UserId::new("u");
        store.save(&user, &saved("rig", "old")).expect("save");
        store.save(&user, &saved("rig", "new")).expect("save");

        let loaded = store.load(&user, "rig").expect("load");
        assert_eq!(loaded.components[&CategoryId::Gpu].id.as_str(), "new");

        assert!(store.delete(&user, "rig").expect("delete"));
        assert!(matches!(
            store.load(&user, "rig"),
            Err(SetupError::ConfigurationNotFound(_))
        ));
    }
}
