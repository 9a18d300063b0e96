//! # Session Registry
//!
//! Per-user configurators with a hard cap. When the registry is full, the
//! least recently used session is dropped to make room for a new user.
//! Recency is a logical counter bumped on every access, so eviction order
//! does not depend on wall-clock time.

use setup_core::{CatalogState, Configurator, UserId};
use std::collections::BTreeMap;

/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    configurator: Configurator,
    last_used: u64,
}

/// Live configurator sessions keyed by user id.
#[derive(Debug)]
pub struct SessionRegistry {
    entries: BTreeMap<UserId, SessionEntry>,
    capacity: usize,
    counter: u64,
}

impl SessionRegistry {
    /// A registry holding at most `capacity` sessions (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
            counter: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn contains(&self, user: &UserId) -> bool {
        self.entries.contains_key(user)
    }

    /// The user's configurator, created with `create` on first use.
    pub fn get_or_insert_with(
        &mut self,
        user: UserId,
        create: impl FnOnce() -> Configurator,
    ) -> &mut Configurator {
        self.counter = self.counter.saturating_add(1);
        let now = self.counter;

        if !self.entries.contains_key(&user) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }

        let entry = self.entries.entry(user).or_insert_with_key(|user| {
            tracing::debug!(user = %user, "new configurator session");
            SessionEntry {
                configurator: create(),
                last_used: now,
            }
        });
        entry.last_used = now;
        &mut entry.configurator
    }

    /// Point every live session at `state` and re-evaluate it.
    pub fn adopt_catalog(&mut self, state: &CatalogState) {
        for entry in self.entries.values_mut() {
            entry.configurator.adopt_catalog(state);
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(user, _)| user.clone());
        if let Some(user) = oldest {
            self.entries.remove(&user);
            tracing::info!(user = %user, capacity = self.capacity, "evicted least recently used session");
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}
