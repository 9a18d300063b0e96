//! # Selection
//!
//! The build in progress: at most one component per category.
//!
//! `CategoryId` is a closed enum, so a selection can never hold a slot outside
//! the fixed category set; string input is rejected when it is parsed.

use crate::{CategoryId, Component, ComponentId, Price};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One optional component per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    slots: BTreeMap<CategoryId, Component>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the component for `category`, returning the one it replaced.
    pub fn select(&mut self, category: CategoryId, component: Component) -> Option<Component> {
        self.slots.insert(category, component)
    }

    /// Remove the component for `category`. No-op when the slot is empty.
    pub fn remove(&mut self, category: CategoryId) -> Option<Component> {
        self.slots.remove(&category)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn get(&self, category: CategoryId) -> Option<&Component> {
        self.slots.get(&category)
    }

    #[must_use]
    pub fn contains(&self, category: CategoryId) -> bool {
        self.slots.contains_key(&category)
    }

    /// Number of populated categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Populated slots in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &Component)> {
        self.slots.iter().map(|(category, component)| (*category, component))
    }

    /// Sum of selected prices, computed on every call.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.slots.values().map(|c| c.price).sum()
    }

    /// Share of required categories filled, rounded half up, in percent.
    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        let required = CategoryId::required().count();
        let filled = self.required_filled();
        completion_percentage_of(filled, required)
    }

    /// True iff every required category is filled. Optional slots and
    /// compatibility issues do not matter.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        CategoryId::required().all(|c| self.contains(c))
    }

    /// Required categories that are still empty, in sequence order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<CategoryId> {
        CategoryId::required().filter(|c| !self.contains(*c)).collect()
    }

    /// Category → component id view, for persistence and wire payloads.
    #[must_use]
    pub fn component_ids(&self) -> BTreeMap<CategoryId, ComponentId> {
        self.iter().map(|(category, c)| (category, c.id.clone())).collect()
    }

    fn required_filled(&self) -> usize {
        CategoryId::required().filter(|c| self.contains(*c)).count()
    }
}

impl FromIterator<(CategoryId, Component)> for Selection {
    fn from_iter<I: IntoIterator<Item = (CategoryId, Component)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<CategoryId, Component>> for Selection {
    fn from(slots: BTreeMap<CategoryId, Component>) -> Self {
        Self { slots }
    }
}

impl From<Selection> for BTreeMap<CategoryId, Component> {
    fn from(selection: Selection) -> Self {
        selection.slots
    }
}

/// `round(100 * filled / required)` in integer arithmetic; 100 when nothing is required.
#[must_use]
pub fn completion_percentage_of(filled: usize, required: usize) -> u8 {
    if required == 0 {
        return 100;
    }
    let filled = filled.min(required);
    let percent = (filled.saturating_mul(100) + required / 2) / required;
    percent as u8
}

// =============================================================================
// TESTS
// =============================================================================
