//! # Component Catalog
//!
//! The in-memory view of the storefront catalog, grouped by category.
//!
//! Order inside a category is the order the catalog published; the suggestion
//! resolver's first-match-wins tie-break depends on it, so nothing here sorts.
//!
//! Fetching is a boundary concern. The engine only sees the [`CatalogSource`]
//! trait; the app layer implements it over files and HTTP. [`CatalogState`]
//! keeps the last good catalog around when a fetch fails so a retry can be
//! offered without losing anything.

use crate::{CategoryId, Component, ComponentId, SetupError, SpecValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// CATALOG
// =============================================================================

/// Available components per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<CategoryId, Vec<Component>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a flat component list, grouping by `category_id`.
    #[must_use]
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Self {
        let mut catalog = Self::new();
        for component in components {
            catalog.insert(component);
        }
        catalog
    }

    /// Append a component to its category.
    pub fn insert(&mut self, component: Component) {
        self.categories
            .entry(component.category_id)
            .or_default()
            .push(component);
    }

    /// Replace the whole list for one category.
    pub fn set_category(&mut self, category: CategoryId, components: Vec<Component>) {
        self.categories.insert(category, components);
    }

    /// Components of a category; empty when the catalog has none.
    #[must_use]
    pub fn components(&self, category: CategoryId) -> &[Component] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate over every component, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.categories.values().flatten()
    }

    /// Look up a component by id within a category.
    #[must_use]
    pub fn find(&self, category: CategoryId, id: &ComponentId) -> Option<&Component> {
        self.components(category).iter().find(|c| &c.id == id)
    }

    /// Look up a component by id in any category.
    #[must_use]
    pub fn find_by_id(&self, id: &ComponentId) -> Option<&Component> {
        self.iter().find(|c| &c.id == id)
    }

    /// First component of `category`, in catalog order, satisfying `predicate`.
    pub fn first_match<P>(&self, category: CategoryId, predicate: P) -> Option<&Component>
    where
        P: Fn(&Component) -> bool,
    {
        self.components(category).iter().find(|c| predicate(c))
    }

    /// Case-insensitive substring search over id, name and textual specifications.
    ///
    /// An empty query matches everything in scope.
    #[must_use]
    pub fn search(&self, category: Option<CategoryId>, query: &str) -> Vec<&Component> {
        let needle = query.trim().to_lowercase();
        let in_scope: Box<dyn Iterator<Item = &Component>> = match category {
            Some(category) => Box::new(self.components(category).iter()),
            None => Box::new(self.iter()),
        };
        in_scope
            .filter(|c| needle.is_empty() || matches_query(c, &needle))
            .collect()
    }

    /// Restrict to one category (or clone everything).
    #[must_use]
    pub fn filtered(&self, category: Option<CategoryId>) -> Catalog {
        match category {
            None => self.clone(),
            Some(category) => {
                let mut catalog = Catalog::new();
                catalog.set_category(category, self.components(category).to_vec());
                catalog
            }
        }
    }

    /// Categories present in the catalog.
    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.keys().copied()
    }

    /// Total number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn matches_query(component: &Component, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(&component.name)
        || hit(component.id.as_str())
        || component.specifications.values().any(|v| match v {
            SpecValue::Text(s) => hit(s),
            SpecValue::List(items) => items.iter().any(|s| hit(s)),
            SpecValue::Integer(_) | SpecValue::Decimal(_) => false,
        })
}

// =============================================================================
// CATALOG SOURCE
// =============================================================================

/// Where catalogs come from.
///
/// Implementations live at the boundary (file, HTTP). An absent or empty
/// category is not an error: rules treat it as zero candidates.
pub trait CatalogSource {
    /// Fetch all categories, or only `category` when given.
    fn fetch(&self, category: Option<CategoryId>) -> Result<Catalog, SetupError>;
}

/// A source backed by a catalog already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    catalog: Catalog,
}

impl StaticCatalogSource {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn fetch(&self, category: Option<CategoryId>) -> Result<Catalog, SetupError> {
        Ok(self.catalog.filtered(category))
    }
}

// =============================================================================
// CATALOG STATE
// =============================================================================

/// Load state of the catalog as seen by the presentation layer.
///
/// Catalogs are held behind [`Arc`] so any number of sessions can share one
/// fetch; cloning a state never copies components.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    /// No fetch has completed yet.
    #[default]
    Loading,
    /// The last fetch succeeded.
    Ready(Arc<Catalog>),
    /// The last fetch failed; `stale` is the previous catalog (possibly empty).
    Failed { error: String, stale: Arc<Catalog> },
}

impl CatalogState {
    /// The catalog rules should run against: current, stale, or empty.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        static EMPTY: std::sync::OnceLock<Catalog> = std::sync::OnceLock::new();
        match self {
            CatalogState::Ready(catalog) | CatalogState::Failed { stale: catalog, .. } => {
                catalog.as_ref()
            }
            CatalogState::Loading => EMPTY.get_or_init(Catalog::new),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogState::Ready(_))
    }

    /// Whether the presentation layer should offer a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogState::Failed { .. })
    }

    /// Message of the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            CatalogState::Failed { error, .. } => Some(error),
            CatalogState::Loading | CatalogState::Ready(_) => None,
        }
    }

    /// Fold a fetch result into the state.
    ///
    /// Success replaces the catalog wholesale. Failure keeps whatever catalog
    /// was there before as `stale`.
    pub fn apply(&mut self, result: Result<Catalog, SetupError>) {
        match result {
            Ok(catalog) => self.replace(Arc::new(catalog)),
            Err(e) => self.fail(&e),
        }
    }

    /// Install an already shared catalog.
    pub fn replace(&mut self, catalog: Arc<Catalog>) {
        *self = CatalogState::Ready(catalog);
    }

    /// Record a failed fetch, keeping the previous catalog as `stale`.
    pub fn fail(&mut self, error: &SetupError) {
        tracing::warn!(error = %error, "catalog fetch failed; keeping previous catalog");
        let stale = match std::mem::take(self) {
            CatalogState::Ready(c) | CatalogState::Failed { stale: c, .. } => c,
            CatalogState::Loading => Arc::new(Catalog::new()),
        };
        *self = CatalogState::Failed {
            error: error.to_string(),
            stale,
        };
    }
}

// =============================================================================
// TESTS
// =============================================================================
