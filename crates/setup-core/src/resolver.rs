//! # Suggestion Resolver
//!
//! Turns a detected conflict into a catalog-backed fix.
//!
//! The resolver scans one category of the catalog and takes the **first**
//! component that satisfies the rule's predicate. Not the cheapest, not the
//! best rated: catalog order is the tie-break, so results are reproducible.
//! No candidate means no suggestion, silently.

use crate::rules::RuleKind;
use crate::{Catalog, CategoryId, Component, Selection};
use serde::{Deserialize, Serialize};

// =============================================================================
// RESOLUTION
// =============================================================================

/// The deferred action carried by a suggestion: put `component` in `category`.
///
/// Applying is a plain upsert, so applying twice equals applying once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub category: CategoryId,
    pub component: Component,
}

impl Resolution {
    /// Perform the upsert on `selection`.
    pub fn apply(&self, selection: &mut Selection) {
        selection.select(self.category, self.component.clone());
    }
}

// =============================================================================
// SUGGESTION
// =============================================================================

/// A remediation for one issue, ready to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilitySuggestion {
    /// Rule that produced the suggestion.
    pub rule: RuleKind,
    /// Category the suggestion replaces.
    pub target_category: CategoryId,
    pub description: String,
    pub resolution: Resolution,
}

impl CompatibilitySuggestion {
    /// Apply this suggestion's resolution to `selection`.
    pub fn apply(&self, selection: &mut Selection) {
        self.resolution.apply(selection);
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// First-match search over a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Find the first `category` component matching `predicate` and wrap it as
    /// a suggestion described by `describe`.
    pub fn suggest<P, D>(
        &self,
        rule: RuleKind,
        category: CategoryId,
        predicate: P,
        describe: D,
    ) -> Option<CompatibilitySuggestion>
    where
        P: Fn(&Component) -> bool,
        D: FnOnce(&Component) -> String,
    {
        let candidate = self.catalog.first_match(category, predicate)?;
        Some(CompatibilitySuggestion {
            rule,
            target_category: category,
            description: describe(candidate),
            resolution: Resolution {
                category,
                component: candidate.clone(),
            },
        })
    }
}

/// Apply every suggestion in list order. Returns how many were applied.
///
/// When two suggestions target the same category the later one wins.
pub fn apply_all(suggestions: &[CompatibilitySuggestion], selection: &mut Selection) -> usize {
    for suggestion in suggestions {
        suggestion.apply(selection);
    }
    suggestions.len()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;

    fn psu(id: &str, watts: i64) -> Component {
        Component::new(id, CategoryId::Psu, format!("{watts}W {id}"), Price(9_000))
            .with_spec("wattage", watts)
    }

    fn watts(c: &Component) -> i64 {
        crate::attributes::read_int(c, crate::attributes::Attribute::Wattage, 0)
    }

    #[test]
    fn first_match_wins_over_better_candidates() {
        let catalog = Catalog::from_components([psu("a", 550), psu("b", 850), psu("c", 1000)]);
        let resolver = Resolver::new(&catalog);

        let suggestion = resolver
            .suggest(
                RuleKind::PowerSupply,
                CategoryId::Psu,
                |c| watts(c) >= 750,
                |c| format!("Use {}", c.name),
            )
            .expect("suggestion");

        assert_eq!(suggestion.resolution.component.id.as_str(), "b");
        assert_eq!(suggestion.target_category, CategoryId::Psu);
        assert_eq!(suggestion.description, "Use 850W b");
    }

    #[test]
    fn no_candidate_yields_nothing() {
        let catalog = Catalog::from_components([psu("a", 450)]);
        let resolver = Resolver::new(&catalog);
        let suggestion = resolver.suggest(
            RuleKind::PowerSupply,
            CategoryId::Psu,
            |c| watts(c) >= 750,
            |c| c.name.clone(),
        );
        assert!(suggestion.is_none());
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let catalog = Catalog::from_components([psu("b", 850)]);
        let suggestion = Resolver::new(&catalog)
            .suggest(RuleKind::PowerSupply, CategoryId::Psu, |_| true, |c| c.name.clone())
            .expect("suggestion");

        let mut once = Selection::new();
        once.select(CategoryId::Psu, psu("old", 450));
        let mut twice = once.clone();

        suggestion.apply(&mut once);
        suggestion.apply(&mut twice);
        suggestion.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_all_uses_list_order() {
        let catalog = Catalog::from_components([psu("first", 750), psu("second", 850)]);
        let resolver = Resolver::new(&catalog);
        let pick = |id: &'static str| {
            resolver
                .suggest(
                    RuleKind::PowerSupply,
                    CategoryId::Psu,
                    move |c| c.id.as_str() == id,
                    |c| c.name.clone(),
                )
                .expect("suggestion")
        };
        let suggestions = vec![pick("first"), pick("second")];

        let mut selection = Selection::new();
        assert_eq!(apply_all(&suggestions, &mut selection), 2);
        assert_eq!(
            selection.get(CategoryId::Psu).map(|c| c.id.as_str()),
            Some("second")
        );
    }
}
