//! # Property-Based Tests
//!
//! Selection invariants under arbitrary mutation sequences.

use proptest::collection::vec;
use proptest::prelude::*;
use setup_core::attributes::parse_int_or;
use setup_core::{CategoryId, Component, Price, Selection, SpecValue, rules};

fn category(index: usize) -> CategoryId {
    CategoryId::SEQUENCE[index % CategoryId::SEQUENCE.len()]
}

fn part(index: usize, cents: u64) -> Component {
    let category = category(index);
    Component::new(format!("{}-{cents}", category.as_str()), category, "part", Price(cents))
}

proptest! {
    /// Selecting twice in one category keeps only the second component.
    #[test]
    fn select_is_upsert(index in 0usize..7, a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let mut selection = Selection::new();
        selection.select(category(index), part(index, a));
        selection.select(category(index), part(index, b));

        prop_assert_eq!(selection.len(), 1);
        prop_assert_eq!(selection.get(category(index)).map(|c| c.price), Some(Price(b)));
    }

    /// Removing twice equals removing once.
    #[test]
    fn removal_is_idempotent(
        picks in vec((0usize..7, 0u64..1_000_000), 0..20),
        target in 0usize..7,
    ) {
        let mut selection: Selection = picks
            .iter()
            .map(|&(i, cents)| (category(i), part(i, cents)))
            .collect();
        selection.remove(category(target));
        let once = selection.clone();
        selection.remove(category(target));
        prop_assert_eq!(selection, once);
    }

    /// The total is the sum of selected prices, and removal subtracts exactly
    /// the removed component's price.
    #[test]
    fn total_is_additive(
        picks in vec((0usize..7, 0u64..1_000_000), 1..20),
        target in 0usize..7,
    ) {
        let mut selection: Selection = picks
            .iter()
            .map(|&(i, cents)| (category(i), part(i, cents)))
            .collect();
        let expected: u64 = selection.iter().map(|(_, c)| c.price.cents()).sum();
        prop_assert_eq!(selection.total_price(), Price(expected));

        let before = selection.total_price();
        let removed = selection.remove(category(target)).map(|c| c.price).unwrap_or(Price::ZERO);
        prop_assert_eq!(selection.total_price(), before.saturating_sub(removed));
    }

    /// Completeness depends only on required categories.
    #[test]
    fn optional_case_never_changes_completeness(
        picks in vec((0usize..6, 0u64..100_000), 0..12),
        cents in 0u64..100_000,
    ) {
        let mut selection: Selection = picks
            .iter()
            .map(|&(i, c)| (category(i), part(i, c)))
            .collect();
        let before = selection.is_complete();
        let percent = selection.completion_percentage();
        selection.select(CategoryId::Case, part(6, cents));
        prop_assert_eq!(selection.is_complete(), before);
        prop_assert_eq!(selection.completion_percentage(), percent);
        prop_assert_eq!(before, CategoryId::required().all(|c| selection.contains(c)));
    }

    /// Integer parsing never fails and keeps the leading number.
    #[test]
    fn parse_int_keeps_leading_digits(n in 0i64..100_000, suffix in "[A-Za-z ]{0,6}") {
        let text = SpecValue::Text(format!("{n}{suffix}"));
        prop_assert_eq!(parse_int_or(Some(&text), -1), n);
    }

    /// Arbitrary text never panics the parser and falls back when it has no number.
    #[test]
    fn parse_int_total(text in "\\PC{0,16}") {
        let value = SpecValue::Text(text);
        let _ = parse_int_or(Some(&value), 0);
    }

    /// The recommended PSU always keeps the draw within 80% of its rating.
    #[test]
    fn recommended_psu_respects_load_limit(draw in 1i64..5_000) {
        let watts = rules::recommended_psu_watts(draw);
        prop_assert!(draw * 100 <= watts * 80);
        prop_assert!(draw * 100 > (watts - 1) * 80);
    }
}
