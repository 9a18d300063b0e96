//! # Core Type Definitions
//!
//! This module contains the data model shared by every part of the engine:
//! - Identifiers (`CategoryId`, `ComponentId`, `UserId`)
//! - Money (`Price`, integer minor units)
//! - Component records and their loosely-typed specification maps (`Component`, `SpecValue`)
//! - Error types (`SetupError`)
//!
//! ## Determinism Guarantees
//!
//! - Money is stored as integer cents, never as a float
//! - `CategoryId` derives `Ord` in navigation order, so every `BTreeMap`
//!   keyed by category iterates cpu → motherboard → … → case

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CATEGORY
// =============================================================================

/// One of the fixed component categories a build is made of.
///
/// The declaration order is the navigation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryId {
    Cpu,
    Motherboard,
    Ram,
    Gpu,
    Storage,
    Psu,
    Case,
}

impl CategoryId {
    /// The ordered category sequence. Drives completion and auto-navigation.
    pub const SEQUENCE: [CategoryId; 7] = [
        CategoryId::Cpu,
        CategoryId::Motherboard,
        CategoryId::Ram,
        CategoryId::Gpu,
        CategoryId::Storage,
        CategoryId::Psu,
        CategoryId::Case,
    ];

    /// Wire name of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Cpu => "cpu",
            CategoryId::Motherboard => "motherboard",
            CategoryId::Ram => "ram",
            CategoryId::Gpu => "gpu",
            CategoryId::Storage => "storage",
            CategoryId::Psu => "psu",
            CategoryId::Case => "case",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            CategoryId::Cpu => "CPU",
            CategoryId::Motherboard => "Motherboard",
            CategoryId::Ram => "RAM",
            CategoryId::Gpu => "Graphics Card",
            CategoryId::Storage => "Storage",
            CategoryId::Psu => "Power Supply",
            CategoryId::Case => "Case",
        }
    }

    /// Whether a build must contain this category to be complete.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !matches!(self, CategoryId::Case)
    }

    /// Position in [`CategoryId::SEQUENCE`].
    #[must_use]
    pub fn position(&self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::SEQUENCE.len())
    }

    /// Next category in the sequence, if any.
    #[must_use]
    pub fn next(&self) -> Option<CategoryId> {
        Self::SEQUENCE.get(self.position().saturating_add(1)).copied()
    }

    /// Previous category in the sequence, if any.
    #[must_use]
    pub fn previous(&self) -> Option<CategoryId> {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::SEQUENCE.get(i).copied())
    }

    /// Iterator over the required categories, in sequence order.
    pub fn required() -> impl Iterator<Item = CategoryId> {
        Self::SEQUENCE.into_iter().filter(CategoryId::is_required)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SetupError::UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque catalog identifier of a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of the current user, supplied by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PRICE
// =============================================================================

/// A non-negative currency amount in minor units (cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    pub const ZERO: Price = Price(0);

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Saturating addition; a cart total never wraps.
    #[must_use]
    pub const fn saturating_add(self, other: Price) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[must_use]
    pub const fn saturating_sub(self, other: Price) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Price::saturating_add)
    }
}

// =============================================================================
// SPECIFICATION VALUES
// =============================================================================

/// A loosely-typed specification value as it appears in catalog records.
///
/// Human-readable formats (JSON, TOML) carry the natural form: `"AM5"`, `65`,
/// `3.5`, `["ATX", "mATX"]`. Binary formats carry a tagged form so values
/// survive a round-trip through non-self-describing encoders.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    List(Vec<String>),
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Text(s) => f.write_str(s),
            SpecValue::Integer(n) => write!(f, "{}", n),
            SpecValue::Decimal(d) => write!(f, "{}", d),
            SpecValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        SpecValue::Text(s.to_string())
    }
}

impl From<String> for SpecValue {
    fn from(s: String) -> Self {
        SpecValue::Text(s)
    }
}

impl From<i64> for SpecValue {
    fn from(n: i64) -> Self {
        SpecValue::Integer(n)
    }
}

impl From<i32> for SpecValue {
    fn from(n: i32) -> Self {
        SpecValue::Integer(n as i64)
    }
}

impl From<f64> for SpecValue {
    fn from(d: f64) -> Self {
        SpecValue::Decimal(d)
    }
}

impl From<Vec<String>> for SpecValue {
    fn from(items: Vec<String>) -> Self {
        SpecValue::List(items)
    }
}

/// Binary wire form. Variant order is part of the persistence format.
#[derive(Serialize)]
enum TaggedSpecValueRef<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    List(&'a [String]),
}

#[derive(Deserialize)]
enum TaggedSpecValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    List(Vec<String>),
}

impl Serialize for SpecValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            return match self {
                SpecValue::Text(s) => serializer.serialize_str(s),
                SpecValue::Integer(n) => serializer.serialize_i64(*n),
                SpecValue::Decimal(d) => serializer.serialize_f64(*d),
                SpecValue::List(items) => items.serialize(serializer),
            };
        }
        let tagged = match self {
            SpecValue::Text(s) => TaggedSpecValueRef::Text(s),
            SpecValue::Integer(n) => TaggedSpecValueRef::Integer(*n),
            SpecValue::Decimal(d) => TaggedSpecValueRef::Decimal(*d),
            SpecValue::List(items) => TaggedSpecValueRef::List(items),
        };
        tagged.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SpecValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            return deserializer.deserialize_any(SpecValueVisitor);
        }
        Ok(match TaggedSpecValue::deserialize(deserializer)? {
            TaggedSpecValue::Text(s) => SpecValue::Text(s),
            TaggedSpecValue::Integer(n) => SpecValue::Integer(n),
            TaggedSpecValue::Decimal(d) => SpecValue::Decimal(d),
            TaggedSpecValue::List(items) => SpecValue::List(items),
        })
    }
}

struct SpecValueVisitor;

impl<'de> Visitor<'de> for SpecValueVisitor {
    type Value = SpecValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number or a list of strings")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SpecValue, E> {
        Ok(SpecValue::Text(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SpecValue, E> {
        Ok(SpecValue::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SpecValue, E> {
        Ok(i64::try_from(v)
            .map(SpecValue::Integer)
            .unwrap_or_else(|_| SpecValue::Text(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SpecValue, E> {
        Ok(SpecValue::Decimal(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SpecValue, E> {
        Ok(SpecValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SpecValue, E> {
        Ok(SpecValue::Text(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SpecValue, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<SpecValue>()? {
            items.push(item.to_string());
        }
        Ok(SpecValue::List(items))
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// One purchasable part as published by the catalog.
///
/// Immutable from the engine's point of view for the duration of a session.
/// Attribute names in `specifications` are not standardized; see
/// [`crate::attributes`] for the alias tables the rules read through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Price,
    /// 0.0 – 5.0 stars. Display only.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub specifications: BTreeMap<String, SpecValue>,
    /// Normalized cross-cutting attributes, when the catalog provides them.
    #[serde(default)]
    pub compatibility: Option<BTreeMap<String, SpecValue>>,
}

impl Component {
    /// Create a component with empty specification maps.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category_id: CategoryId,
        name: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: ComponentId::new(id),
            category_id,
            name: name.into(),
            price,
            rating: 0.0,
            specifications: BTreeMap::new(),
            compatibility: None,
        }
    }

    /// Builder: add a `specifications` entry.
    #[must_use]
    pub fn with_spec(mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.specifications.insert(key.into(), value.into());
        self
    }

    /// Builder: add a `compatibility` entry, creating the map if absent.
    #[must_use]
    pub fn with_compat(mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.compatibility
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builder: set the rating, clamped into 0.0 – 5.0.
    #[must_use]
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating.clamp(0.0, 5.0);
        self
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised at the engine's boundaries.
///
/// Selection mutation and rule evaluation never produce these; they are
/// reserved for string parsing, catalog fetches, persistence and the cart gate.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A category name outside the fixed set.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The catalog has no component with this id in the category.
    #[error("Component not found: {1} in {0}")]
    ComponentNotFound(CategoryId, ComponentId),

    /// No saved configuration with this name for the user.
    #[error("Configuration not found: {0}")]
    ConfigurationNotFound(String),

    /// The catalog could not be fetched.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The checkout gate refused a build with outstanding issues.
    #[error("Build has {0} unresolved compatibility issue(s)")]
    IssuesPresent(usize),

    /// The cart gate refused an empty build.
    #[error("Build has no components")]
    EmptySelection,

    /// Input failed validation at an API or CLI boundary.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_sequence_navigation() {
        assert_eq!(CategoryId::Cpu.next(), Some(CategoryId::Motherboard));
        assert_eq!(CategoryId::Psu.next(), Some(CategoryId::Case));
        assert_eq!(CategoryId::Case.next(), None);
        assert_eq!(CategoryId::Cpu.previous(), None);
        assert_eq!(CategoryId::Ram.previous(), Some(CategoryId::Motherboard));
    }

    #[test]
    fn only_case_is_optional() {
        let required: Vec<_> = CategoryId::required().collect();
        assert_eq!(required.len(), 6);
        assert!(!required.contains(&CategoryId::Case));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("GPU".parse::<CategoryId>().expect("parse"), CategoryId::Gpu);
        assert_eq!(" psu ".parse::<CategoryId>().expect("parse"), CategoryId::Psu);
        assert!(matches!(
            "monitor".parse::<CategoryId>(),
            Err(SetupError::UnknownCategory(_))
        ));
    }

    #[test]
    fn price_display_and_sum() {
        let total: Price = [Price(19_999), Price(1)].into_iter().sum();
        assert_eq!(total, Price(20_000));
        assert_eq!(total.to_string(), "$200.00");
        assert_eq!(Price(5).to_string(), "$0.05");
    }

    #[test]
    fn spec_value_display() {
        assert_eq!(SpecValue::from("AM5").to_string(), "AM5");
        assert_eq!(SpecValue::from(65).to_string(), "65");
        assert_eq!(
            SpecValue::List(vec!["ATX".into(), "mATX".into()]).to_string(),
            "ATX, mATX"
        );
    }

    #[test]
    fn rating_is_clamped() {
        let c = Component::new("x", CategoryId::Cpu, "X", Price(1)).with_rating(7.5);
        assert_eq!(c.rating, 5.0);
    }
}
