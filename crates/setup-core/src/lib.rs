//! # setup-core
//!
//! The PC build compatibility and configuration engine for Ultimate Setup.
//!
//! A shopper assembles a build one category at a time. This crate holds the
//! build, cross-checks the chosen parts against each other, proposes
//! catalog-backed fixes, and steers focus through the category sequence.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog ─▶ Configurator (Selection) ─▶ rules::evaluate ─▶ Resolver ─▶ Navigator
//! ```
//!
//! ## Constraints
//!
//! - Pure and synchronous: no async, no network. Fetching happens behind
//!   [`CatalogSource`], implemented by the app layer.
//! - Deterministic: `BTreeMap` everywhere, integer money, integer wattage math.
//! - Total: selection mutation and rule evaluation never return errors.
//! - Reactive: time only moves when the caller polls through a [`Clock`].

// =============================================================================
// MODULES
// =============================================================================

pub mod attributes;
pub mod cart;
pub mod catalog;
pub mod configurator;
pub mod formats;
pub mod navigator;
pub mod primitives;
pub mod resolver;
pub mod rules;
pub mod selection;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CategoryId, Component, ComponentId, Price, SetupError, SpecValue, UserId};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use cart::{CartPolicy, CartRequest, CartSink, MemoryCart};
pub use catalog::{Catalog, CatalogSource, CatalogState, StaticCatalogSource};
pub use configurator::Configurator;
pub use navigator::{
    Clock, CompletionState, ConfiguratorEvent, ManualClock, Navigator, PendingAdvance, SystemClock,
};
pub use resolver::{CompatibilitySuggestion, Resolution, Resolver};
pub use rules::{CompatibilityIssue, Evaluation, RuleKind, Severity, evaluate};
pub use selection::Selection;

// =============================================================================
// RE-EXPORTS: Persistence
// =============================================================================

pub use formats::{
    ConfigurationSummary, SavedConfiguration, configuration_from_bytes, configuration_to_bytes,
};
pub use storage::{ConfigurationStore, MemoryStore, RedbStore};
