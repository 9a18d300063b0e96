//! # Configurator
//!
//! The per-session configuration state manager.
//!
//! A `Configurator` owns one build in progress and everything derived from it.
//! It is constructed explicitly and owned by exactly one session context; there
//! is no shared instance.
//!
//! Every mutation follows the same order:
//!
//! 1. apply the change to the [`Selection`]
//! 2. re-run [`evaluate`] against the current catalog
//! 3. let the [`Navigator`] react
//! 4. re-check completion
//!
//! Evaluation therefore always observes the selection as of the last completed
//! mutation. Notifications for the presentation layer accumulate in an event
//! queue drained with [`Configurator::drain_events`].

use crate::catalog::{CatalogSource, CatalogState};
use crate::formats::SavedConfiguration;
use crate::navigator::{Clock, CompletionState, ConfiguratorEvent, Navigator, SystemClock};
use crate::primitives::{MAX_CONFIGURATION_NAME_LENGTH, MAX_NOTE_LENGTH};
use crate::resolver::{CompatibilitySuggestion, apply_all};
use crate::rules::{CompatibilityIssue, Evaluation, evaluate};
use crate::{Catalog, CategoryId, Component, ComponentId, Price, Selection, SetupError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One shopper's build session.
#[derive(Debug, Clone)]
pub struct Configurator {
    selection: Selection,
    catalog: CatalogState,
    evaluation: Evaluation,
    notes: BTreeMap<ComponentId, String>,
    name: Option<String>,
    navigator: Navigator,
    clock: Arc<dyn Clock>,
    events: Vec<ConfiguratorEvent>,
}

impl Configurator {
    /// A session over a loaded catalog, on the system clock.
    ///
    /// Pass an `Arc<Catalog>` to share one catalog between sessions.
    #[must_use]
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self::with_clock(catalog, Arc::new(SystemClock::new()))
    }

    /// A session over a loaded catalog with an injected clock.
    #[must_use]
    pub fn with_clock(catalog: impl Into<Arc<Catalog>>, clock: Arc<dyn Clock>) -> Self {
        Self::with_catalog_state(CatalogState::Ready(catalog.into()), clock)
    }

    /// A session whose catalog has not been fetched yet.
    #[must_use]
    pub fn loading(clock: Arc<dyn Clock>) -> Self {
        Self::with_catalog_state(CatalogState::Loading, clock)
    }

    /// A session starting from any catalog state, e.g. a failed first fetch.
    #[must_use]
    pub fn with_catalog_state(catalog: CatalogState, clock: Arc<dyn Clock>) -> Self {
        Self {
            selection: Selection::new(),
            catalog,
            evaluation: Evaluation::default(),
            notes: BTreeMap::new(),
            name: None,
            navigator: Navigator::new(),
            clock,
            events: Vec::new(),
        }
    }

    /// Replace the navigator, e.g. to change the debounce delay.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Navigator) -> Self {
        self.navigator = navigator;
        self
    }

    // -------------------------------------------------------------------------
    // Selection mutations
    // -------------------------------------------------------------------------

    /// Upsert `component` into `category`. Always succeeds; conflicts show up
    /// in [`Configurator::issues`].
    pub fn select_component(&mut self, category: CategoryId, component: Component) {
        tracing::debug!(category = %category, component = %component.id, "component selected");
        self.selection.select(category, component);
        self.reevaluate();
        self.navigator.on_selected(category, self.clock.now_ms());
        self.check_completion();
    }

    /// Upsert by category name. Unknown names are ignored and return `false`.
    pub fn select_by_key(&mut self, category: &str, component: Component) -> bool {
        match category.parse::<CategoryId>() {
            Ok(category) => {
                self.select_component(category, component);
                true
            }
            Err(_) => {
                tracing::debug!(category, "ignoring selection for unknown category");
                false
            }
        }
    }

    /// Select the catalog component `id` in `category`.
    pub fn select_by_id(&mut self, category: CategoryId, id: &ComponentId) -> Result<(), SetupError> {
        let component = self
            .catalog
            .catalog()
            .find(category, id)
            .cloned()
            .ok_or_else(|| SetupError::ComponentNotFound(category, id.clone()))?;
        self.select_component(category, component);
        Ok(())
    }

    /// Empty `category`. A no-op, without events, when it is already empty.
    pub fn remove_component(&mut self, category: CategoryId) -> Option<Component> {
        let removed = self.selection.remove(category)?;
        tracing::debug!(category = %category, component = %removed.id, "component removed");
        self.reevaluate();
        if let Some(event) = self.navigator.on_removed(category, &self.selection) {
            self.events.push(event);
        }
        self.check_completion();
        Some(removed)
    }

    /// Remove by category name. Unknown names are ignored.
    pub fn remove_by_key(&mut self, category: &str) -> Option<Component> {
        let category = category.parse::<CategoryId>().ok()?;
        self.remove_component(category)
    }

    /// Clear the selection, notes and name, and re-arm the completion dialog.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.notes.clear();
        self.name = None;
        self.navigator.reset();
        self.events.clear();
        self.reevaluate();
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Recomputed from the selection on every call.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.selection.total_price()
    }

    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        self.selection.completion_percentage()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selection.is_complete()
    }

    #[must_use]
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    #[must_use]
    pub fn issues(&self) -> &[CompatibilityIssue] {
        &self.evaluation.issues
    }

    #[must_use]
    pub fn suggestions(&self) -> &[CompatibilitySuggestion] {
        &self.evaluation.suggestions
    }

    // -------------------------------------------------------------------------
    // Suggestions
    // -------------------------------------------------------------------------

    /// Apply the suggestion at `index` as a regular selection.
    pub fn apply_suggestion(&mut self, index: usize) -> Result<(), SetupError> {
        let suggestion = self
            .evaluation
            .suggestions
            .get(index)
            .cloned()
            .ok_or_else(|| {
                SetupError::InvalidInput(format!(
                    "suggestion index {index} out of range ({} available)",
                    self.evaluation.suggestions.len()
                ))
            })?;
        let resolution = suggestion.resolution;
        self.select_component(resolution.category, resolution.component);
        Ok(())
    }

    /// Apply every current suggestion in list order, then re-evaluate once.
    ///
    /// Returns the number applied. Bulk application does not schedule
    /// auto-advances; it only re-checks completion.
    pub fn apply_all_suggestions(&mut self) -> usize {
        let suggestions = std::mem::take(&mut self.evaluation.suggestions);
        if suggestions.is_empty() {
            return 0;
        }
        let applied = apply_all(&suggestions, &mut self.selection);
        tracing::debug!(applied, "applied all suggestions");
        self.reevaluate();
        self.check_completion();
        applied
    }

    // -------------------------------------------------------------------------
    // Notes & name
    // -------------------------------------------------------------------------

    /// Attach a note to a component. Replaces any existing note.
    pub fn set_note(&mut self, id: ComponentId, note: impl Into<String>) -> Result<(), SetupError> {
        let note = note.into();
        if note.len() > MAX_NOTE_LENGTH {
            return Err(SetupError::InvalidInput(format!(
                "note exceeds {MAX_NOTE_LENGTH} bytes"
            )));
        }
        if note.trim().is_empty() {
            self.notes.remove(&id);
        } else {
            self.notes.insert(id, note);
        }
        Ok(())
    }

    pub fn clear_note(&mut self, id: &ComponentId) -> Option<String> {
        self.notes.remove(id)
    }

    #[must_use]
    pub fn notes(&self) -> &BTreeMap<ComponentId, String> {
        &self.notes
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SetupError> {
        self.name = Some(validate_name(name.into())?);
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Fetch a fresh catalog and re-evaluate. On failure the selection and
    /// the previous catalog are kept; the error is returned for display.
    pub fn refresh_catalog(&mut self, source: &dyn CatalogSource) -> Result<(), SetupError> {
        let outcome = match source.fetch(None) {
            Ok(catalog) => {
                self.catalog.replace(Arc::new(catalog));
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    SetupError::CatalogUnavailable(_) => e,
                    other => SetupError::CatalogUnavailable(other.to_string()),
                };
                self.catalog.fail(&e);
                Err(e)
            }
        };
        self.reevaluate();
        outcome
    }

    /// Take over a catalog state fetched elsewhere and re-evaluate against it.
    /// The selection is kept even when components left the catalog.
    pub fn adopt_catalog(&mut self, state: &CatalogState) {
        self.catalog = state.clone();
        self.reevaluate();
    }

    #[must_use]
    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.catalog.catalog()
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Fire any due auto-advance. Returns whether focus moved.
    pub fn tick(&mut self) -> bool {
        match self.navigator.poll(self.clock.now_ms()) {
            Some(event) => {
                self.events.push(event);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn active_category(&self) -> CategoryId {
        self.navigator.active()
    }

    pub fn navigate_next(&mut self) -> bool {
        self.navigator.navigate_next()
    }

    pub fn navigate_previous(&mut self) -> bool {
        self.navigator.navigate_previous()
    }

    pub fn focus(&mut self, category: CategoryId) -> bool {
        self.navigator.focus(category)
    }

    pub fn set_auto_navigate(&mut self, enabled: bool) {
        self.navigator.set_auto_navigate(enabled);
        if enabled {
            self.check_completion();
        }
    }

    #[must_use]
    pub fn auto_navigate(&self) -> bool {
        self.navigator.auto_navigate()
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn completion_state(&self) -> CompletionState {
        self.navigator.completion()
    }

    pub fn acknowledge_completion(&mut self) {
        self.navigator.acknowledge_completion();
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<ConfiguratorEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn pending_events(&self) -> &[ConfiguratorEvent] {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Capture the current build under `name`. Notes for components that
    /// are no longer selected are left out.
    pub fn snapshot(&self, name: impl Into<String>) -> Result<SavedConfiguration, SetupError> {
        let name = validate_name(name.into())?;
        let selected: Vec<ComponentId> = self.selection.iter().map(|(_, c)| c.id.clone()).collect();
        let notes = self
            .notes
            .iter()
            .filter(|(id, _)| selected.contains(id))
            .map(|(id, note)| (id.clone(), note.clone()))
            .collect();
        Ok(SavedConfiguration {
            name,
            components: self.selection.clone().into(),
            notes,
            total_price: self.total_price(),
        })
    }

    /// Replace the current build with a saved one.
    ///
    /// Focus moves to the first missing required category (or the last
    /// category when none is missing). Completion is re-checked, so a fresh
    /// session restoring a full build gets the dialog once.
    pub fn restore(&mut self, saved: SavedConfiguration) {
        let SavedConfiguration {
            name,
            components,
            notes,
            ..
        } = saved;
        self.selection = Selection::from(components);
        self.notes = notes;
        self.name = Some(name);
        self.reevaluate();
        let focus = self
            .selection
            .missing_required()
            .first()
            .copied()
            .unwrap_or(CategoryId::Case);
        self.navigator.focus(focus);
        self.check_completion();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn reevaluate(&mut self) {
        self.evaluation = evaluate(&self.selection, self.catalog.catalog());
    }

    fn check_completion(&mut self) {
        if let Some(event) = self.navigator.check_completion(&self.selection) {
            tracing::info!(
                components = self.selection.len(),
                total = %self.selection.total_price(),
                "configuration complete"
            );
            self.events.push(event);
        }
    }
}

fn validate_name(name: String) -> Result<String, SetupError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SetupError::InvalidInput(
            "configuration name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_CONFIGURATION_NAME_LENGTH {
        return Err(SetupError::InvalidInput(format!(
            "configuration name exceeds {MAX_CONFIGURATION_NAME_LENGTH} bytes"
        )));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
