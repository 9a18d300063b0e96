//! # API Request/Response Types
//!
//! JSON structures for the HTTP API.

use setup_core::{
    CartRequest, Catalog, CatalogState, CategoryId, CompatibilityIssue, CompatibilitySuggestion, CompletionState,
    Component, ComponentId, ConfigurationSummary, Configurator, ConfiguratorEvent, Evaluation,
    Price, RuleKind, SavedConfiguration, Selection, SetupError, evaluate,
    primitives::MAX_NOTE_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

impl From<&SetupError> for ErrorResponse {
    fn from(err: &SetupError) -> Self {
        Self::new(err.to_string())
    }
}

// =============================================================================
// CATALOG BROWSING
// =============================================================================

/// Query string of `GET /components`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsQuery {
    pub category: Option<String>,
    /// Case-insensitive substring over id, name and textual specifications.
    pub q: Option<String>,
}

impl ComponentsQuery {
    pub fn category(&self) -> Result<Option<CategoryId>, SetupError> {
        self.category.as_deref().map(str::parse).transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentsResponse {
    pub success: bool,
    pub count: usize,
    pub components: Vec<Component>,
}

impl ComponentsResponse {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            success: true,
            count: components.len(),
            components,
        }
    }
}

/// Body of `GET /catalog` and `POST /catalog/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStatusResponse {
    pub success: bool,
    /// `loading`, `ready` or `failed`.
    pub status: String,
    /// Components currently served; the stale copy while `failed`.
    pub component_count: usize,
    /// Whether a refresh should be offered.
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogStatusResponse {
    pub fn from_state(state: &CatalogState) -> Self {
        let status = match state {
            CatalogState::Loading => "loading",
            CatalogState::Ready(_) => "ready",
            CatalogState::Failed { .. } => "failed",
        };
        Self {
            success: state.is_ready(),
            status: status.to_string(),
            component_count: state.catalog().len(),
            retryable: state.is_retryable(),
            error: state.error().map(str::to_string),
        }
    }
}

// =============================================================================
// STATELESS EVALUATION
// =============================================================================

/// A build given as category name → component id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub components: BTreeMap<String, ComponentId>,
}

impl EvaluateRequest {
    /// Resolve every entry against `catalog`.
    ///
    /// Unknown category names and ids missing from their category are errors.
    pub fn to_selection(&self, catalog: &Catalog) -> Result<Selection, SetupError> {
        self.components
            .iter()
            .map(|(key, id)| -> Result<(CategoryId, Component), SetupError> {
                let category: CategoryId = key.parse()?;
                let component = catalog
                    .find(category, id)
                    .cloned()
                    .ok_or_else(|| SetupError::ComponentNotFound(category, id.clone()))?;
                Ok((category, component))
            })
            .collect()
    }
}

/// A suggestion with the index used to apply it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionJson {
    pub index: usize,
    pub rule: RuleKind,
    pub target_category: CategoryId,
    pub description: String,
    pub component_id: ComponentId,
    pub component_name: String,
}

impl SuggestionJson {
    pub fn list(suggestions: &[CompatibilitySuggestion]) -> Vec<Self> {
        suggestions
            .iter()
            .enumerate()
            .map(|(index, s)| Self {
                index,
                rule: s.rule,
                target_category: s.target_category,
                description: s.description.clone(),
                component_id: s.resolution.component.id.clone(),
                component_name: s.resolution.component.name.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub compatible: bool,
    pub issues: Vec<CompatibilityIssue>,
    pub suggestions: Vec<SuggestionJson>,
    pub total_price: Price,
    pub completion_percentage: u8,
    pub is_complete: bool,
}

impl EvaluateResponse {
    pub fn from_selection(selection: &Selection, catalog: &Catalog) -> Self {
        let Evaluation {
            issues,
            suggestions,
        } = evaluate(selection, catalog);
        Self {
            success: true,
            compatible: issues.is_empty(),
            issues,
            suggestions: SuggestionJson::list(&suggestions),
            total_price: selection.total_price(),
            completion_percentage: selection.completion_percentage(),
            is_complete: selection.is_complete(),
        }
    }
}

// =============================================================================
// CONFIGURATOR SESSION
// =============================================================================

/// Full view of one session after a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguratorResponse {
    pub success: bool,
    pub name: Option<String>,
    pub active_category: CategoryId,
    pub auto_navigate: bool,
    /// Category an auto-advance is scheduled from, if any.
    pub pending_advance: Option<CategoryId>,
    pub completion_state: CompletionState,
    pub completion_percentage: u8,
    pub is_complete: bool,
    pub total_price: Price,
    pub selection: BTreeMap<CategoryId, Component>,
    pub notes: BTreeMap<ComponentId, String>,
    pub issues: Vec<CompatibilityIssue>,
    pub suggestions: Vec<SuggestionJson>,
    /// Notifications raised since the previous response.
    pub events: Vec<ConfiguratorEvent>,
    pub catalog_ready: bool,
}

impl ConfiguratorResponse {
    /// Snapshot the session and take its queued events.
    pub fn from_session(configurator: &mut Configurator) -> Self {
        let events = configurator.drain_events();
        Self {
            success: true,
            name: configurator.name().map(str::to_string),
            active_category: configurator.active_category(),
            auto_navigate: configurator.auto_navigate(),
            pending_advance: configurator.navigator().pending().map(|p| p.from),
            completion_state: configurator.completion_state(),
            completion_percentage: configurator.completion_percentage(),
            is_complete: configurator.is_complete(),
            total_price: configurator.total_price(),
            selection: configurator.selection().clone().into(),
            notes: configurator.notes().clone(),
            issues: configurator.issues().to_vec(),
            suggestions: SuggestionJson::list(configurator.suggestions()),
            events,
            catalog_ready: configurator.catalog_state().is_ready(),
        }
    }
}

/// Select a catalog component by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub category: String,
    pub component_id: ComponentId,
}

impl SelectRequest {
    pub fn category(&self) -> Result<CategoryId, SetupError> {
        self.category.parse()
    }
}

/// Empty one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub category: String,
}

impl RemoveRequest {
    pub fn category(&self) -> Result<CategoryId, SetupError> {
        self.category.parse()
    }
}

/// Manual navigation (tagged union).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NavigateRequest {
    Next,
    Previous,
    Focus { category: String },
    SetAuto { enabled: bool },
}

/// Apply the suggestion at `index`, or every suggestion when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplySuggestionRequest {
    #[serde(default)]
    pub index: Option<usize>,
}

/// Set a note on a component. An absent or blank note clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRequest {
    pub component_id: ComponentId,
    #[serde(default)]
    pub note: Option<String>,
}

impl NoteRequest {
    /// Reject notes the session would refuse, before taking any lock.
    pub fn validate(&self) -> Result<(), SetupError> {
        match &self.note {
            Some(note) if note.len() > MAX_NOTE_LENGTH => Err(SetupError::InvalidInput(format!(
                "note length {} exceeds maximum {} bytes",
                note.len(),
                MAX_NOTE_LENGTH
            ))),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// SAVED CONFIGURATIONS
// =============================================================================

/// Save the current build under `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationsResponse {
    pub success: bool,
    pub configurations: Vec<ConfigurationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationResponse {
    pub success: bool,
    pub configuration: SavedConfiguration,
}

// =============================================================================
// CART
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartRequest>,
    pub total_price: Price,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_components([
            Component::new("cpu-1", CategoryId::Cpu, "CPU", Price(30_000))
                .with_spec("socket", "AM5"),
            Component::new("mb-1", CategoryId::Motherboard, "Board", Price(20_000))
                .with_spec("socket", "LGA1700"),
        ])
    }

    #[test]
    fn evaluate_request_resolves_ids() {
        let mut request = EvaluateRequest::default();
        request
            .components
            .insert("cpu".to_string(), ComponentId::new("cpu-1"));
        let selection = request.to_selection(&catalog()).expect("selection");
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.total_price(), Price(30_000));
    }

    #[test]
    fn evaluate_request_rejects_unknown_category() {
        let mut request = EvaluateRequest::default();
        request
            .components
            .insert("monitor".to_string(), ComponentId::new("cpu-1"));
        let err = request.to_selection(&catalog()).expect_err("unknown");
        assert!(matches!(err, SetupError::UnknownCategory(_)));
    }

    #[test]
    fn evaluate_request_rejects_misfiled_id() {
        let mut request = EvaluateRequest::default();
        request
            .components
            .insert("gpu".to_string(), ComponentId::new("cpu-1"));
        let err = request.to_selection(&catalog()).expect_err("missing");
        assert!(matches!(err, SetupError::ComponentNotFound(CategoryId::Gpu, _)));
    }

    #[test]
    fn evaluate_response_reports_socket_conflict() {
        let mut request = EvaluateRequest::default();
        request
            .components
            .insert("cpu".to_string(), ComponentId::new("cpu-1"));
        request
            .components
            .insert("motherboard".to_string(), ComponentId::new("mb-1"));
        let catalog = catalog();
        let selection = request.to_selection(&catalog).expect("selection");
        let response = EvaluateResponse::from_selection(&selection, &catalog);
        assert!(!response.compatible);
        assert_eq!(response.issues[0].rule, RuleKind::Socket);
        assert_eq!(response.total_price, Price(50_000));
    }

    #[test]
    fn navigate_request_wire_format() {
        let next: NavigateRequest =
            serde_json::from_str(r#"{"action":"next"}"#).expect("next");
        assert!(matches!(next, NavigateRequest::Next));

        let focus: NavigateRequest =
            serde_json::from_str(r#"{"action":"focus","category":"gpu"}"#).expect("focus");
        assert!(matches!(focus, NavigateRequest::Focus { ref category } if category == "gpu"));

        let toggle: NavigateRequest =
            serde_json::from_str(r#"{"action":"set_auto","enabled":false}"#).expect("toggle");
        assert!(matches!(toggle, NavigateRequest::SetAuto { enabled: false }));
    }

    #[test]
    fn catalog_status_reports_stale_copy() {
        let mut state = CatalogState::Loading;
        assert_eq!(CatalogStatusResponse::from_state(&state).status, "loading");

        state.apply(Ok(catalog()));
        let ready = CatalogStatusResponse::from_state(&state);
        assert!(ready.success);
        assert_eq!(ready.component_count, 2);

        state.apply(Err(SetupError::CatalogUnavailable("timeout".into())));
        let failed = CatalogStatusResponse::from_state(&state);
        assert!(!failed.success);
        assert!(failed.retryable);
        assert_eq!(failed.status, "failed");
        assert_eq!(failed.component_count, 2);
        assert_eq!(failed.error.as_deref(), Some("Catalog unavailable: timeout"));
    }

    #[test]
    fn oversized_note_is_rejected() {
        let request = NoteRequest {
            component_id: ComponentId::new("cpu-1"),
            note: Some("x".repeat(MAX_NOTE_LENGTH + 1)),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn apply_request_defaults_to_all() {
        let request: ApplySuggestionRequest = serde_json::from_str("{}").expect("empty");
        assert_eq!(request.index, None);
    }
}
