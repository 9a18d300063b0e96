//! # API Endpoint Handlers
//!
//! Session handlers lock the session registry, fire any due auto-advance,
//! apply the request, then answer with the full session view.
//!
//! Lock order is sessions before catalog. The catalog refresh releases the
//! catalog lock before it touches sessions.

use super::{
    ANONYMOUS_USER, AppState, SessionRegistry, USER_ID_HEADER,
    types::{
        ApplySuggestionRequest, CartResponse, CatalogStatusResponse, ComponentsQuery,
        ComponentsResponse, ConfigurationResponse, ConfigurationsResponse, ConfiguratorResponse,
        ErrorResponse, EvaluateRequest, EvaluateResponse, HealthResponse, NavigateRequest,
        NoteRequest, RemoveRequest, SaveRequest, SelectRequest,
    },
};
use crate::catalog_source::load_catalog;
use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use setup_core::{
    CartRequest, CartSink, Configurator, SetupError, UserId, primitives::MAX_QUERY_LENGTH,
};
use std::sync::Arc;

/// Upper bound on the `X-User-Id` header.
const MAX_USER_ID_LENGTH: usize = 128;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

fn ok<T>(body: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(body)))
}

/// Map an engine error to its HTTP status.
fn status_for(err: &SetupError) -> StatusCode {
    match err {
        SetupError::UnknownCategory(_)
        | SetupError::InvalidInput(_)
        | SetupError::DeserializationError(_) => StatusCode::BAD_REQUEST,
        SetupError::ComponentNotFound(..) | SetupError::ConfigurationNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        SetupError::IssuesPresent(_) | SetupError::EmptySelection => StatusCode::CONFLICT,
        SetupError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SetupError::SerializationError(_) | SetupError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn failure(err: SetupError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
    (status, Json(ErrorResponse::from(&err)))
}

// =============================================================================
// SESSION USER
// =============================================================================

/// The session owner named by `X-User-Id`, `anonymous` when absent.
#[derive(Debug, Clone)]
pub struct SessionUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Self(UserId::new(ANONYMOUS_USER)));
        };
        let raw = value.to_str().map_err(|_| {
            failure(SetupError::InvalidInput(
                "X-User-Id must be visible ASCII".to_string(),
            ))
        })?;
        let trimmed = raw.trim();
        if trimmed.len() > MAX_USER_ID_LENGTH {
            return Err(failure(SetupError::InvalidInput(format!(
                "X-User-Id exceeds {MAX_USER_ID_LENGTH} bytes"
            ))));
        }
        if trimmed.is_empty() {
            return Ok(Self(UserId::new(ANONYMOUS_USER)));
        }
        Ok(Self(UserId::new(trimmed)))
    }
}

/// The caller's configurator, created on first use. Due auto-advances fire here.
async fn session<'a>(
    state: &AppState,
    sessions: &'a mut SessionRegistry,
    user: UserId,
) -> &'a mut Configurator {
    let catalog = state.catalog.read().await.clone();
    let configurator = sessions.get_or_insert_with(user, || state.configurator_over(catalog));
    configurator.tick();
    configurator
}

// =============================================================================
// HEALTH AND CATALOG
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Catalog load state.
pub async fn catalog_status_handler(
    State(state): State<AppState>,
) -> ApiResult<CatalogStatusResponse> {
    let catalog = state.catalog.read().await;
    ok(CatalogStatusResponse::from_state(&catalog))
}

/// Re-fetch the catalog and hand the result to every live session.
///
/// A failed fetch keeps the previous catalog as a stale copy and answers 503,
/// so the caller can retry.
pub async fn refresh_catalog_handler(
    State(state): State<AppState>,
) -> ApiResult<CatalogStatusResponse> {
    let Some(source) = state.catalog_source.clone() else {
        return Err(failure(SetupError::InvalidInput(
            "no catalog source configured".to_string(),
        )));
    };

    let result = load_catalog(&source).await;
    let (snapshot, error) = {
        let mut catalog = state.catalog.write().await;
        let error = match result {
            Ok(fresh) => {
                catalog.replace(Arc::new(fresh));
                None
            }
            Err(e) => {
                catalog.fail(&e);
                Some(e)
            }
        };
        (catalog.clone(), error)
    };

    state.sessions.lock().await.adopt_catalog(&snapshot);

    match error {
        Some(e) => Err(failure(e)),
        None => {
            tracing::info!(components = snapshot.catalog().len(), "catalog refreshed");
            ok(CatalogStatusResponse::from_state(&snapshot))
        }
    }
}

/// Browse or search the catalog.
pub async fn components_handler(
    State(state): State<AppState>,
    Query(query): Query<ComponentsQuery>,
) -> ApiResult<ComponentsResponse> {
    let category = query.category().map_err(failure)?;
    let needle = query.q.as_deref().unwrap_or_default();
    if needle.len() > MAX_QUERY_LENGTH {
        return Err(failure(SetupError::InvalidInput(format!(
            "query exceeds {MAX_QUERY_LENGTH} bytes"
        ))));
    }

    let catalog = state.catalog.read().await;
    let components = catalog
        .catalog()
        .search(category, needle)
        .into_iter()
        .cloned()
        .collect();
    ok(ComponentsResponse::new(components))
}

/// Stateless compatibility check of a build given by component ids.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<EvaluateResponse> {
    let catalog = state.catalog.read().await;
    let selection = request.to_selection(catalog.catalog()).map_err(failure)?;
    ok(EvaluateResponse::from_selection(&selection, catalog.catalog()))
}

// =============================================================================
// CONFIGURATOR SESSION
// =============================================================================

/// Current session state.
pub async fn configurator_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<ConfiguratorResponse> {
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Select a catalog component.
pub async fn select_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<SelectRequest>,
) -> ApiResult<ConfiguratorResponse> {
    let category = request.category().map_err(failure)?;
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    configurator
        .select_by_id(category, &request.component_id)
        .map_err(failure)?;
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Empty one category. Emptying an empty slot is a no-op.
pub async fn remove_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<RemoveRequest>,
) -> ApiResult<ConfiguratorResponse> {
    let category = request.category().map_err(failure)?;
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    configurator.remove_component(category);
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Start the build over.
pub async fn reset_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<ConfiguratorResponse> {
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    configurator.reset();
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Manual navigation and the auto-navigate toggle.
pub async fn navigate_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<ConfiguratorResponse> {
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    match request {
        NavigateRequest::Next => {
            configurator.navigate_next();
        }
        NavigateRequest::Previous => {
            configurator.navigate_previous();
        }
        NavigateRequest::Focus { category } => {
            let category = category.parse().map_err(failure)?;
            configurator.focus(category);
        }
        NavigateRequest::SetAuto { enabled } => configurator.set_auto_navigate(enabled),
    }
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Apply one suggestion by index, or all of them.
pub async fn apply_suggestion_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<ApplySuggestionRequest>,
) -> ApiResult<ConfiguratorResponse> {
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    match request.index {
        Some(index) => configurator.apply_suggestion(index).map_err(failure)?,
        None => {
            let applied = configurator.apply_all_suggestions();
            tracing::debug!(applied, "applied all suggestions");
        }
    }
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Set or clear a component note.
pub async fn note_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<NoteRequest>,
) -> ApiResult<ConfiguratorResponse> {
    request.validate().map_err(failure)?;
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    match request.note {
        Some(note) => configurator
            .set_note(request.component_id, note)
            .map_err(failure)?,
        None => {
            configurator.clear_note(&request.component_id);
        }
    }
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Record that the completion dialog was shown.
pub async fn acknowledge_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<ConfiguratorResponse> {
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    configurator.acknowledge_completion();
    ok(ConfiguratorResponse::from_session(configurator))
}

// =============================================================================
// SAVED CONFIGURATIONS
// =============================================================================

/// List the caller's saved builds, sorted by name.
pub async fn list_configurations_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<ConfigurationsResponse> {
    let configurations = state.store.lock().await.list(&user).map_err(failure)?;
    ok(ConfigurationsResponse {
        success: true,
        configurations,
    })
}

/// Save the current build. An existing build with the same name is replaced.
pub async fn save_configuration_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Json(request): Json<SaveRequest>,
) -> ApiResult<ConfigurationResponse> {
    let saved = {
        let mut sessions = state.sessions.lock().await;
        let configurator = session(&state, &mut sessions, user.clone()).await;
        let saved = configurator.snapshot(request.name).map_err(failure)?;
        configurator.set_name(saved.name.clone()).map_err(failure)?;
        saved
    };

    state
        .store
        .lock()
        .await
        .save(&user, &saved)
        .map_err(failure)?;
    tracing::info!(user = %user, name = %saved.name, "configuration saved");

    ok(ConfigurationResponse {
        success: true,
        configuration: saved,
    })
}

/// Show one saved build.
pub async fn show_configuration_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(name): Path<String>,
) -> ApiResult<ConfigurationResponse> {
    let configuration = state.store.lock().await.load(&user, &name).map_err(failure)?;
    ok(ConfigurationResponse {
        success: true,
        configuration,
    })
}

/// Replace the session's build with a saved one.
pub async fn load_configuration_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(name): Path<String>,
) -> ApiResult<ConfiguratorResponse> {
    let saved = state.store.lock().await.load(&user, &name).map_err(failure)?;
    let mut sessions = state.sessions.lock().await;
    let configurator = session(&state, &mut sessions, user).await;
    configurator.restore(saved);
    ok(ConfiguratorResponse::from_session(configurator))
}

/// Delete a saved build.
pub async fn delete_configuration_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    Path(name): Path<String>,
) -> ApiResult<ConfigurationsResponse> {
    let mut store = state.store.lock().await;
    if !store.delete(&user, &name).map_err(failure)? {
        return Err(failure(SetupError::ConfigurationNotFound(name)));
    }
    tracing::info!(user = %user, name = %name, "configuration deleted");
    let configurations = store.list(&user).map_err(failure)?;
    ok(ConfigurationsResponse {
        success: true,
        configurations,
    })
}

// =============================================================================
// CART
// =============================================================================

/// The caller's cart.
pub async fn cart_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<CartResponse> {
    let cart = state.cart.lock().await;
    ok(CartResponse {
        success: true,
        items: cart.items(&user).to_vec(),
        total_price: cart.total(&user),
    })
}

/// Add the current build to the cart, subject to the checkout policy.
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
) -> ApiResult<CartResponse> {
    let request = {
        let mut sessions = state.sessions.lock().await;
        let configurator = session(&state, &mut sessions, user.clone()).await;
        CartRequest::from_configurator(configurator, state.settings.cart_policy)
            .map_err(failure)?
    };

    let mut cart = state.cart.lock().await;
    cart.add(&user, request).map_err(failure)?;
    ok(CartResponse {
        success: true,
        items: cart.items(&user).to_vec(),
        total_price: cart.total(&user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            status_for(&SetupError::UnknownCategory("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SetupError::ConfigurationNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&SetupError::IssuesPresent(2)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&SetupError::IoError("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
