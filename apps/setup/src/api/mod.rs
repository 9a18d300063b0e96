//! # HTTP API Module
//!
//! REST API over per-user configurator sessions, using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /catalog` - Catalog load state (ready, failed with retry, loading)
//! - `POST /catalog/refresh` - Re-fetch the catalog and push it into live sessions
//! - `GET /components?category=&q=` - Browse or search the catalog
//! - `POST /evaluate` - Stateless compatibility check of a build
//! - `GET /configurator` - Current session state (fires due auto-advances)
//! - `POST /configurator/select` - Select a catalog component
//! - `POST /configurator/remove` - Empty a category
//! - `POST /configurator/reset` - Start over
//! - `POST /configurator/navigate` - Manual navigation and the auto-navigate toggle
//! - `POST /configurator/suggestions/apply` - Apply one or all suggestions
//! - `POST /configurator/notes` - Set or clear a component note
//! - `POST /configurator/acknowledge` - Completion dialog was shown
//! - `GET|POST /configurations` - List saved builds / save the current one
//! - `GET|DELETE /configurations/{name}` - Show or delete a saved build
//! - `POST /configurations/{name}/load` - Restore a saved build into the session
//! - `GET|POST /cart` - Show the cart / add the current build
//!
//! Sessions are keyed by the `X-User-Id` header (`anonymous` when absent).
//! At most `max_sessions` live at once; the least recently used one is
//! dropped when a new user arrives at the cap.
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `USETUP_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `USETUP_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `USETUP_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod sessions;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use sessions::{DEFAULT_MAX_SESSIONS, SessionRegistry};
pub use types::{
    ApplySuggestionRequest, CartResponse, CatalogStatusResponse, ComponentsQuery,
    ComponentsResponse, ConfigurationResponse, ConfigurationsResponse, ConfiguratorResponse,
    ErrorResponse, EvaluateRequest, EvaluateResponse, HealthResponse, NavigateRequest,
    NoteRequest, RemoveRequest, SaveRequest, SelectRequest, SuggestionJson,
};

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use crate::config::CatalogConfig;
use setup_core::{
    CartPolicy, Catalog, CatalogState, ConfigurationStore, Configurator, MemoryCart, SetupError,
    SystemClock,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Header carrying the opaque user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// User id used when the header is absent.
pub const ANONYMOUS_USER: &str = "anonymous";

// =============================================================================
// SERVER STATE
// =============================================================================

/// Session-wide behavior picked at startup.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub cart_policy: CartPolicy,
    pub auto_navigate: bool,
    /// Cap on live configurator sessions.
    pub max_sessions: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cart_policy: CartPolicy::BlockOnIssues,
            auto_navigate: true,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The catalog every new session starts from.
    pub catalog: Arc<RwLock<CatalogState>>,
    /// Where `POST /catalog/refresh` fetches from. `None` disables refreshing.
    pub catalog_source: Option<Arc<CatalogConfig>>,
    /// One configurator per user, bounded.
    pub sessions: Arc<Mutex<SessionRegistry>>,
    /// Saved configurations.
    pub store: Arc<Mutex<Box<dyn ConfigurationStore>>>,
    pub cart: Arc<Mutex<MemoryCart>>,
    pub settings: SessionSettings,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog, store: Box<dyn ConfigurationStore>) -> Self {
        Self::with_settings(catalog, store, SessionSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        catalog: Catalog,
        store: Box<dyn ConfigurationStore>,
        settings: SessionSettings,
    ) -> Self {
        Self::from_catalog_state(CatalogState::Ready(Arc::new(catalog)), store, settings)
    }

    /// State starting from any catalog state, e.g. a failed first fetch.
    #[must_use]
    pub fn from_catalog_state(
        catalog: CatalogState,
        store: Box<dyn ConfigurationStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            catalog_source: None,
            sessions: Arc::new(Mutex::new(SessionRegistry::new(settings.max_sessions))),
            store: Arc::new(Mutex::new(store)),
            cart: Arc::new(Mutex::new(MemoryCart::new())),
            settings,
        }
    }

    /// Enable catalog refreshes from `source`.
    #[must_use]
    pub fn with_catalog_source(mut self, source: CatalogConfig) -> Self {
        self.catalog_source = Some(Arc::new(source));
        self
    }

    /// A fresh configurator over the current catalog. The catalog is shared,
    /// not copied.
    pub async fn new_configurator(&self) -> Configurator {
        let catalog = self.catalog.read().await.clone();
        self.configurator_over(catalog)
    }

    fn configurator_over(&self, catalog: CatalogState) -> Configurator {
        let mut configurator =
            Configurator::with_catalog_state(catalog, Arc::new(SystemClock::new()));
        configurator.set_auto_navigate(self.settings.auto_navigate);
        configurator
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `USETUP_CORS_ORIGINS`:
/// - `*`: any origin
/// - unset: localhost only
/// - otherwise: the comma-separated origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("USETUP_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: allowing ALL origins (USETUP_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: no valid origins in USETUP_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                restricted_cors(allowed)
            }
        }
        None => {
            tracing::info!("CORS: USETUP_CORS_ORIGINS not set, allowing localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
        ])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing
/// 2. CORS
/// 3. Rate limiting (if enabled)
/// 4. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED: all endpoints are public. \
             Set USETUP_API_KEY to enable it."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/catalog", get(handlers::catalog_status_handler))
        .route("/catalog/refresh", post(handlers::refresh_catalog_handler))
        .route("/components", get(handlers::components_handler))
        .route("/evaluate", post(handlers::evaluate_handler))
        .route("/configurator", get(handlers::configurator_handler))
        .route("/configurator/select", post(handlers::select_handler))
        .route("/configurator/remove", post(handlers::remove_handler))
        .route("/configurator/reset", post(handlers::reset_handler))
        .route("/configurator/navigate", post(handlers::navigate_handler))
        .route(
            "/configurator/suggestions/apply",
            post(handlers::apply_suggestion_handler),
        )
        .route("/configurator/notes", post(handlers::note_handler))
        .route("/configurator/acknowledge", post(handlers::acknowledge_handler))
        .route(
            "/configurations",
            get(handlers::list_configurations_handler).post(handlers::save_configuration_handler),
        )
        .route(
            "/configurations/{name}",
            get(handlers::show_configuration_handler)
                .delete(handlers::delete_configuration_handler),
        )
        .route(
            "/configurations/{name}/load",
            post(handlers::load_configuration_handler),
        )
        .route(
            "/cart",
            get(handlers::cart_handler).post(handlers::add_to_cart_handler),
        );

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), SetupError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SetupError::IoError(format!("bind failed: {}", e)))?;

    tracing::info!("Ultimate Setup server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SetupError::IoError(format!("server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested, draining connections");
}
