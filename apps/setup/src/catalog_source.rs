//! # Catalog Sources
//!
//! Where the server and CLI get their component catalog from:
//!
//! - [`FileCatalogSource`]: a local JSON file
//! - [`HttpCatalogClient`]: a remote storefront API
//! - [`bundled_catalog`]: the demo catalog compiled into the binary
//!
//! Both file formats are accepted: a map from category to component list, or a
//! flat component list grouped by each component's `categoryId`.

use crate::config::CatalogConfig;
use serde::Deserialize;
use setup_core::{Catalog, CatalogSource, CategoryId, Component, SetupError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum catalog size accepted from disk or network (50 MB).
const MAX_CATALOG_SIZE: u64 = 50 * 1024 * 1024;

/// Timeout for remote catalog requests.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Grouped(Catalog),
    Flat(Vec<Component>),
}

impl From<CatalogDocument> for Catalog {
    fn from(document: CatalogDocument) -> Self {
        match document {
            CatalogDocument::Grouped(catalog) => catalog,
            CatalogDocument::Flat(components) => Catalog::from_components(components),
        }
    }
}

/// Decode a catalog JSON document in either accepted shape.
pub fn parse_catalog(bytes: &[u8]) -> Result<Catalog, SetupError> {
    serde_json::from_slice::<CatalogDocument>(bytes)
        .map(Catalog::from)
        .map_err(|e| SetupError::CatalogUnavailable(format!("invalid catalog document: {e}")))
}

/// The demo catalog shipped with the binary.
pub fn bundled_catalog() -> Result<Catalog, SetupError> {
    parse_catalog(BUNDLED_CATALOG.as_bytes())
}

// =============================================================================
// FILE SOURCE
// =============================================================================

/// A catalog read from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch(&self, category: Option<CategoryId>) -> Result<Catalog, SetupError> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| {
            SetupError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        if metadata.len() > MAX_CATALOG_SIZE {
            return Err(SetupError::CatalogUnavailable(format!(
                "catalog file is {} bytes, limit is {}",
                metadata.len(),
                MAX_CATALOG_SIZE
            )));
        }
        let bytes = std::fs::read(&self.path).map_err(|e| {
            SetupError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let catalog = parse_catalog(&bytes)?;
        tracing::debug!(path = %self.path.display(), components = catalog.len(), "catalog read");
        Ok(catalog.filtered(category))
    }
}

// =============================================================================
// HTTP SOURCE
// =============================================================================

/// Client for a storefront exposing `GET {base}/components[?category=..]`.
///
/// Async, so it does not implement [`CatalogSource`]; callers fetch first and
/// hand the result to the engine.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SetupError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SetupError::CatalogUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn fetch(&self, category: Option<CategoryId>) -> Result<Catalog, SetupError> {
        let url = format!("{}/components", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(category) = category {
            request = request.query(&[("category", category.as_str())]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SetupError::CatalogUnavailable(format!("cannot reach {url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SetupError::CatalogUnavailable(format!(
                "{url} returned {status}"
            )));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_CATALOG_SIZE)
        {
            return Err(SetupError::CatalogUnavailable(
                "remote catalog exceeds size limit".to_string(),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SetupError::CatalogUnavailable(e.to_string()))?;
        let catalog = parse_catalog(&bytes)?;
        tracing::info!(url = %url, components = catalog.len(), "remote catalog fetched");
        Ok(catalog.filtered(category))
    }
}

/// `USETUP_CATALOG_TOKEN`, if set and non-empty.
fn catalog_token_from_env() -> Option<String> {
    std::env::var("USETUP_CATALOG_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Fetch the catalog described by `config`: remote URL, then file, then the
/// bundled demo catalog.
pub async fn load_catalog(config: &CatalogConfig) -> Result<Catalog, SetupError> {
    if let Some(url) = &config.url {
        let mut client = HttpCatalogClient::new(url.as_str())?;
        if let Some(token) = catalog_token_from_env() {
            client = client.with_bearer_token(token);
        }
        return client.fetch(None).await;
    }
    if let Some(path) = &config.path {
        return FileCatalogSource::new(path).fetch(None);
    }
    tracing::info!("no catalog configured, using the bundled demo catalog");
    bundled_catalog()
}
