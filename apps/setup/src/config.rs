//! # Configuration File
//!
//! Optional `ultimate-setup.toml` read at startup. Every key has a default, so
//! an absent file and an empty file behave the same. CLI flags override the
//! file; security settings come from environment variables only.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! max_sessions = 10000
//!
//! [catalog]
//! path = "catalog.json"                 # local JSON catalog
//! # url = "https://shop.example/api"    # or a remote storefront
//!
//! [checkout]
//! block_on_issues = true
//!
//! [navigation]
//! auto_navigate = true
//! ```

use crate::api::DEFAULT_MAX_SESSIONS;
use serde::Deserialize;
use setup_core::{CartPolicy, SetupError};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ultimate-setup.toml";

/// Largest configuration file accepted.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Template written by `ultimate-setup init`.
pub const CONFIG_TEMPLATE: &str = r#"# Ultimate Setup configuration

[server]
host = "127.0.0.1"
port = 8080
# Live configurator sessions; the least recently used is dropped beyond this.
max_sessions = 10000

[catalog]
# path = "catalog.json"
# url = "https://shop.example/api"

[checkout]
# Refuse cart additions while the build has compatibility issues.
block_on_issues = true

[navigation]
auto_navigate = true
"#;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub checkout: CheckoutConfig,
    pub navigation: NavigationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Where the catalog comes from. `url` wins over `path`; with neither the
/// bundled demo catalog is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckoutConfig {
    pub block_on_issues: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            block_on_issues: true,
        }
    }
}

impl CheckoutConfig {
    pub fn policy(&self) -> CartPolicy {
        CartPolicy::from_block_flag(self.block_on_issues)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    pub auto_navigate: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            auto_navigate: true,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, SetupError> {
        toml::from_str(text).map_err(|e| SetupError::DeserializationError(e.to_string()))
    }

    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let size = std::fs::metadata(path)
            .map_err(|e| SetupError::IoError(format!("cannot stat {}: {}", path.display(), e)))?
            .len();
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(SetupError::InvalidInput(format!(
                "configuration file is {size} bytes, limit is {MAX_CONFIG_FILE_SIZE}"
            )));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| SetupError::IoError(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}
