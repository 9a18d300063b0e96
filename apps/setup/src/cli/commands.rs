//! # CLI Command Implementations

use crate::api::{self, AppState, EvaluateRequest, SessionSettings};
use crate::catalog_source::load_catalog;
use crate::config::{AppConfig, CONFIG_TEMPLATE};
use setup_core::{
    Catalog, CatalogState, CategoryId, ComponentId, ConfigurationStore, MemoryStore, RedbStore,
    Selection, SetupError, UserId, evaluate, primitives::MAX_QUERY_LENGTH,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Maximum size of a build file passed to `check` (1 MB).
const MAX_BUILD_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// HELPERS
// =============================================================================

/// Read the configuration file, defaults when absent.
pub fn load_config(path: &Path) -> Result<AppConfig, SetupError> {
    AppConfig::load(path)
}

/// Open the saved-configuration store for `backend`.
pub fn open_store(db_path: &Path, backend: &str) -> Result<Box<dyn ConfigurationStore>, SetupError> {
    match backend {
        "redb" => Ok(Box::new(RedbStore::open(db_path)?)),
        "memory" => Ok(Box::new(MemoryStore::new())),
        other => Err(SetupError::InvalidInput(format!(
            "unknown backend '{other}', expected 'redb' or 'memory'"
        ))),
    }
}

/// Open a store for the `saved` commands. Each CLI run is its own process,
/// so the memory backend would always be empty.
fn open_persistent_store(
    db_path: &Path,
    backend: &str,
) -> Result<Box<dyn ConfigurationStore>, SetupError> {
    if backend == "memory" {
        return Err(SetupError::InvalidInput(
            "saved configurations need a persistent backend; the memory backend \
             does not outlive a single command (use --backend redb)"
                .to_string(),
        ));
    }
    open_store(db_path, backend)
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    config: &AppConfig,
    db_path: &Path,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), SetupError> {
    let store = open_store(db_path, backend)?;
    let settings = SessionSettings {
        cart_policy: config.checkout.policy(),
        auto_navigate: config.navigation.auto_navigate,
        max_sessions: config.server.max_sessions,
    };

    // A failed first fetch still starts the server; POST /catalog/refresh retries.
    let mut catalog = CatalogState::default();
    catalog.apply(load_catalog(&config.catalog).await);

    println!("Ultimate Setup Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", host);
    println!("  Port:       {}", port);
    println!("  Backend:    {}", backend);
    println!("  Database:   {}", db_path.display());
    match catalog.error() {
        None => println!("  Components: {}", catalog.catalog().len()),
        Some(error) => {
            println!("  Components: unavailable ({error})");
            println!("              retry with POST /catalog/refresh");
        }
    }
    println!("  Checkout:   {:?}", settings.cart_policy);
    println!("  Sessions:   {} max", settings.max_sessions);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::from_catalog_state(catalog, store, settings)
        .with_catalog_source(config.catalog.clone());
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Browse or search the catalog.
pub async fn cmd_catalog(
    config: &AppConfig,
    category: Option<&str>,
    query: Option<&str>,
    json_mode: bool,
) -> Result<(), SetupError> {
    let category: Option<CategoryId> = category.map(str::parse).transpose()?;
    let query = query.unwrap_or_default();
    if query.len() > MAX_QUERY_LENGTH {
        return Err(SetupError::InvalidInput(format!(
            "query exceeds {MAX_QUERY_LENGTH} bytes"
        )));
    }

    let catalog = load_catalog(&config.catalog).await?;
    let matches = catalog.search(category, query);

    if json_mode {
        print_json(&matches);
        return Ok(());
    }

    if category.is_none() && query.is_empty() {
        println!("Catalog");
        println!("=======");
        for category in CategoryId::SEQUENCE {
            let marker = if category.is_required() { "" } else { " (optional)" };
            println!(
                "{:<12} {:>4}{}",
                category.label(),
                catalog.components(category).len(),
                marker
            );
        }
        println!();
        println!("Total: {} components", catalog.len());
        return Ok(());
    }

    if matches.is_empty() {
        println!("No components found.");
        return Ok(());
    }
    for component in &matches {
        println!(
            "{:<12} {:<28} {:>10}  {}",
            component.category_id.as_str(),
            component.id,
            component.price.to_string(),
            component.name
        );
    }
    println!();
    println!("{} component(s)", matches.len());
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Parse a build document of the form `{"cpu": "<id>", ...}` against `catalog`.
pub fn parse_build(text: &str, catalog: &Catalog) -> Result<Selection, SetupError> {
    let components: BTreeMap<String, ComponentId> = serde_json::from_str(text)
        .map_err(|e| SetupError::DeserializationError(format!("invalid build JSON: {e}")))?;
    EvaluateRequest { components }.to_selection(catalog)
}

/// Check a build. Fails when any issue is found.
pub async fn cmd_check(
    config: &AppConfig,
    build: Option<&str>,
    file: Option<&Path>,
    json_mode: bool,
) -> Result<(), SetupError> {
    let text = match (build, file) {
        (Some(build), _) => build.to_string(),
        (None, Some(path)) => read_build_file(path)?,
        (None, None) => {
            return Err(SetupError::InvalidInput(
                "pass the build with --build or --file".to_string(),
            ));
        }
    };

    let catalog = load_catalog(&config.catalog).await?;
    let selection = parse_build(&text, &catalog)?;
    let evaluation = evaluate(&selection, &catalog);

    if json_mode {
        print_json(&api::EvaluateResponse::from_selection(&selection, &catalog));
    } else {
        println!("Build Check");
        println!("===========");
        for (category, component) in selection.iter() {
            println!(
                "{:<12} {:<40} {:>10}",
                category.label(),
                component.name,
                component.price.to_string()
            );
        }
        println!();
        println!("Total:      {}", selection.total_price());
        println!("Completion: {}%", selection.completion_percentage());
        let missing = selection.missing_required();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(CategoryId::label).collect();
            println!("Missing:    {}", names.join(", "));
        }
        println!();

        if evaluation.issues.is_empty() {
            println!("No compatibility issues.");
        } else {
            println!("Issues:");
            for issue in &evaluation.issues {
                println!("  [{}] {}", issue.rule.code(), issue.message);
            }
            if !evaluation.suggestions.is_empty() {
                println!();
                println!("Suggestions:");
                for suggestion in &evaluation.suggestions {
                    println!("  - {}", suggestion.description);
                }
            }
        }
    }

    if evaluation.issues.is_empty() {
        Ok(())
    } else {
        Err(SetupError::IssuesPresent(evaluation.issues.len()))
    }
}

fn read_build_file(path: &Path) -> Result<String, SetupError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| SetupError::IoError(format!("cannot read {}: {}", path.display(), e)))?;
    if metadata.len() > MAX_BUILD_FILE_SIZE {
        return Err(SetupError::InvalidInput(format!(
            "build file is {} bytes, limit is {}",
            metadata.len(),
            MAX_BUILD_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| SetupError::IoError(format!("cannot read {}: {}", path.display(), e)))
}

// =============================================================================
// SAVED COMMANDS
// =============================================================================

/// List a user's saved configurations.
pub fn cmd_saved_list(
    db_path: &Path,
    backend: &str,
    user: &str,
    json_mode: bool,
) -> Result<(), SetupError> {
    let store = open_persistent_store(db_path, backend)?;
    let summaries = store.list(&UserId::new(user))?;

    if json_mode {
        print_json(&summaries);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No saved configurations for '{}'.", user);
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "{:<32} {:>2} parts {:>10}",
            summary.name,
            summary.component_count,
            summary.total_price.to_string()
        );
    }
    Ok(())
}

/// Show one saved configuration.
pub fn cmd_saved_show(
    db_path: &Path,
    backend: &str,
    user: &str,
    name: &str,
    json_mode: bool,
) -> Result<(), SetupError> {
    let store = open_persistent_store(db_path, backend)?;
    let saved = store.load(&UserId::new(user), name)?;

    if json_mode {
        print_json(&saved);
        return Ok(());
    }

    println!("{}", saved.name);
    println!("{}", "=".repeat(saved.name.chars().count()));
    for (category, component) in &saved.components {
        println!(
            "{:<12} {:<40} {:>10}",
            category.label(),
            component.name,
            component.price.to_string()
        );
        if let Some(note) = saved.notes.get(&component.id) {
            println!("{:<12} note: {}", "", note);
        }
    }
    println!();
    println!("Total: {}", saved.total_price);
    Ok(())
}

/// Delete one saved configuration.
pub fn cmd_saved_delete(
    db_path: &Path,
    backend: &str,
    user: &str,
    name: &str,
) -> Result<(), SetupError> {
    let mut store = open_persistent_store(db_path, backend)?;
    if !store.delete(&UserId::new(user), name)? {
        return Err(SetupError::ConfigurationNotFound(name.to_string()));
    }
    println!("Deleted '{}'.", name);
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write the configuration template and create the database.
pub fn cmd_init(
    config_path: &Path,
    db_path: &Path,
    backend: &str,
    force: bool,
) -> Result<(), SetupError> {
    if config_path.exists() && !force {
        return Err(SetupError::InvalidInput(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }
    std::fs::write(config_path, CONFIG_TEMPLATE)
        .map_err(|e| SetupError::IoError(format!("cannot write {}: {}", config_path.display(), e)))?;
    println!("Wrote {}", config_path.display());

    if backend == "redb" {
        if db_path.exists() && force {
            std::fs::remove_file(db_path).map_err(|e| {
                SetupError::IoError(format!("cannot remove {}: {}", db_path.display(), e))
            })?;
        }
        RedbStore::open(db_path)?;
        println!("Initialized redb store at {}", db_path.display());
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_source::bundled_catalog;
    use setup_core::SavedConfiguration;
    use tempfile::TempDir;

    #[test]
    fn unknown_backend_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let err = open_store(&dir.path().join("x.redb"), "sqlite").err();
        assert!(matches!(err, Some(SetupError::InvalidInput(_))));
    }

    #[test]
    fn parse_build_resolves_against_catalog() {
        let catalog = bundled_catalog().expect("catalog");
        let first_cpu = catalog.components(CategoryId::Cpu)[0].id.clone();
        let text = format!(r#"{{"cpu": "{first_cpu}"}}"#);
        let selection = parse_build(&text, &catalog).expect("build");
        assert_eq!(
            selection.get(CategoryId::Cpu).map(|c| c.id.clone()),
            Some(first_cpu)
        );
    }

    #[test]
    fn parse_build_rejects_bad_json() {
        let catalog = bundled_catalog().expect("catalog");
        let err = parse_build("[1, 2]", &catalog).expect_err("not an object");
        assert!(matches!(err, SetupError::DeserializationError(_)));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().expect("tempdir");
        let config = dir.path().join("ultimate-setup.toml");
        let db = dir.path().join("store.redb");

        cmd_init(&config, &db, "redb", false).expect("first init");
        assert!(config.exists());
        assert!(db.exists());
        assert!(cmd_init(&config, &db, "redb", false).is_err());
        cmd_init(&config, &db, "redb", true).expect("forced init");

        let written = AppConfig::load(&config).expect("template parses");
        assert_eq!(written, AppConfig::default());
    }

    #[test]
    fn saved_commands_round_trip_through_redb() {
        let dir = TempDir::new().expect("tempdir");
        let db = dir.path().join("store.redb");
        let saved = SavedConfiguration {
            name: "Office".to_string(),
            components: BTreeMap::new(),
            notes: BTreeMap::new(),
            total_price: setup_core::Price::ZERO,
        };
        {
            let mut store = open_store(&db, "redb").expect("open");
            store.save(&UserId::new("ana"), &saved).expect("save");
        }

        cmd_saved_list(&db, "redb", "ana", true).expect("list");
        cmd_saved_show(&db, "redb", "ana", "Office", false).expect("show");
        cmd_saved_delete(&db, "redb", "ana", "Office").expect("delete");
        let err = cmd_saved_delete(&db, "redb", "ana", "Office").expect_err("gone");
        assert!(matches!(err, SetupError::ConfigurationNotFound(_)));
    }

    #[test]
    fn saved_commands_refuse_memory_backend() {
        let dir = TempDir::new().expect("tempdir");
        let db = dir.path().join("unused.redb");
        for result in [
            cmd_saved_list(&db, "memory", "ana", true),
            cmd_saved_show(&db, "memory", "ana", "Office", true),
            cmd_saved_delete(&db, "memory", "ana", "Office"),
        ] {
            assert!(matches!(result, Err(SetupError::InvalidInput(ref m)) if m.contains("persistent")));
        }
        assert!(!db.exists());
    }
}
