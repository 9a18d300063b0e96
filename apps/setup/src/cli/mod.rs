//! # Ultimate Setup CLI
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `catalog` - Browse or search the catalog
//! - `check` - Check a build for compatibility issues
//! - `saved` - List, show or delete saved configurations
//! - `init` - Write a configuration file and create the store

mod commands;

use crate::config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use setup_core::SetupError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Ultimate Setup - PC build configurator
///
/// Assemble a PC one category at a time, with compatibility checks and
/// catalog-backed fixes.
#[derive(Parser, Debug)]
#[command(name = "ultimate-setup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the saved-configuration database
    #[arg(short = 'D', long, global = true, default_value = "ultimate-setup.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (on disk) or "memory" (lost on exit)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Catalog JSON file, overriding the configuration file
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (overrides the configuration file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the configuration file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Browse or search the catalog
    Catalog {
        /// Restrict to one category (cpu, motherboard, ram, gpu, storage, psu, case)
        #[arg(short = 'c', long)]
        category: Option<String>,

        /// Case-insensitive search over id, name and specifications
        #[arg(short = 's', long)]
        query: Option<String>,
    },

    /// Check a build for compatibility issues; exits non-zero when any are found
    Check {
        /// Build as a JSON object of category to component id
        #[arg(short, long, conflicts_with = "file")]
        build: Option<String>,

        /// File holding the build JSON
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage saved configurations (requires the redb backend)
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Write a configuration file and create the database
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

/// Saved-configuration operations, scoped to one user.
#[derive(Subcommand, Debug)]
pub enum SavedAction {
    /// List a user's saved configurations
    List {
        #[arg(short, long, default_value = "anonymous")]
        user: String,
    },

    /// Show one saved configuration
    Show {
        name: String,

        #[arg(short, long, default_value = "anonymous")]
        user: String,
    },

    /// Delete one saved configuration
    Delete {
        name: String,

        #[arg(short, long, default_value = "anonymous")]
        user: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SetupError> {
    let json_mode = cli.json_mode;
    let backend = cli.backend.as_str();
    let mut config = load_config(&cli.config)?;
    if let Some(path) = cli.catalog {
        config.catalog.path = Some(path);
        config.catalog.url = None;
    }
    if cli.verbose {
        tracing::info!(?config, "effective configuration");
    }

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            cmd_serve(&config, &cli.database, backend, &host, port).await
        }
        Some(Commands::Catalog { category, query }) => {
            cmd_catalog(&config, category.as_deref(), query.as_deref(), json_mode).await
        }
        Some(Commands::Check { build, file }) => {
            cmd_check(&config, build.as_deref(), file.as_deref(), json_mode).await
        }
        Some(Commands::Saved { action }) => match action {
            SavedAction::List { user } => cmd_saved_list(&cli.database, backend, &user, json_mode),
            SavedAction::Show { name, user } => {
                cmd_saved_show(&cli.database, backend, &user, &name, json_mode)
            }
            SavedAction::Delete { name, user } => {
                cmd_saved_delete(&cli.database, backend, &user, &name)
            }
        },
        Some(Commands::Init { force }) => cmd_init(&cli.config, &cli.database, backend, force),
        None => {
            // No subcommand: summarize the catalog
            cmd_catalog(&config, None, None, json_mode).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ultimate-setup",
            "saved",
            "show",
            "Gaming Rig",
            "--user",
            "ana",
            "--backend",
            "memory",
            "--json-mode",
        ])
        .expect("parse");
        assert_eq!(cli.backend, "memory");
        assert!(cli.json_mode);
        assert!(matches!(
            cli.command,
            Some(Commands::Saved {
                action: SavedAction::Show { ref name, ref user },
            }) if name == "Gaming Rig" && user == "ana"
        ));
    }

    #[test]
    fn check_build_and_file_conflict() {
        let result = Cli::try_parse_from([
            "ultimate-setup",
            "check",
            "--build",
            "{}",
            "--file",
            "build.json",
        ]);
        assert!(result.is_err());
    }
}
