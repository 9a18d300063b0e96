//! # Ultimate Setup
//!
//! PC build configurator server and CLI.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/setup (THE BINARY)               │
//! │                                                      │
//! │   ┌───────────┐   ┌───────────┐   ┌──────────────┐   │
//! │   │    CLI    │   │  HTTP API │   │ Catalog load │   │
//! │   │  (clap)   │   │  (axum)   │   │  (reqwest)   │   │
//! │   └─────┬─────┘   └─────┬─────┘   └──────┬───────┘   │
//! │         └───────────────┼────────────────┘           │
//! │                         ▼                            │
//! │                  ┌─────────────┐                     │
//! │                  │  setup-core │                     │
//! │                  └─────────────┘                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! ultimate-setup init
//! ultimate-setup serve --port 8080
//! ultimate-setup catalog --category gpu
//! ultimate-setup check --build '{"cpu":"cpu-r5-7600","motherboard":"mb-b650-tomahawk"}'
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ultimate_setup::cli;

#[tokio::main]
async fn main() {
    // USETUP_LOG_FORMAT=json switches to machine-parseable output
    let log_format = std::env::var("USETUP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ultimate_setup=info,setup_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    eprintln!(
        r#"
  ╦ ╦╦  ╔╦╗╦╔╦╗╔═╗╔╦╗╔═╗  ╔═╗╔═╗╔╦╗╦ ╦╔═╗
  ║ ║║   ║ ║║║║╠═╣ ║ ║╣   ╚═╗║╣  ║ ║ ║╠═╝
  ╚═╝╩═╝ ╩ ╩╩ ╩╩ ╩ ╩ ╚═╝  ╚═╝╚═╝ ╩ ╚═╝╩

  PC Build Configurator v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
