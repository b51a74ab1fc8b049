//! # Arquimetro - Records-Management Maturity Assessment
//!
//! The main binary for the Arquimetro assessment engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for catalog and assessment operations
//! - A backend boundary: embedded redb database or hosted REST backend
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/arquimetro (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐  │
//! │  │    CLI      │    │  HTTP API   │    │     Backend      │  │
//! │  │   (clap)    │    │   (axum)    │    │ (redb / reqwest) │  │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘  │
//! │         │                  │                    │            │
//! │         └──────────────────┼────────────────────┘            │
//! │                            ▼                                 │
//! │                  ┌──────────────────┐                        │
//! │                  │ arquimetro-core  │                        │
//! │                  │   (THE LOGIC)    │                        │
//! │                  └──────────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Create a database with the default categories
//! arquimetro init
//!
//! # Start the HTTP server
//! arquimetro server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! arquimetro import -i catalog.json
//! arquimetro progress --scope arquivo-central
//! arquimetro report --scope arquivo-central -o relatorio.txt
//! ```

use arquimetro::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ARQUIMETRO_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("ARQUIMETRO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arquimetro=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
   Arquimetro v{}

   Diagnóstico de maturidade em gestão de documentos
"#,
        env!("CARGO_PKG_VERSION")
    );
}
