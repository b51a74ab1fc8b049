//! # Arquimetro CLI Module
//!
//! This module implements the CLI interface for Arquimetro.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a database with the default categories
//! - `status` - Show catalog counts
//! - `catalog` - Print the catalog tree
//! - `import` - Replace the catalog from a canonical or JSON file
//! - `export` - Export the catalog
//! - `hash` - Compute the BLAKE3 hash of the catalog
//! - `progress` - Show assessment progress for a scope
//! - `score` - Show one category's score for a scope
//! - `report` - Write the assessment report for a scope

mod commands;

use crate::config::Config;
use arquimetro_core::ArquimetroError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Arquimetro - records-management maturity assessment
///
/// Collects one answer per catalog question and derives a weighted score
/// and maturity level for every category.
#[derive(Parser, Debug)]
#[command(name = "arquimetro")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the catalog database (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

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
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Initialize a database with the default categories
    Init {
        /// Overwrite the catalog of an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Show catalog status
    Status,

    /// Print the catalog tree
    Catalog,

    /// Replace the catalog from a file (canonical or JSON)
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Export the catalog
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (canonical, json)
        #[arg(short = 't', long, default_value = "canonical")]
        format: String,
    },

    /// Compute BLAKE3 cryptographic hash of the catalog
    Hash,

    /// Show assessment progress
    Progress {
        /// Evaluation scope (user or institution identifier)
        #[arg(short, long)]
        scope: String,
    },

    /// Show the score of one category
    Score {
        /// Evaluation scope (user or institution identifier)
        #[arg(short, long)]
        scope: String,

        /// Category id
        #[arg(short = 'C', long)]
        category: u64,
    },

    /// Write the assessment report
    Report {
        /// Evaluation scope (user or institution identifier)
        #[arg(short, long)]
        scope: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (text, json)
        #[arg(short = 't', long, default_value = "text")]
        format: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ArquimetroError> {
    let config = Config::load(cli.config.as_deref())?;
    let db_path = config.database_path(cli.database.as_deref());
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!("Database: {:?}", db_path);
    }

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&config, &db_path, &host, port).await,
        Some(Commands::Init { force }) => cmd_init(&db_path, force),
        Some(Commands::Status) => cmd_status(&db_path, json_mode),
        Some(Commands::Catalog) => cmd_catalog(&db_path, json_mode),
        Some(Commands::Import { input }) => cmd_import(&db_path, &input),
        Some(Commands::Export { output, format }) => cmd_export(&db_path, &output, &format),
        Some(Commands::Hash) => cmd_hash(&db_path, json_mode),
        Some(Commands::Progress { scope }) => cmd_progress(&db_path, &scope, json_mode),
        Some(Commands::Score { scope, category }) => {
            cmd_score(&db_path, &scope, category, json_mode)
        }
        Some(Commands::Report {
            scope,
            output,
            format,
        }) => cmd_report(&db_path, &scope, output.as_deref(), &format),
        None => cmd_status(&db_path, json_mode),
    }
}
