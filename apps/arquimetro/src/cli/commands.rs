//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands. Every
//! command except `server` works on the local redb database directly.

use crate::api::{self, AppState};
use crate::backend::{Backend, records::catalog_from_json};
use crate::config::Config;
use crate::notify::Notifier;
use arquimetro_core::{
    ArquimetroError, AssessmentSession, Catalog, CatalogStore, CategoryAssessment, CategoryId,
    DeficiencyType, EvaluationScope, EvaluationStore, RedbStore,
    export::{canonical_checksum, canonical_crypto_hash, export_canonical, import_canonical},
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for catalog import (50 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 50 * 1024 * 1024;

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ArquimetroError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ArquimetroError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ArquimetroError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path; it must be an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ArquimetroError> {
    let canonical = path.canonicalize().map_err(|e| {
        ArquimetroError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ArquimetroError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent of an output path; it must be a directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, ArquimetroError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ArquimetroError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ArquimetroError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ArquimetroError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ArquimetroError> {
    serde_json::to_value(value).map_err(|e| ArquimetroError::SerializationError(e.to_string()))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config: &Config,
    db_path: &Path,
    host: &str,
    port: u16,
) -> Result<(), ArquimetroError> {
    let backend = Backend::from_config(config, db_path)?;

    println!("Arquimetro Assessment Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend.kind());
    match config.remote() {
        Some(remote) => println!("  Remote:   {}", remote.url),
        None => println!("  Database: {:?}", db_path),
    }
    println!();
    println!("Endpoints:");
    println!("  GET  /catalog                     - Full catalog");
    println!("  GET  /evaluations/{{scope}}         - Category overview");
    println!("  POST /evaluations/{{scope}}/start   - Start a category");
    println!("  POST /evaluations/{{scope}}/select  - Select a response");
    println!("  GET  /evaluations/{{scope}}/report  - Assessment report");
    println!("  GET  /health                      - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(backend, Notifier::default(), config.server.clone());
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a database with the default categories.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), ArquimetroError> {
    if db_path.exists() && !force {
        return Err(ArquimetroError::IoError(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let mut store = RedbStore::open(db_path)?;
    store.replace_catalog(Catalog::with_default_categories())?;
    println!(
        "Initialized database at {:?} with {} categories",
        db_path,
        store.catalog().stats().categories
    );
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog counts.
pub fn cmd_status(db_path: &Path, json_mode: bool) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let stats = store.catalog().stats();
    let scopes = store.scope_count()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "categories": stats.categories,
            "subcategories": stats.subcategories,
            "questions": stats.questions,
            "response_options": stats.response_options,
            "evaluation_scopes": scopes,
        }));
        return Ok(());
    }

    println!("Arquimetro Catalog Status");
    println!("=========================");
    println!("Database: {:?}", db_path);
    println!();
    println!("Categories:       {}", stats.categories);
    println!("Subcategories:    {}", stats.subcategories);
    println!("Questions:        {}", stats.questions);
    println!("Response options: {}", stats.response_options);
    println!("Evaluated scopes: {}", scopes);

    Ok(())
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Print the catalog tree in display order.
pub fn cmd_catalog(db_path: &Path, json_mode: bool) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let catalog = store.catalog();

    if json_mode {
        print_json(&to_json(&catalog.to_parts())?);
        return Ok(());
    }

    for category in catalog.categories_ordered() {
        println!("[{}] {}", category.id, category.title);
        for subcategory in catalog.subcategories_ordered(category.id) {
            println!("  [{}] {}", subcategory.id, subcategory.title);
            for question in catalog.questions_ordered(subcategory.id) {
                println!("    [{}] {}", question.id, question.text);
                let options = catalog.options_ordered(question.id);
                if options.is_empty() {
                    println!("      (no response options)");
                }
                for option in options {
                    println!(
                        "      - nível {} ({}) {}",
                        u8::from(option.level),
                        option.weight,
                        option.label
                    );
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// IMPORT / EXPORT COMMANDS
// =============================================================================

/// Replace the catalog from a canonical export or a JSON record dump.
pub fn cmd_import(db_path: &Path, input: &Path) -> Result<(), ArquimetroError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| ArquimetroError::IoError(format!("Read file: {}", e)))?;

    let catalog = match import_canonical(&data) {
        Ok(catalog) => catalog,
        Err(canonical_err) => {
            let value: serde_json::Value = serde_json::from_slice(&data).map_err(|_| {
                ArquimetroError::DeserializationError(format!(
                    "File is neither a canonical export ({}) nor JSON",
                    canonical_err
                ))
            })?;
            catalog_from_json(&value)?
        }
    };

    let stats = catalog.stats();
    let mut store = RedbStore::open(db_path)?;
    store.replace_catalog(catalog)?;

    println!(
        "Imported catalog: {} categories, {} subcategories, {} questions, {} response options",
        stats.categories, stats.subcategories, stats.questions, stats.response_options
    );
    Ok(())
}

/// Export the catalog.
pub fn cmd_export(db_path: &Path, output: &Path, format: &str) -> Result<(), ArquimetroError> {
    let validated_output = validate_output_path(output)?;
    let store = RedbStore::open(db_path)?;
    let catalog = store.snapshot()?;

    let data = match format {
        "canonical" => {
            let data = export_canonical(&catalog)?;
            println!("Checksum: {}", canonical_checksum(&catalog));
            data
        }
        "json" => serde_json::to_vec_pretty(&catalog.to_parts())
            .map_err(|e| ArquimetroError::SerializationError(e.to_string()))?,
        _ => {
            return Err(ArquimetroError::SerializationError(format!(
                "Unknown format: {}. Use: canonical, json",
                format
            )));
        }
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| ArquimetroError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

/// Compute the BLAKE3 hash of the canonical catalog.
pub fn cmd_hash(db_path: &Path, json_mode: bool) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let catalog = store.catalog();
    let hash = canonical_crypto_hash(catalog)?;
    let checksum = canonical_checksum(catalog);

    if json_mode {
        print_json(&serde_json::json!({
            "algorithm": "blake3",
            "hash": hash,
            "checksum": checksum,
        }));
    } else {
        println!("BLAKE3:   {}", hash);
        println!("Checksum: {}", checksum);
    }
    Ok(())
}

// =============================================================================
// ASSESSMENT COMMANDS
// =============================================================================

/// Open the scope's recorded answers against the stored catalog.
fn load_session(store: &RedbStore, scope: &str) -> Result<AssessmentSession, ArquimetroError> {
    let scope = EvaluationScope::new(scope)?;
    let responses = store.user_responses(&scope)?;
    Ok(AssessmentSession::load(scope, store.snapshot()?, responses))
}

/// Show per-category and overall progress.
pub fn cmd_progress(db_path: &Path, scope: &str, json_mode: bool) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let session = load_session(&store, scope)?;
    let overall = session.overall_progress()?;

    if json_mode {
        print_json(&to_json(&overall)?);
        return Ok(());
    }

    println!("Progress for '{}'", session.scope());
    println!();
    for progress in &overall.categories {
        let title = session
            .catalog()
            .category(progress.category_id)
            .map(|c| c.title.as_str())
            .unwrap_or("?");
        let state = if progress.in_configuration {
            "em configuração".to_string()
        } else {
            format!("{}/{} ({}%)", progress.answered, progress.total, progress.percent)
        };
        println!("  {:<40} {}", title, state);
    }
    println!();
    println!(
        "Overall: {}/{} categories complete ({}%)",
        overall.complete_categories, overall.total_categories, overall.percent
    );
    Ok(())
}

/// Show the score of one category.
pub fn cmd_score(
    db_path: &Path,
    scope: &str,
    category: u64,
    json_mode: bool,
) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let session = load_session(&store, scope)?;
    let assessment = session.category_assessment(CategoryId(category))?;

    if json_mode {
        print_json(&to_json(&assessment)?);
        return Ok(());
    }

    match assessment {
        CategoryAssessment::InConfiguration { gap } => {
            println!("Category {} is still being configured: {}", category, gap);
        }
        CategoryAssessment::Pending { total_questions } => {
            println!(
                "Category {} has {} questions and none answered yet",
                category, total_questions
            );
        }
        CategoryAssessment::Scored { score } => {
            println!("Average:     {}", score.average_score);
            println!("Maturity:    {}", score.maturity_level);
            println!(
                "Answered:    {}/{}",
                score.answered_questions, score.total_questions
            );
            println!("Deficiencies:");
            for tag in DeficiencyType::ALL {
                println!("  {:<16} {}", tag.label(), score.deficiencies.get(tag));
            }
        }
    }
    Ok(())
}

/// Write the assessment report to a file or stdout.
pub fn cmd_report(
    db_path: &Path,
    scope: &str,
    output: Option<&Path>,
    format: &str,
) -> Result<(), ArquimetroError> {
    let store = RedbStore::open(db_path)?;
    let report = load_session(&store, scope)?.report()?;

    let text = match format {
        "text" => report.render_text(),
        "json" => serde_json::to_string_pretty(&report)
            .map_err(|e| ArquimetroError::SerializationError(e.to_string()))?,
        _ => {
            return Err(ArquimetroError::SerializationError(format!(
                "Unknown format: {}. Use: text, json",
                format
            )));
        }
    };

    match output {
        Some(path) => {
            let validated_output = validate_output_path(path)?;
            std::fs::write(&validated_output, text.as_bytes())
                .map_err(|e| ArquimetroError::IoError(format!("Write file: {}", e)))?;
            println!("Report written to {:?}", validated_output);
        }
        None => println!("{}", text),
    }
    Ok(())
}
