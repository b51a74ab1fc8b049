//! # arquimetro-core
//!
//! The deterministic assessment engine for Arquimetro - THE LOGIC.
//!
//! This crate measures the records-management maturity of an institution
//! against a configurable question catalog:
//! - `catalog` stores categories, subcategories, questions and response options
//! - `evaluation` collects one answer per question and navigates between them
//! - `score` turns the selected weights into an average and a maturity level
//! - `progress` reports answered/total counts per category and overall
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Uses fixed-point arithmetic only: weights in hundredths, scores in tenths
//! - Uses BTreeMap everywhere so iteration order is stable
//! - Owns no connection to the outside world: fetching, notifying and
//!   exporting belong to the application crate

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod evaluation;
pub mod export;
pub mod outline;
pub mod primitives;
pub mod progress;
pub mod report;
pub mod score;
pub mod session;
pub mod storage;
pub mod types;
pub mod validator;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ArquimetroError, Category, CategoryDraft, CategoryId, ConfigurationGap, DeficiencySet,
    DeficiencyType, EntityKind, EntityRef, EvaluationScope, Level, Question, QuestionDraft,
    QuestionId, ResponseOption, ResponseOptionDraft, ResponseOptionId, Subcategory,
    SubcategoryDraft, SubcategoryId, Weight,
};

// =============================================================================
// RE-EXPORTS: Catalog
// =============================================================================

pub use catalog::{
    Catalog, CatalogMutation, CatalogParts, CatalogRecord, CatalogStats, CatalogStore,
    DeletionSummary, MutationOutcome,
};
pub use outline::{CategoryOutline, OutlineQuestion};
pub use validator::Validator;

// =============================================================================
// RE-EXPORTS: Evaluation, Scoring, Progress
// =============================================================================

pub use evaluation::{Evaluation, Navigation, NavigationBlock};
pub use progress::{CategoryProgress, OverallProgress, ProgressTracker};
pub use report::{AnswerFeedback, AssessmentReport, CategoryReport};
pub use score::{
    CategoryAssessment, CategoryScore, DeficiencyTally, MaturityLevel, Score, ScoreAggregator,
};
pub use session::{AssessmentSession, Selection};

// =============================================================================
// RE-EXPORTS: Persistence
// =============================================================================

pub use export::{
    CanonicalCatalog, CanonicalHeader, canonical_checksum, export_canonical, import_canonical,
    verify_canonical,
};
pub use storage::{EvaluationStore, RedbStore};
