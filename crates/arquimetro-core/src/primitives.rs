//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Arquimetro CORE.
//!
//! These primitives are compiled into the binary and are immutable at runtime.
//!
//! ## Primitives
//!
//! 1. **Scale**: Levels run 1..=5, weights 0.00..=5.00 in hundredths.
//! 2. **Limits**: Field lengths and import sizes are bounded.
//! 3. **Format**: Canonical exports carry fixed magic bytes and a version.

/// Lowest response option level.
pub const MIN_LEVEL: u8 = 1;

/// Highest response option level.
pub const MAX_LEVEL: u8 = 5;

/// Maximum number of response options attached to one question.
pub const MAX_OPTIONS_PER_QUESTION: usize = 5;

// =============================================================================
// FIXED-POINT SCALES
// =============================================================================

/// Weights carry two decimal digits (`4.25` is stored as `425`).
pub const WEIGHT_DECIMALS: u32 = 2;

/// Scores carry one decimal digit (`4.0` is stored as `40`).
pub const SCORE_DECIMALS: u32 = 1;

/// Weight applied when a response option does not specify one (`1.00`).
pub const DEFAULT_WEIGHT_HUNDREDTHS: u32 = 100;

/// Highest weight accepted by the validator (`5.00`).
pub const MAX_WEIGHT_HUNDREDTHS: u32 = 500;

/// Upper bound for parsed weights before range validation.
///
/// Keeps sums over `u64` far from overflow while still letting the
/// validator report out-of-range weights by field name.
pub const MAX_PARSED_WEIGHT_HUNDREDTHS: u32 = 1_000_000;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for titles, labels and short strings (icon, color).
pub const MAX_TITLE_LENGTH: usize = 256;

/// Maximum length for question text, descriptions, explanations and feedback.
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Maximum length of an evaluation scope identifier.
pub const MAX_SCOPE_LENGTH: usize = 128;

/// Maximum number of records accepted in a single import.
pub const MAX_IMPORT_RECORDS: usize = 100_000;

// =============================================================================
// CANONICAL EXPORT FORMAT
// =============================================================================

/// Magic bytes for the canonical catalog export header.
pub const EXPORT_MAGIC: &[u8; 4] = b"ARQX";

/// Current canonical export format version.
///
/// Increment this when making breaking changes to the export layout.
pub const EXPORT_VERSION: u8 = 1;

/// Largest canonical export accepted by `import_canonical` (64 MiB).
pub const MAX_EXPORT_SIZE: usize = 64 * 1024 * 1024;
