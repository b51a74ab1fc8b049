//! # Core Type Definitions
//!
//! This module contains all core types for the Arquimetro assessment engine:
//! - Catalog identifiers (`CategoryId`, `SubcategoryId`, `QuestionId`, `ResponseOptionId`)
//! - Evaluation scope (`EvaluationScope`)
//! - Fixed-point quantities (`Level`, `Weight`)
//! - Deficiency tags (`DeficiencyType`, `DeficiencySet`)
//! - Catalog records and their drafts
//! - Error types (`ArquimetroError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (weights are stored in hundredths)
//! - Implement `Ord` where they are used as `BTreeMap`/`BTreeSet` keys

use crate::primitives::{
    DEFAULT_WEIGHT_HUNDREDTHS, MAX_LEVEL, MAX_PARSED_WEIGHT_HUNDREDTHS, MAX_SCOPE_LENGTH,
    MIN_LEVEL, WEIGHT_DECIMALS,
};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CATALOG IDENTIFIERS
// =============================================================================

/// Identifier of a top-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Identifier of a subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubcategoryId(pub u64);

/// Identifier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

/// Identifier of a response option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseOptionId(pub u64);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

display_id!(CategoryId, SubcategoryId, QuestionId, ResponseOptionId);

// =============================================================================
// EVALUATION SCOPE
// =============================================================================

/// The owner of a set of responses (typically one user of one institution).
///
/// Scopes are non-empty, at most `MAX_SCOPE_LENGTH` bytes, and limited to
/// ASCII alphanumerics plus `-`, `_`, `.` and `@`. A scope made only of
/// dots is rejected so it can be spliced into a URL path as one segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvaluationScope(String);

impl EvaluationScope {
    /// Create a validated scope.
    pub fn new(scope: impl Into<String>) -> Result<Self, ArquimetroError> {
        let scope = scope.into();
        if scope.is_empty() {
            return Err(ArquimetroError::validation(
                EntityKind::Evaluation,
                "scope",
                "must not be empty",
            ));
        }
        if scope.len() > MAX_SCOPE_LENGTH {
            return Err(ArquimetroError::validation(
                EntityKind::Evaluation,
                "scope",
                format!("exceeds {} bytes", MAX_SCOPE_LENGTH),
            ));
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@');
        if !scope.chars().all(allowed) {
            return Err(ArquimetroError::validation(
                EntityKind::Evaluation,
                "scope",
                "contains unsupported characters",
            ));
        }
        // "." and ".." are path segments, not identifiers
        if scope.chars().all(|c| c == '.') {
            return Err(ArquimetroError::validation(
                EntityKind::Evaluation,
                "scope",
                "must not consist only of dots",
            ));
        }
        Ok(Self(scope))
    }

    /// Get the scope as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EvaluationScope {
    type Error = ArquimetroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EvaluationScope> for String {
    fn from(scope: EvaluationScope) -> Self {
        scope.0
    }
}

impl fmt::Display for EvaluationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LEVEL
// =============================================================================

/// Ordinal level of a response option, `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Create a level, rejecting values outside `MIN_LEVEL..=MAX_LEVEL`.
    pub fn new(level: u8) -> Result<Self, ArquimetroError> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "level",
                format!("must be between {} and {}", MIN_LEVEL, MAX_LEVEL),
            ))
        }
    }

    /// Get the raw level value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Level {
    type Error = ArquimetroError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

// =============================================================================
// FIXED-POINT DECIMALS
// =============================================================================

/// Parse a plain non-negative decimal ("4", "4.5", "4.25") into an integer
/// scaled by `10^decimals`.
///
/// Exponents, signs and more than `decimals` fractional digits are rejected.
pub(crate) fn parse_fixed(text: &str, decimals: u32) -> Option<u32> {
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) || fraction.len() > decimals as usize {
        return None;
    }
    if text.ends_with('.') {
        return None;
    }

    let scale = 10u32.checked_pow(decimals)?;
    let whole: u32 = whole.parse().ok()?;
    let mut frac: u32 = if fraction.is_empty() {
        0
    } else {
        fraction.parse().ok()?
    };
    for _ in fraction.len()..decimals as usize {
        frac = frac.checked_mul(10)?;
    }
    whole.checked_mul(scale)?.checked_add(frac)
}

/// Render a fixed-point integer as a decimal string, keeping at least one
/// fractional digit ("1.0", "4.5", "4.25").
pub(crate) fn format_fixed(value: u32, decimals: u32) -> String {
    let scale = 10u32.pow(decimals);
    let whole = value / scale;
    let mut frac = value % scale;
    let mut digits = decimals as usize;
    while digits > 1 && frac % 10 == 0 {
        frac /= 10;
        digits -= 1;
    }
    format!("{}.{:0width$}", whole, frac, width = digits)
}

/// Serialize a fixed-point value as a JSON-style number for human-readable
/// formats and as its raw integer for binary ones.
pub(crate) fn serialize_fixed<S: Serializer>(
    value: u32,
    decimals: u32,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        let number: f64 = format_fixed(value, decimals)
            .parse()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(number)
    } else {
        serializer.serialize_u32(value)
    }
}

/// Visitor accepting numbers or decimal strings for fixed-point values.
pub(crate) struct FixedVisitor {
    pub(crate) decimals: u32,
    pub(crate) what: &'static str,
}

impl Visitor<'_> for FixedVisitor {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative decimal {}", self.what)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        if v < 0 {
            return Err(E::custom(format!("{} must not be negative", self.what)));
        }
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
        self.visit_str(&format!("{}", v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u32, E> {
        parse_fixed(v, self.decimals)
            .ok_or_else(|| E::custom(format!("invalid {}: '{}'", self.what, v)))
    }
}

pub(crate) fn deserialize_fixed<'de, D: Deserializer<'de>>(
    deserializer: D,
    decimals: u32,
    what: &'static str,
) -> Result<u32, D::Error> {
    if deserializer.is_human_readable() {
        deserializer.deserialize_any(FixedVisitor { decimals, what })
    } else {
        u32::deserialize(deserializer)
    }
}

// =============================================================================
// WEIGHT
// =============================================================================

/// Weight of a response option on the 1–5 scoring scale.
///
/// Stored as hundredths (`4.5` is `450`), so scores never touch
/// floating-point arithmetic. Defaults to `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(u32);

impl Weight {
    /// Create a weight from hundredths.
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Create a weight from a whole number of points.
    #[must_use]
    pub const fn whole(points: u32) -> Self {
        Self(points.saturating_mul(100))
    }

    /// Get the raw value in hundredths.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(DEFAULT_WEIGHT_HUNDREDTHS)
    }
}

impl FromStr for Weight {
    type Err = ArquimetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, WEIGHT_DECIMALS)
            .filter(|h| *h <= MAX_PARSED_WEIGHT_HUNDREDTHS)
            .map(Self)
            .ok_or_else(|| {
                ArquimetroError::validation(
                    EntityKind::ResponseOption,
                    "weight",
                    format!("'{}' is not a non-negative decimal number", s.trim()),
                )
            })
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, WEIGHT_DECIMALS))
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_fixed(self.0, WEIGHT_DECIMALS, serializer)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_fixed(deserializer, WEIGHT_DECIMALS, "weight").map(Self)
    }
}

// =============================================================================
// DEFICIENCY TYPES
// =============================================================================

/// Kind of weakness a response option points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeficiencyType {
    /// Technical knowledge or procedure gaps.
    Tecnica,
    /// Behavioral or organizational gaps.
    Comportamental,
    /// Tooling gaps.
    Ferramental,
}

impl DeficiencyType {
    /// All deficiency types in canonical order.
    pub const ALL: [DeficiencyType; 3] = [
        DeficiencyType::Tecnica,
        DeficiencyType::Comportamental,
        DeficiencyType::Ferramental,
    ];

    /// Machine code, as used on the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DeficiencyType::Tecnica => "tecnica",
            DeficiencyType::Comportamental => "comportamental",
            DeficiencyType::Ferramental => "ferramental",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            DeficiencyType::Tecnica => "Técnica",
            DeficiencyType::Comportamental => "Comportamental",
            DeficiencyType::Ferramental => "Ferramental",
        }
    }
}

impl FromStr for DeficiencyType {
    type Err = ArquimetroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tecnica" | "técnica" => Ok(DeficiencyType::Tecnica),
            "comportamental" => Ok(DeficiencyType::Comportamental),
            "ferramental" => Ok(DeficiencyType::Ferramental),
            other => Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "deficiency_types",
                format!("unknown deficiency type '{}'", other),
            )),
        }
    }
}

impl fmt::Display for DeficiencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A set of deficiency tags. A response may carry several at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeficiencySet(BTreeSet<DeficiencyType>);

impl DeficiencySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: DeficiencyType) -> bool {
        self.0.insert(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: DeficiencyType) -> bool {
        self.0.contains(&tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = DeficiencyType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<DeficiencyType> for DeficiencySet {
    fn from_iter<I: IntoIterator<Item = DeficiencyType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// Top-level grouping of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub sort_order: i32,
}

/// A group of questions inside one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub title: String,
    pub category_id: CategoryId,
    pub sort_order: i32,
}

/// A single questionnaire item.
///
/// `deficiency_types` is informational; tallies use the tags of the
/// selected response option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub subcategory_id: SubcategoryId,
    #[serde(default)]
    pub deficiency_types: DeficiencySet,
    pub sort_order: i32,
}

/// One leveled answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOption {
    pub id: ResponseOptionId,
    pub question_id: QuestionId,
    pub level: Level,
    pub label: String,
    #[serde(default)]
    pub explanation: String,
    pub feedback: String,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub deficiency_types: DeficiencySet,
}

// =============================================================================
// DRAFTS (create / update payloads)
// =============================================================================

/// Fields of a category before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// Fields of a subcategory before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryDraft {
    pub title: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub sort_order: i32,
}

/// Fields of a question before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub subcategory_id: SubcategoryId,
    #[serde(default)]
    pub deficiency_types: DeficiencySet,
    #[serde(default)]
    pub sort_order: i32,
}

/// Fields of a response option before an id is assigned.
///
/// `level` is kept raw so the validator can report it by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOptionDraft {
    pub question_id: QuestionId,
    pub level: u8,
    pub label: String,
    #[serde(default)]
    pub explanation: String,
    pub feedback: String,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub deficiency_types: DeficiencySet,
}

impl Category {
    /// Build a record from a validated draft.
    #[must_use]
    pub fn from_draft(id: CategoryId, draft: CategoryDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            icon: draft.icon,
            color: draft.color,
            sort_order: draft.sort_order,
        }
    }

    /// The draft that would recreate this record.
    #[must_use]
    pub fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            color: self.color.clone(),
            sort_order: self.sort_order,
        }
    }
}

impl Subcategory {
    #[must_use]
    pub fn from_draft(id: SubcategoryId, draft: SubcategoryDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            category_id: draft.category_id,
            sort_order: draft.sort_order,
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> SubcategoryDraft {
        SubcategoryDraft {
            title: self.title.clone(),
            category_id: self.category_id,
            sort_order: self.sort_order,
        }
    }
}

impl Question {
    #[must_use]
    pub fn from_draft(id: QuestionId, draft: QuestionDraft) -> Self {
        Self {
            id,
            text: draft.text.trim().to_string(),
            subcategory_id: draft.subcategory_id,
            deficiency_types: draft.deficiency_types,
            sort_order: draft.sort_order,
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            text: self.text.clone(),
            subcategory_id: self.subcategory_id,
            deficiency_types: self.deficiency_types.clone(),
            sort_order: self.sort_order,
        }
    }
}

impl ResponseOption {
    /// Build a record from a draft, validating the level.
    pub fn from_draft(
        id: ResponseOptionId,
        draft: ResponseOptionDraft,
    ) -> Result<Self, ArquimetroError> {
        Ok(Self {
            id,
            question_id: draft.question_id,
            level: Level::new(draft.level)?,
            label: draft.label.trim().to_string(),
            explanation: draft.explanation,
            feedback: draft.feedback.trim().to_string(),
            weight: draft.weight,
            deficiency_types: draft.deficiency_types,
        })
    }

    #[must_use]
    pub fn to_draft(&self) -> ResponseOptionDraft {
        ResponseOptionDraft {
            question_id: self.question_id,
            level: self.level.value(),
            label: self.label.clone(),
            explanation: self.explanation.clone(),
            feedback: self.feedback.clone(),
            weight: self.weight,
            deficiency_types: self.deficiency_types.clone(),
        }
    }
}

// =============================================================================
// ENTITY REFERENCES
// =============================================================================

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Subcategory,
    Question,
    ResponseOption,
    Evaluation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Category => "category",
            EntityKind::Subcategory => "subcategory",
            EntityKind::Question => "question",
            EntityKind::ResponseOption => "response option",
            EntityKind::Evaluation => "evaluation",
        };
        f.write_str(name)
    }
}

/// A typed reference to one catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Category(CategoryId),
    Subcategory(SubcategoryId),
    Question(QuestionId),
    ResponseOption(ResponseOptionId),
}

impl EntityRef {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Category(_) => EntityKind::Category,
            EntityRef::Subcategory(_) => EntityKind::Subcategory,
            EntityRef::Question(_) => EntityKind::Question,
            EntityRef::ResponseOption(_) => EntityKind::ResponseOption,
        }
    }

    /// Raw numeric id.
    #[must_use]
    pub fn raw_id(&self) -> u64 {
        match self {
            EntityRef::Category(id) => id.0,
            EntityRef::Subcategory(id) => id.0,
            EntityRef::Question(id) => id.0,
            EntityRef::ResponseOption(id) => id.0,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

// =============================================================================
// CONFIGURATION GAPS
// =============================================================================

/// Why a category has nothing to answer yet ("em configuração").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationGap {
    /// The category has no subcategories.
    NoSubcategories,
    /// The subcategories hold no questions.
    NoQuestions,
    /// No question has any response option.
    NoResponseOptions,
}

impl fmt::Display for ConfigurationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ConfigurationGap::NoSubcategories => "category has no subcategories",
            ConfigurationGap::NoQuestions => "category has no questions",
            ConfigurationGap::NoResponseOptions => "no question has response options",
        };
        f.write_str(reason)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Arquimetro system.
///
/// - No silent failures
/// - Use `Result<T, ArquimetroError>` for fallible operations
/// - No error is fatal; every variant leaves in-memory state usable
#[derive(Debug, Error)]
pub enum ArquimetroError {
    /// A required field is missing, empty or out of range.
    #[error("Invalid {entity} field '{field}': {reason}")]
    Validation {
        entity: EntityKind,
        field: &'static str,
        reason: String,
    },

    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(EntityRef),

    /// The category cannot be assessed yet.
    #[error("Not yet configured: {0}")]
    EmptyCatalog(ConfigurationGap),

    /// An operation needed an active evaluation and there is none.
    #[error("No active evaluation")]
    NoActiveEvaluation,

    /// The external persistence call failed.
    #[error("Backend error: {message}")]
    Backend { message: String, retryable: bool },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl ArquimetroError {
    /// Shorthand for a `Validation` error.
    pub fn validation(entity: EntityKind, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            field,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ArquimetroError::Backend {
                retryable: true,
                ..
            } | ArquimetroError::IoError(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
