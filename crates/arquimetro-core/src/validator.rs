//! # Validator Module
//!
//! Field validation for catalog drafts.
//!
//! - Validate drafts before any store mutation
//! - Reject malformed input with the offending field named
//! - No normalization beyond trimming

use crate::primitives::{
    MAX_LEVEL, MAX_TEXT_LENGTH, MAX_TITLE_LENGTH, MAX_WEIGHT_HUNDREDTHS, MIN_LEVEL,
};
use crate::types::{
    ArquimetroError, CategoryDraft, EntityKind, QuestionDraft, ResponseOptionDraft,
    SubcategoryDraft, Weight,
};

/// The Validator checks drafts at the store boundary.
///
/// A draft that passes validation can be turned into a record without
/// further checks; parent existence is verified by the store itself.
pub struct Validator;

impl Validator {
    /// Validate a category draft.
    ///
    /// - `title` is non-empty and at most `MAX_TITLE_LENGTH` bytes
    /// - `icon` and `color` are at most `MAX_TITLE_LENGTH` bytes
    /// - `description` is at most `MAX_TEXT_LENGTH` bytes
    pub fn validate_category(draft: &CategoryDraft) -> Result<(), ArquimetroError> {
        let entity = EntityKind::Category;
        required(entity, "title", &draft.title, MAX_TITLE_LENGTH)?;
        bounded(entity, "description", &draft.description, MAX_TEXT_LENGTH)?;
        bounded(entity, "icon", &draft.icon, MAX_TITLE_LENGTH)?;
        bounded(entity, "color", &draft.color, MAX_TITLE_LENGTH)?;
        Ok(())
    }

    /// Validate a subcategory draft.
    pub fn validate_subcategory(draft: &SubcategoryDraft) -> Result<(), ArquimetroError> {
        required(
            EntityKind::Subcategory,
            "title",
            &draft.title,
            MAX_TITLE_LENGTH,
        )
    }

    /// Validate a question draft.
    pub fn validate_question(draft: &QuestionDraft) -> Result<(), ArquimetroError> {
        required(EntityKind::Question, "text", &draft.text, MAX_TEXT_LENGTH)
    }

    /// Validate a response option draft.
    ///
    /// - `level` is within `MIN_LEVEL..=MAX_LEVEL`
    /// - `label` and `feedback` are non-empty
    /// - `weight` is at most `MAX_WEIGHT_HUNDREDTHS`
    pub fn validate_response_option(draft: &ResponseOptionDraft) -> Result<(), ArquimetroError> {
        let entity = EntityKind::ResponseOption;

        if !(MIN_LEVEL..=MAX_LEVEL).contains(&draft.level) {
            return Err(ArquimetroError::validation(
                entity,
                "level",
                format!(
                    "{} is outside {}..={}",
                    draft.level, MIN_LEVEL, MAX_LEVEL
                ),
            ));
        }

        required(entity, "label", &draft.label, MAX_TITLE_LENGTH)?;
        bounded(entity, "explanation", &draft.explanation, MAX_TEXT_LENGTH)?;
        required(entity, "feedback", &draft.feedback, MAX_TEXT_LENGTH)?;
        Self::validate_weight(draft.weight)
    }

    /// Validate a weight against the scoring scale.
    pub fn validate_weight(weight: Weight) -> Result<(), ArquimetroError> {
        if weight.hundredths() > MAX_WEIGHT_HUNDREDTHS {
            return Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "weight",
                format!(
                    "{} exceeds the maximum of {}",
                    weight,
                    Weight::from_hundredths(MAX_WEIGHT_HUNDREDTHS)
                ),
            ));
        }
        Ok(())
    }
}

fn required(
    entity: EntityKind,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ArquimetroError> {
    if value.trim().is_empty() {
        return Err(ArquimetroError::validation(entity, field, "must not be empty"));
    }
    bounded(entity, field, value, max_len)
}

fn bounded(
    entity: EntityKind,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ArquimetroError> {
    if value.len() > max_len {
        return Err(ArquimetroError::validation(
            entity,
            field,
            format!("exceeds {} bytes", max_len),
        ));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
