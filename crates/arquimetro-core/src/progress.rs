//! # Progress Tracker
//!
//! Per-category completion and overall completion across all categories.
//!
//! Percentages are integers rounded half-up; an empty denominator yields 0.

use crate::catalog::Catalog;
use crate::outline::CategoryOutline;
use crate::types::{ArquimetroError, CategoryId, QuestionId, ResponseOptionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Half-up rounded `part / whole * 100`, clamped to `0..=100`.
#[must_use]
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part.saturating_mul(200) + whole) / whole.saturating_mul(2);
    rounded.min(100) as u8
}

/// Completion of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category_id: CategoryId,
    /// Answerable questions with a valid recorded response.
    pub answered: u32,
    /// Answerable questions.
    pub total: u32,
    pub percent: u8,
    pub is_complete: bool,
    /// The category has nothing answerable yet.
    pub in_configuration: bool,
}

/// Completion across every category of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub complete_categories: u32,
    pub total_categories: u32,
    pub percent: u8,
    pub categories: Vec<CategoryProgress>,
}

/// Progress Tracker - Pure functions from responses to completion figures.
pub struct ProgressTracker;

impl ProgressTracker {
    /// Completion of one category.
    #[must_use]
    pub fn category_progress(
        outline: &CategoryOutline,
        responses: &BTreeMap<QuestionId, ResponseOptionId>,
    ) -> CategoryProgress {
        let answered = outline
            .answerable()
            .iter()
            .filter(|q| {
                responses
                    .get(&q.id())
                    .is_some_and(|option| q.option(*option).is_some())
            })
            .count() as u32;
        let total = outline.answerable_count() as u32;

        CategoryProgress {
            category_id: outline.category_id(),
            answered,
            total,
            percent: percent(u64::from(answered), u64::from(total)),
            is_complete: total > 0 && answered == total,
            in_configuration: outline.gap().is_some(),
        }
    }

    /// Completion over every category, in catalog order.
    ///
    /// Categories in configuration count toward the total and never as
    /// complete.
    pub fn overall_progress(
        catalog: &Catalog,
        responses: &BTreeMap<QuestionId, ResponseOptionId>,
    ) -> Result<OverallProgress, ArquimetroError> {
        let mut categories = Vec::new();
        for category in catalog.categories_ordered() {
            let outline = CategoryOutline::build(catalog, category.id)?;
            categories.push(Self::category_progress(&outline, responses));
        }
        Ok(Self::summarize(categories))
    }

    /// Fold per-category figures into the overall figure.
    #[must_use]
    pub fn summarize(categories: Vec<CategoryProgress>) -> OverallProgress {
        let complete_categories = categories.iter().filter(|c| c.is_complete).count() as u32;
        let total_categories = categories.len() as u32;
        OverallProgress {
            complete_categories,
            total_categories,
            percent: percent(u64::from(complete_categories), u64::from(total_categories)),
            categories,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
