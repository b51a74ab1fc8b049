//! # Category Outline
//!
//! The flattened, ordered question list of one category.
//!
//! Questions are ordered by subcategory `(sort_order, id)` and then by
//! question `(sort_order, id)`. Questions without response options are
//! unanswerable: they are kept apart and never enter navigation, scoring
//! or progress denominators.

use crate::catalog::CatalogStore;
use crate::types::{
    ArquimetroError, Category, CategoryId, ConfigurationGap, EntityRef, Question, QuestionId,
    ResponseOption, ResponseOptionId,
};
use serde::Serialize;

/// One answerable question with its options ordered by level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineQuestion {
    pub question: Question,
    pub subcategory_title: String,
    pub options: Vec<ResponseOption>,
}

impl OutlineQuestion {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id
    }

    /// Find one of this question's options.
    #[must_use]
    pub fn option(&self, id: ResponseOptionId) -> Option<&ResponseOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// The ordered question list of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutline {
    category: Category,
    subcategory_count: usize,
    answerable: Vec<OutlineQuestion>,
    unanswerable: Vec<Question>,
}

impl CategoryOutline {
    /// Build the outline of one category from any catalog store.
    ///
    /// Returns `NotFound` when the category does not exist. A category with
    /// nothing answerable still builds; see [`CategoryOutline::gap`].
    pub fn build<S: CatalogStore + ?Sized>(
        store: &S,
        category_id: CategoryId,
    ) -> Result<Self, ArquimetroError> {
        let category = store
            .get_category(category_id)?
            .ok_or(ArquimetroError::NotFound(EntityRef::Category(category_id)))?;

        let subcategories = store.list_subcategories(category_id)?;
        let mut answerable = Vec::new();
        let mut unanswerable = Vec::new();

        for subcategory in &subcategories {
            for question in store.list_questions(subcategory.id)? {
                let options = store.list_response_options(question.id)?;
                if options.is_empty() {
                    unanswerable.push(question);
                } else {
                    answerable.push(OutlineQuestion {
                        question,
                        subcategory_title: subcategory.title.clone(),
                        options,
                    });
                }
            }
        }

        Ok(Self {
            category,
            subcategory_count: subcategories.len(),
            answerable,
            unanswerable,
        })
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category.id
    }

    /// Answerable questions in navigation order.
    #[must_use]
    pub fn answerable(&self) -> &[OutlineQuestion] {
        &self.answerable
    }

    /// Questions that have no response options yet.
    #[must_use]
    pub fn unanswerable(&self) -> &[Question] {
        &self.unanswerable
    }

    #[must_use]
    pub fn answerable_count(&self) -> usize {
        self.answerable.len()
    }

    /// Why the category has nothing to answer, if that is the case.
    #[must_use]
    pub fn gap(&self) -> Option<ConfigurationGap> {
        if !self.answerable.is_empty() {
            None
        } else if self.subcategory_count == 0 {
            Some(ConfigurationGap::NoSubcategories)
        } else if self.unanswerable.is_empty() {
            Some(ConfigurationGap::NoQuestions)
        } else {
            Some(ConfigurationGap::NoResponseOptions)
        }
    }

    /// Navigation index of an answerable question.
    #[must_use]
    pub fn position_of(&self, question: QuestionId) -> Option<usize> {
        self.answerable.iter().position(|q| q.id() == question)
    }

    /// Answerable question by id.
    #[must_use]
    pub fn find(&self, question: QuestionId) -> Option<&OutlineQuestion> {
        self.answerable.iter().find(|q| q.id() == question)
    }

    /// Whether the question belongs to this category, answerable or not.
    #[must_use]
    pub fn contains(&self, question: QuestionId) -> bool {
        self.find(question).is_some() || self.unanswerable.iter().any(|q| q.id == question)
    }
}

// =============================================================================
// TESTS
// =============================================================================
