//! # Response Collector
//!
//! One in-progress evaluation of a single category.
//!
//! - At most one selected option per answerable question
//! - Re-selecting a question overwrites the earlier choice
//! - Navigation is bounded to `[0, answerable_count - 1]`
//! - A blocked move leaves every field untouched

use crate::outline::{CategoryOutline, OutlineQuestion};
use crate::types::{
    ArquimetroError, CategoryId, EntityKind, EntityRef, QuestionId, ResponseOptionId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a navigation request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationBlock {
    /// The current question has no selected response.
    NoSelection,
    /// Already on the first question.
    AtFirstQuestion,
}

/// Result of a `next_question` / `previous_question` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "navigation", rename_all = "snake_case")]
pub enum Navigation {
    /// The cursor moved to `index`.
    Moved { index: usize },
    /// Nothing changed.
    Blocked { reason: NavigationBlock },
    /// The last question was passed with every question answered.
    Finished,
}

/// In-progress evaluation over one category outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    outline: CategoryOutline,
    responses: BTreeMap<QuestionId, ResponseOptionId>,
    current_index: usize,
    finished: bool,
}

impl Evaluation {
    /// Start a fresh evaluation on the first question.
    ///
    /// Fails with `EmptyCatalog` when the category has nothing answerable.
    pub fn start(outline: CategoryOutline) -> Result<Self, ArquimetroError> {
        Self::resume(outline, &BTreeMap::new())
    }

    /// Start an evaluation seeded with previously recorded responses.
    ///
    /// Responses for questions outside this outline, or whose option does not
    /// belong to the question, are ignored. The cursor lands on the first
    /// unanswered question, or on the last one when all are answered.
    pub fn resume(
        outline: CategoryOutline,
        recorded: &BTreeMap<QuestionId, ResponseOptionId>,
    ) -> Result<Self, ArquimetroError> {
        if let Some(gap) = outline.gap() {
            return Err(ArquimetroError::EmptyCatalog(gap));
        }

        let responses: BTreeMap<QuestionId, ResponseOptionId> = outline
            .answerable()
            .iter()
            .filter_map(|q| {
                let option = recorded.get(&q.id())?;
                q.option(*option).map(|o| (q.id(), o.id))
            })
            .collect();

        let mut evaluation = Self {
            outline,
            responses,
            current_index: 0,
            finished: false,
        };
        evaluation.current_index = evaluation
            .first_unanswered()
            .unwrap_or_else(|| evaluation.last_index());
        Ok(evaluation)
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.outline.category_id()
    }

    #[must_use]
    pub fn outline(&self) -> &CategoryOutline {
        &self.outline
    }

    /// Selected options keyed by question.
    #[must_use]
    pub fn responses(&self) -> &BTreeMap<QuestionId, ResponseOptionId> {
        &self.responses
    }

    #[must_use]
    pub fn selected(&self, question: QuestionId) -> Option<ResponseOptionId> {
        self.responses.get(&question).copied()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question under the cursor.
    ///
    /// Returns `None` only if the outline is empty, which `start` rules out.
    #[must_use]
    pub fn current_question(&self) -> Option<&OutlineQuestion> {
        self.outline.answerable().get(self.current_index)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.outline.answerable_count()
    }

    /// Every answerable question has a recorded response.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_questions() > 0 && self.answered_count() == self.total_questions()
    }

    /// The user advanced past the last question of a complete evaluation.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record a selection, overwriting any earlier one for the question.
    ///
    /// Returns the previously selected option, if any. The cursor does not
    /// move.
    pub fn select_response(
        &mut self,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<Option<ResponseOptionId>, ArquimetroError> {
        let Some(entry) = self.outline.find(question) else {
            if self.outline.contains(question) {
                return Err(ArquimetroError::validation(
                    EntityKind::Question,
                    "response_options",
                    format!("question {} has no response options", question),
                ));
            }
            return Err(ArquimetroError::NotFound(EntityRef::Question(question)));
        };

        if entry.option(option).is_none() {
            return Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "question_id",
                format!(
                    "response option {} does not belong to question {}",
                    option, question
                ),
            ));
        }

        Ok(self.responses.insert(question, option))
    }

    /// Advance the cursor.
    ///
    /// Blocked while the current question has no selection. On the last
    /// question, finishes if everything is answered, otherwise jumps back to
    /// the first unanswered question.
    pub fn next_question(&mut self) -> Navigation {
        let Some(current) = self.current_question() else {
            return Navigation::Blocked {
                reason: NavigationBlock::NoSelection,
            };
        };
        if !self.responses.contains_key(&current.id()) {
            return Navigation::Blocked {
                reason: NavigationBlock::NoSelection,
            };
        }

        if self.current_index < self.last_index() {
            self.current_index += 1;
            return Navigation::Moved {
                index: self.current_index,
            };
        }

        match self.first_unanswered() {
            Some(index) => {
                self.current_index = index;
                Navigation::Moved { index }
            }
            None => {
                self.finished = true;
                Navigation::Finished
            }
        }
    }

    /// Move the cursor back one question. Reopens a finished evaluation.
    pub fn previous_question(&mut self) -> Navigation {
        if self.current_index == 0 {
            return Navigation::Blocked {
                reason: NavigationBlock::AtFirstQuestion,
            };
        }
        self.current_index -= 1;
        self.finished = false;
        Navigation::Moved {
            index: self.current_index,
        }
    }

    fn last_index(&self) -> usize {
        self.outline.answerable_count().saturating_sub(1)
    }

    fn first_unanswered(&self) -> Option<usize> {
        self.outline
            .answerable()
            .iter()
            .position(|q| !self.responses.contains_key(&q.id()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
