//! # Session Module
//!
//! The single owner of one evaluation scope's assessment state.
//!
//! An `AssessmentSession` holds:
//! - A catalog snapshot (categories are immutable while an evaluation runs)
//! - The responses recorded for the scope, across all categories
//! - At most one active `Evaluation`, created on "start assessment" and
//!   cleared on "back to overview"
//!
//! Responses are applied here first and persisted by the caller. Answers
//! that have not been confirmed by the persistence layer stay in the session
//! and are listed by [`AssessmentSession::unsynced`] so a failed write can be
//! retried without losing state.

use crate::catalog::Catalog;
use crate::evaluation::{Evaluation, Navigation};
use crate::outline::CategoryOutline;
use crate::progress::{CategoryProgress, OverallProgress, ProgressTracker};
use crate::report::AssessmentReport;
use crate::score::{CategoryAssessment, ScoreAggregator};
use crate::types::{
    ArquimetroError, CategoryId, EntityRef, EvaluationScope, QuestionId, ResponseOptionId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of recording one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub category_id: CategoryId,
    pub question_id: QuestionId,
    pub response_option_id: ResponseOptionId,
    /// The option selected before, if any.
    pub previous: Option<ResponseOptionId>,
}

/// Assessment state for one evaluation scope.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    scope: EvaluationScope,
    catalog: Catalog,
    responses: BTreeMap<QuestionId, ResponseOptionId>,
    unsynced: BTreeSet<QuestionId>,
    active: Option<Evaluation>,
}

impl AssessmentSession {
    /// Create a session from a catalog and the scope's recorded responses.
    ///
    /// Responses pointing at removed questions or options, or at an option of
    /// another question, are dropped.
    #[must_use]
    pub fn load(
        scope: EvaluationScope,
        catalog: Catalog,
        recorded: BTreeMap<QuestionId, ResponseOptionId>,
    ) -> Self {
        let mut session = Self {
            scope,
            catalog,
            responses: recorded,
            unsynced: BTreeSet::new(),
            active: None,
        };
        session.prune_stale();
        session
    }

    /// A session with no recorded responses.
    #[must_use]
    pub fn new(scope: EvaluationScope, catalog: Catalog) -> Self {
        Self::load(scope, catalog, BTreeMap::new())
    }

    #[must_use]
    pub fn scope(&self) -> &EvaluationScope {
        &self.scope
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Recorded responses across all categories.
    #[must_use]
    pub fn responses(&self) -> &BTreeMap<QuestionId, ResponseOptionId> {
        &self.responses
    }

    #[must_use]
    pub fn active(&self) -> Option<&Evaluation> {
        self.active.as_ref()
    }

    /// Swap in a newer catalog and prune responses it no longer supports.
    ///
    /// The active evaluation keeps the outline it was started with.
    /// Returns the number of pruned responses.
    pub fn refresh_catalog(&mut self, catalog: Catalog) -> usize {
        self.catalog = catalog;
        self.prune_stale()
    }

    fn prune_stale(&mut self) -> usize {
        let before = self.responses.len();
        let catalog = &self.catalog;
        self.responses.retain(|question, option| {
            catalog
                .response_option(*option)
                .is_some_and(|o| o.question_id == *question)
        });
        let responses = &self.responses;
        self.unsynced.retain(|q| responses.contains_key(q));
        before - self.responses.len()
    }

    // =========================================================================
    // EVALUATION FLOW
    // =========================================================================

    /// Begin (or resume) the assessment of one category.
    ///
    /// Replaces any active evaluation. Fails with `NotFound` for an unknown
    /// category and `EmptyCatalog` when nothing is answerable.
    pub fn start_assessment(
        &mut self,
        category: CategoryId,
    ) -> Result<&Evaluation, ArquimetroError> {
        let outline = CategoryOutline::build(&self.catalog, category)?;
        let evaluation = Evaluation::resume(outline, &self.responses)?;
        Ok(self.active.insert(evaluation))
    }

    /// Record a selection in the active evaluation.
    pub fn select_response(
        &mut self,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<Selection, ArquimetroError> {
        let evaluation = self
            .active
            .as_mut()
            .ok_or(ArquimetroError::NoActiveEvaluation)?;

        let known_option = evaluation
            .outline()
            .find(question)
            .is_some_and(|q| q.option(option).is_some())
            || self.catalog.response_option(option).is_some();
        if !known_option && evaluation.outline().contains(question) {
            return Err(ArquimetroError::NotFound(EntityRef::ResponseOption(option)));
        }

        let previous = evaluation.select_response(question, option)?;
        let category_id = evaluation.category_id();
        self.responses.insert(question, option);
        self.unsynced.insert(question);

        Ok(Selection {
            category_id,
            question_id: question,
            response_option_id: option,
            previous,
        })
    }

    pub fn next_question(&mut self) -> Result<Navigation, ArquimetroError> {
        self.active
            .as_mut()
            .map(Evaluation::next_question)
            .ok_or(ArquimetroError::NoActiveEvaluation)
    }

    pub fn previous_question(&mut self) -> Result<Navigation, ArquimetroError> {
        self.active
            .as_mut()
            .map(Evaluation::previous_question)
            .ok_or(ArquimetroError::NoActiveEvaluation)
    }

    /// Leave the active evaluation. Recorded responses are kept.
    pub fn back_to_overview(&mut self) -> Option<Evaluation> {
        self.active.take()
    }

    // =========================================================================
    // PERSISTENCE BOOKKEEPING
    // =========================================================================

    /// Selections not yet confirmed by the persistence layer.
    #[must_use]
    pub fn unsynced(&self) -> Vec<(QuestionId, ResponseOptionId)> {
        self.unsynced
            .iter()
            .filter_map(|q| self.responses.get(q).map(|o| (*q, *o)))
            .collect()
    }

    /// Mark a selection as persisted.
    ///
    /// Ignored when the question has since been answered differently.
    pub fn mark_synced(&mut self, question: QuestionId, option: ResponseOptionId) {
        if self.responses.get(&question) == Some(&option) {
            self.unsynced.remove(&question);
        }
    }

    // =========================================================================
    // DERIVED FIGURES
    // =========================================================================

    pub fn category_assessment(
        &self,
        category: CategoryId,
    ) -> Result<CategoryAssessment, ArquimetroError> {
        let outline = self.outline_for(category)?;
        Ok(ScoreAggregator::assess(&outline, &self.responses))
    }

    pub fn category_progress(
        &self,
        category: CategoryId,
    ) -> Result<CategoryProgress, ArquimetroError> {
        let outline = self.outline_for(category)?;
        Ok(ProgressTracker::category_progress(&outline, &self.responses))
    }

    pub fn overall_progress(&self) -> Result<OverallProgress, ArquimetroError> {
        ProgressTracker::overall_progress(&self.catalog, &self.responses)
    }

    pub fn report(&self) -> Result<AssessmentReport, ArquimetroError> {
        AssessmentReport::build(&self.scope, &self.catalog, &self.responses)
    }

    /// The active evaluation's outline for its own category, so figures
    /// match what the user is answering; the catalog snapshot otherwise.
    fn outline_for(&self, category: CategoryId) -> Result<CategoryOutline, ArquimetroError> {
        match &self.active {
            Some(evaluation) if evaluation.category_id() == category => {
                Ok(evaluation.outline().clone())
            }
            _ => CategoryOutline::build(&self.catalog, category),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
