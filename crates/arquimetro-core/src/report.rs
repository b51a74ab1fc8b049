//! # Assessment Report
//!
//! The data handed to the export boundary: every category's assessment and
//! progress plus the feedback of each selected option.

use crate::catalog::Catalog;
use crate::outline::CategoryOutline;
use crate::progress::{CategoryProgress, OverallProgress, ProgressTracker};
use crate::score::{CategoryAssessment, ScoreAggregator};
use crate::types::{
    ArquimetroError, CategoryId, DeficiencySet, EvaluationScope, Level, QuestionId,
    ResponseOptionId, Weight,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One answered question with the feedback of the chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub subcategory: String,
    pub question: String,
    pub response_option_id: ResponseOptionId,
    pub level: Level,
    pub label: String,
    pub weight: Weight,
    pub feedback: String,
    pub explanation: String,
    pub deficiency_types: DeficiencySet,
}

/// Report section for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category_id: CategoryId,
    pub title: String,
    pub assessment: CategoryAssessment,
    pub progress: CategoryProgress,
    pub answers: Vec<AnswerFeedback>,
}

/// Full report for one evaluation scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub scope: EvaluationScope,
    pub categories: Vec<CategoryReport>,
    pub overall: OverallProgress,
}

impl AssessmentReport {
    /// Build the report from a catalog and the scope's responses.
    pub fn build(
        scope: &EvaluationScope,
        catalog: &Catalog,
        responses: &BTreeMap<QuestionId, ResponseOptionId>,
    ) -> Result<Self, ArquimetroError> {
        let mut categories = Vec::new();

        for category in catalog.categories_ordered() {
            let outline = CategoryOutline::build(catalog, category.id)?;
            let answers = outline
                .answerable()
                .iter()
                .filter_map(|q| {
                    let option = q.option(*responses.get(&q.id())?)?;
                    Some(AnswerFeedback {
                        question_id: q.id(),
                        subcategory: q.subcategory_title.clone(),
                        question: q.question.text.clone(),
                        response_option_id: option.id,
                        level: option.level,
                        label: option.label.clone(),
                        weight: option.weight,
                        feedback: option.feedback.clone(),
                        explanation: option.explanation.clone(),
                        deficiency_types: option.deficiency_types.clone(),
                    })
                })
                .collect();

            categories.push(CategoryReport {
                category_id: category.id,
                title: category.title.clone(),
                assessment: ScoreAggregator::assess(&outline, responses),
                progress: ProgressTracker::category_progress(&outline, responses),
                answers,
            });
        }

        let overall = ProgressTracker::summarize(categories.iter().map(|c| c.progress).collect());
        Ok(Self {
            scope: scope.clone(),
            categories,
            overall,
        })
    }

    /// Plain-text rendering for terminals and text files.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Avaliação de maturidade: {}", self.scope);
        let _ = writeln!(
            out,
            "Progresso geral: {}% ({}/{} categorias concluídas)",
            self.overall.percent, self.overall.complete_categories, self.overall.total_categories
        );

        for category in &self.categories {
            let _ = writeln!(out);
            let _ = writeln!(out, "## {}", category.title);
            match &category.assessment {
                CategoryAssessment::InConfiguration { gap } => {
                    let _ = writeln!(out, "Em configuração ({})", gap);
                }
                CategoryAssessment::Pending { total_questions } => {
                    let _ = writeln!(out, "Não iniciada (0/{} questões)", total_questions);
                }
                CategoryAssessment::Scored { score } => {
                    let _ = writeln!(
                        out,
                        "Média {} - {} ({}/{} questões, {}%)",
                        score.average_score,
                        score.maturity_level,
                        score.answered_questions,
                        score.total_questions,
                        category.progress.percent
                    );
                    let _ = writeln!(
                        out,
                        "Deficiências: técnica {}, comportamental {}, ferramental {}",
                        score.deficiencies.tecnica,
                        score.deficiencies.comportamental,
                        score.deficiencies.ferramental
                    );
                }
            }
            for answer in &category.answers {
                let _ = writeln!(
                    out,
                    "- [{}] {} => {} (nível {})",
                    answer.subcategory,
                    answer.question,
                    answer.label,
                    answer.level.value()
                );
                let _ = writeln!(out, "  {}", answer.feedback);
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::types::{
        CategoryDraft, DeficiencyType, QuestionDraft, ResponseOptionDraft, SubcategoryDraft,
    };

    #[test]
    fn report_lists_feedback_of_selected_options() {
        let mut catalog = Catalog::with_default_categories();
        let estrategia = catalog.categories_ordered()[0].id;
        let s = catalog
            .create_subcategory(SubcategoryDraft {
                title: "Política".to_string(),
                category_id: estrategia,
                sort_order: 0,
            })
            .expect("subcategory");
        let q = catalog
            .create_question(QuestionDraft {
                text: "Existe política arquivística?".to_string(),
                subcategory_id: s.id,
                deficiency_types: Default::default(),
                sort_order: 0,
            })
            .expect("question");
        let o = catalog
            .create_response_option(ResponseOptionDraft {
                question_id: q.id,
                level: 2,
                label: "Em elaboração".to_string(),
                explanation: "Há minuta".to_string(),
                feedback: "Aprove a política".to_string(),
                weight: Weight::whole(2),
                deficiency_types: [DeficiencyType::Tecnica].into_iter().collect(),
            })
            .expect("option");
        catalog
            .create_category(CategoryDraft {
                title: "Extra".to_string(),
                sort_order: 9,
                ..CategoryDraft::default()
            })
            .expect("category");

        let scope = EvaluationScope::new("user-1").expect("scope");
        let responses = BTreeMap::from([(q.id, o.id)]);
        let report = AssessmentReport::build(&scope, &catalog, &responses).expect("report");

        assert_eq!(report.categories.len(), 6);
        let first = &report.categories[0];
        assert_eq!(first.answers.len(), 1);
        assert_eq!(first.answers[0].feedback, "Aprove a política");
        assert!(first.progress.is_complete);
        assert_eq!(report.overall.complete_categories, 1);
        assert!(report.categories[1].assessment.is_in_configuration());

        let text = report.render_text();
        assert!(text.contains("Aprove a política"));
        assert!(text.contains("Em desenvolvimento"));
    }
}
