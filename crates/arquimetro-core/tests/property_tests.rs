//! # Property-Based Tests
//!
//! Scoring and progress invariants checked with proptest.

use arquimetro_core::progress::percent;
use arquimetro_core::{
    Catalog, CatalogStore, CategoryAssessment, CategoryDraft, CategoryId, CategoryOutline,
    DeficiencyType, Evaluation, MaturityLevel, ProgressTracker, QuestionDraft, QuestionId,
    ResponseOptionDraft, ResponseOptionId, Score, ScoreAggregator, SubcategoryDraft, Weight,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Category with one question per entry of `option_counts`, each with that
/// many options (level 1..=n, weight = level, alternating tags).
fn build_catalog(option_counts: &[usize]) -> (Catalog, CategoryId, Vec<(QuestionId, Vec<ResponseOptionId>)>) {
    let mut catalog = Catalog::new();
    let category = catalog
        .create_category(CategoryDraft {
            title: "Propriedades".to_string(),
            ..CategoryDraft::default()
        })
        .expect("category")
        .id;
    let subcategory = catalog
        .create_subcategory(SubcategoryDraft {
            title: "Geral".to_string(),
            category_id: category,
            sort_order: 0,
        })
        .expect("subcategory")
        .id;

    let mut questions = Vec::new();
    for (n, count) in option_counts.iter().enumerate() {
        let question = catalog
            .create_question(QuestionDraft {
                text: format!("Questão {}", n),
                subcategory_id: subcategory,
                deficiency_types: Default::default(),
                sort_order: n as i32,
            })
            .expect("question")
            .id;
        let mut options = Vec::new();
        for level in 1..=*count as u8 {
            let tags: Vec<DeficiencyType> = DeficiencyType::ALL
                .iter()
                .copied()
                .take(usize::from(level) % 4)
                .collect();
            let option = catalog
                .create_response_option(ResponseOptionDraft {
                    question_id: question,
                    level,
                    label: format!("Nível {}", level),
                    explanation: String::new(),
                    feedback: format!("Retorno {}", level),
                    weight: Weight::whole(u32::from(level)),
                    deficiency_types: tags.into_iter().collect(),
                })
                .expect("option")
                .id;
            options.push(option);
        }
        questions.push((question, options));
    }
    (catalog, category, questions)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Maturity mapping is total and never decreases as the score grows.
    #[test]
    fn maturity_is_monotonic(a in 0u32..1000, b in 0u32..1000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_level = MaturityLevel::from_score(Score::from_tenths(low));
        let high_level = MaturityLevel::from_score(Score::from_tenths(high));
        prop_assert!(low_level.rank() <= high_level.rank());
        prop_assert!(MaturityLevel::ALL.contains(&high_level));
    }

    /// The average lies between the smallest and largest weight.
    #[test]
    fn average_is_bounded_by_weights(hundredths in vec(0u32..=500, 1..40)) {
        let weights: Vec<Weight> = hundredths.iter().map(|h| Weight::from_hundredths(*h)).collect();
        let score = Score::average(&weights).expect("non-empty");
        let min = hundredths.iter().copied().min().unwrap_or(0);
        let max = hundredths.iter().copied().max().unwrap_or(0);
        // Tenths are rounded half-up from hundredths.
        prop_assert!(score.tenths() * 10 + 5 >= min);
        prop_assert!(score.tenths() * 10 <= max + 5);
    }

    /// Percentages never leave 0..=100.
    #[test]
    fn percent_is_bounded(part in 0u64..10_000, whole in 0u64..10_000) {
        let value = percent(part, whole);
        prop_assert!(value <= 100);
        if whole == 0 {
            prop_assert_eq!(value, 0);
        }
    }

    /// Answered counts match the selections, the tally stays within three
    /// tags per answer, and answering everything completes the category.
    #[test]
    fn progress_and_tally_follow_selections(
        option_counts in vec(1usize..=5, 1..12),
        picks in vec(any::<prop::sample::Index>(), 12),
        answer_mask in vec(any::<bool>(), 12),
    ) {
        let (catalog, category, questions) = build_catalog(&option_counts);
        let outline = CategoryOutline::build(&catalog, category).expect("outline");

        let mut responses = BTreeMap::new();
        for (n, (question, options)) in questions.iter().enumerate() {
            if answer_mask[n] {
                responses.insert(*question, *picks[n].get(options));
            }
        }

        let progress = ProgressTracker::category_progress(&outline, &responses);
        prop_assert_eq!(progress.answered as usize, responses.len());
        prop_assert_eq!(progress.total as usize, questions.len());
        prop_assert_eq!(progress.is_complete, responses.len() == questions.len());

        match ScoreAggregator::assess(&outline, &responses) {
            CategoryAssessment::Scored { score } => {
                prop_assert_eq!(score.answered_questions, progress.answered);
                prop_assert!(score.deficiencies.total() <= score.answered_questions * 3);
                prop_assert!(score.average_score.tenths() <= 50);
            }
            CategoryAssessment::Pending { total_questions } => {
                prop_assert!(responses.is_empty());
                prop_assert_eq!(total_questions as usize, questions.len());
            }
            CategoryAssessment::InConfiguration { .. } => {
                prop_assert!(false, "every question has options");
            }
        }
    }

    /// Selecting again overwrites: only the last choice per question counts.
    #[test]
    fn last_selection_wins(first in 0usize..5, second in 0usize..5) {
        let (catalog, category, questions) = build_catalog(&[5]);
        let (question, options) = &questions[0];
        let outline = CategoryOutline::build(&catalog, category).expect("outline");

        let mut evaluation = Evaluation::start(outline.clone()).expect("start");
        prop_assert_eq!(evaluation.select_response(*question, options[first]).expect("first"), None);
        let previous = evaluation
            .select_response(*question, options[second])
            .expect("second");
        prop_assert_eq!(previous, Some(options[first]));
        prop_assert_eq!(evaluation.responses().len(), 1);
        let responses = evaluation.responses().clone();

        let score = ScoreAggregator::assess(&outline, &responses)
            .score()
            .copied()
            .expect("scored");
        prop_assert_eq!(score.answered_questions, 1);
        prop_assert_eq!(score.average_score.tenths(), (second as u32 + 1) * 10);
    }
}
