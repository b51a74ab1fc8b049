//! # Scoring Scenarios
//!
//! End-to-end checks of the assessment flow through `AssessmentSession`.
//!
//! ## Scenarios
//! - A: two answered questions average to a maturity level
//! - B: a question without options keeps the category in configuration
//! - C: partial answers produce partial progress
//! - D: deficiency tags are tallied per selected option
//! - E: navigation is blocked without a selection

use arquimetro_core::{
    ArquimetroError, AssessmentSession, Catalog, CatalogStore, CategoryAssessment, CategoryDraft,
    CategoryId, ConfigurationGap, DeficiencyType, EvaluationScope, MaturityLevel, Navigation,
    NavigationBlock, QuestionDraft, QuestionId, ResponseOptionDraft, ResponseOptionId,
    SubcategoryDraft, SubcategoryId, Weight,
};

// =============================================================================
// FIXTURES
// =============================================================================

struct Fixture {
    catalog: Catalog,
    category: CategoryId,
    subcategory: SubcategoryId,
}

impl Fixture {
    fn new() -> Self {
        let mut catalog = Catalog::new();
        let category = catalog
            .create_category(CategoryDraft {
                title: "Gestão de Documentos".to_string(),
                ..CategoryDraft::default()
            })
            .expect("category")
            .id;
        let subcategory = catalog
            .create_subcategory(SubcategoryDraft {
                title: "Classificação".to_string(),
                category_id: category,
                sort_order: 0,
            })
            .expect("subcategory")
            .id;
        Self {
            catalog,
            category,
            subcategory,
        }
    }

    fn question(&mut self, text: &str) -> QuestionId {
        self.catalog
            .create_question(QuestionDraft {
                text: text.to_string(),
                subcategory_id: self.subcategory,
                deficiency_types: Default::default(),
                sort_order: 0,
            })
            .expect("question")
            .id
    }

    fn option(
        &mut self,
        question: QuestionId,
        level: u8,
        weight: u32,
        tags: &[DeficiencyType],
    ) -> ResponseOptionId {
        self.catalog
            .create_response_option(ResponseOptionDraft {
                question_id: question,
                level,
                label: format!("Nível {}", level),
                explanation: String::new(),
                feedback: format!("Retorno do nível {}", level),
                weight: Weight::whole(weight),
                deficiency_types: tags.iter().copied().collect(),
            })
            .expect("option")
            .id
    }

    fn session(&self) -> AssessmentSession {
        let scope = EvaluationScope::new("inst-42").expect("scope");
        AssessmentSession::new(scope, self.catalog.clone())
    }
}

// =============================================================================
// SCENARIO A: AVERAGE AND LEVEL
// =============================================================================

#[test]
fn scenario_a_two_answers_average_to_consolidado() {
    let mut fx = Fixture::new();
    let q1 = fx.question("Existe plano de classificação?");
    let q2 = fx.question("Existe tabela de temporalidade?");
    let o1 = fx.option(q1, 5, 5, &[]);
    let o2 = fx.option(q2, 3, 3, &[]);

    let mut session = fx.session();
    session.start_assessment(fx.category).expect("start");
    session.select_response(q1, o1).expect("select q1");
    assert_eq!(
        session.next_question().expect("next"),
        Navigation::Moved { index: 1 }
    );
    session.select_response(q2, o2).expect("select q2");
    assert_eq!(session.next_question().expect("next"), Navigation::Finished);

    let assessment = session.category_assessment(fx.category).expect("assess");
    let score = assessment.score().expect("scored");
    assert_eq!(score.average_score.to_string(), "4.0");
    assert_eq!(score.maturity_level, MaturityLevel::Consolidado);
    assert!(score.is_complete());
}

// =============================================================================
// SCENARIO B: CATEGORY IN CONFIGURATION
// =============================================================================

#[test]
fn scenario_b_question_without_options_is_in_configuration() {
    let mut fx = Fixture::new();
    fx.question("Pergunta ainda sem opções");

    let mut session = fx.session();
    let assessment = session.category_assessment(fx.category).expect("assess");
    assert_eq!(
        assessment,
        CategoryAssessment::InConfiguration {
            gap: ConfigurationGap::NoResponseOptions
        }
    );

    assert!(matches!(
        session.start_assessment(fx.category),
        Err(ArquimetroError::EmptyCatalog(ConfigurationGap::NoResponseOptions))
    ));
    let progress = session.category_progress(fx.category).expect("progress");
    assert!(progress.in_configuration);
    assert!(!progress.is_complete);
}

// =============================================================================
// SCENARIO C: PARTIAL PROGRESS
// =============================================================================

#[test]
fn scenario_c_half_answered_is_fifty_percent() {
    let mut fx = Fixture::new();
    let mut answers = Vec::new();
    for n in 0..4 {
        let q = fx.question(&format!("Questão {}", n));
        answers.push((q, fx.option(q, 2, 2, &[])));
    }

    let mut session = fx.session();
    session.start_assessment(fx.category).expect("start");
    for (q, o) in answers.iter().take(2) {
        session.select_response(*q, *o).expect("select");
        session.next_question().expect("next");
    }

    let progress = session.category_progress(fx.category).expect("progress");
    assert_eq!(progress.answered, 2);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.percent, 50);
    assert!(!progress.is_complete);

    let score = session
        .category_assessment(fx.category)
        .expect("assess")
        .score()
        .copied()
        .expect("scored");
    assert_eq!(score.answered_questions, 2);
    assert_eq!(score.total_questions, 4);
    assert!(!score.is_complete());
}

// =============================================================================
// SCENARIO D: DEFICIENCY TALLY
// =============================================================================

#[test]
fn scenario_d_tags_of_selected_option_are_tallied() {
    let mut fx = Fixture::new();
    let q = fx.question("Há equipe capacitada?");
    let tagged = fx.option(
        q,
        1,
        1,
        &[DeficiencyType::Tecnica, DeficiencyType::Comportamental],
    );
    fx.option(q, 4, 4, &[DeficiencyType::Ferramental]);
    let other = fx.question("Há sistema informatizado?");
    fx.option(other, 4, 4, &[DeficiencyType::Ferramental]);

    let mut session = fx.session();
    session.start_assessment(fx.category).expect("start");
    session.select_response(q, tagged).expect("select");

    let score = session
        .category_assessment(fx.category)
        .expect("assess")
        .score()
        .copied()
        .expect("scored");
    assert_eq!(score.deficiencies.tecnica, 1);
    assert_eq!(score.deficiencies.comportamental, 1);
    assert_eq!(score.deficiencies.ferramental, 0);
}

// =============================================================================
// SCENARIO E: BLOCKED NAVIGATION
// =============================================================================

#[test]
fn scenario_e_next_without_selection_changes_nothing() {
    let mut fx = Fixture::new();
    let q1 = fx.question("Primeira");
    fx.option(q1, 3, 3, &[]);
    let q2 = fx.question("Segunda");
    fx.option(q2, 3, 3, &[]);

    let mut session = fx.session();
    session.start_assessment(fx.category).expect("start");
    let before = session.active().cloned().expect("active");

    assert_eq!(
        session.next_question().expect("next"),
        Navigation::Blocked {
            reason: NavigationBlock::NoSelection
        }
    );
    assert_eq!(session.active(), Some(&before));
    assert_eq!(session.active().map(|e| e.current_index()), Some(0));
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

#[test]
fn reselection_overwrites_and_back_to_overview_keeps_answers() {
    let mut fx = Fixture::new();
    let q = fx.question("Única");
    let low = fx.option(q, 1, 1, &[]);
    let high = fx.option(q, 5, 5, &[]);

    let mut session = fx.session();
    session.start_assessment(fx.category).expect("start");
    session.select_response(q, low).expect("low");
    let selection = session.select_response(q, high).expect("high");
    assert_eq!(selection.previous, Some(low));
    assert_eq!(session.unsynced(), vec![(q, high)]);

    assert!(session.back_to_overview().is_some());
    assert!(session.active().is_none());
    assert!(matches!(
        session.next_question(),
        Err(ArquimetroError::NoActiveEvaluation)
    ));

    let score = session
        .category_assessment(fx.category)
        .expect("assess")
        .score()
        .copied()
        .expect("scored");
    assert_eq!(score.maturity_level, MaturityLevel::Avancado);

    session.mark_synced(q, high);
    assert!(session.unsynced().is_empty());
}
