//! # Catalog Store
//!
//! The questionnaire catalog for Arquimetro CORE.
//!
//! This module implements the `CatalogStore` trait.
//! All data structures use `BTreeMap` for deterministic ordering.
//!
//! Deletion cascades: removing a category removes its subcategories, their
//! questions and their response options; removing a question removes its
//! options. Recorded responses pointing at removed records are pruned when
//! an assessment session loads.

use crate::primitives::MAX_OPTIONS_PER_QUESTION;
use crate::types::{
    ArquimetroError, Category, CategoryDraft, CategoryId, EntityKind, EntityRef, Question,
    QuestionDraft, QuestionId, ResponseOption, ResponseOptionDraft, ResponseOptionId,
    Subcategory, SubcategoryDraft, SubcategoryId,
};
use crate::validator::Validator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// MUTATIONS
// =============================================================================

/// One administrative change to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CatalogMutation {
    CreateCategory { draft: CategoryDraft },
    UpdateCategory { id: CategoryId, draft: CategoryDraft },
    DeleteCategory { id: CategoryId },
    CreateSubcategory { draft: SubcategoryDraft },
    UpdateSubcategory { id: SubcategoryId, draft: SubcategoryDraft },
    DeleteSubcategory { id: SubcategoryId },
    CreateQuestion { draft: QuestionDraft },
    UpdateQuestion { id: QuestionId, draft: QuestionDraft },
    DeleteQuestion { id: QuestionId },
    CreateResponseOption { draft: ResponseOptionDraft },
    UpdateResponseOption { id: ResponseOptionId, draft: ResponseOptionDraft },
    DeleteResponseOption { id: ResponseOptionId },
}

impl CatalogMutation {
    /// Run field validation for the draft carried by this mutation.
    pub fn validate(&self) -> Result<(), ArquimetroError> {
        match self {
            CatalogMutation::CreateCategory { draft }
            | CatalogMutation::UpdateCategory { draft, .. } => Validator::validate_category(draft),
            CatalogMutation::CreateSubcategory { draft }
            | CatalogMutation::UpdateSubcategory { draft, .. } => {
                Validator::validate_subcategory(draft)
            }
            CatalogMutation::CreateQuestion { draft }
            | CatalogMutation::UpdateQuestion { draft, .. } => Validator::validate_question(draft),
            CatalogMutation::CreateResponseOption { draft }
            | CatalogMutation::UpdateResponseOption { draft, .. } => {
                Validator::validate_response_option(draft)
            }
            CatalogMutation::DeleteCategory { .. }
            | CatalogMutation::DeleteSubcategory { .. }
            | CatalogMutation::DeleteQuestion { .. }
            | CatalogMutation::DeleteResponseOption { .. } => Ok(()),
        }
    }
}

/// A stored catalog record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum CatalogRecord {
    Category(Category),
    Subcategory(Subcategory),
    Question(Question),
    ResponseOption(ResponseOption),
}

impl CatalogRecord {
    /// Reference to this record.
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            CatalogRecord::Category(c) => EntityRef::Category(c.id),
            CatalogRecord::Subcategory(s) => EntityRef::Subcategory(s.id),
            CatalogRecord::Question(q) => EntityRef::Question(q.id),
            CatalogRecord::ResponseOption(o) => EntityRef::ResponseOption(o.id),
        }
    }
}

/// Records removed by one delete, the target first and then its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    pub removed: Vec<EntityRef>,
}

/// Result of applying a `CatalogMutation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// A record was created or updated.
    Saved { record: CatalogRecord },
    /// A record and its descendants were removed.
    Deleted { summary: DeletionSummary },
}

/// Flat record lists, the shape exchanged with backends and imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogParts {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub response_options: Vec<ResponseOption>,
}

impl CatalogParts {
    /// Total number of records across all kinds.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.categories.len()
            + self.subcategories.len()
            + self.questions.len()
            + self.response_options.len()
    }
}

/// Record counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub categories: usize,
    pub subcategories: usize,
    pub questions: usize,
    pub response_options: usize,
}

// =============================================================================
// CATALOGSTORE TRAIT
// =============================================================================

/// The CatalogStore trait defines the catalog operations.
///
/// All fallible operations return `Result<T, ArquimetroError>` to support both
/// in-memory and persistent storage backends uniformly. Writes go through
/// `apply_mutation`; the typed create/update/delete helpers are built on it.
pub trait CatalogStore {
    /// All categories ordered by `(sort_order, id)`.
    fn list_categories(&self) -> Result<Vec<Category>, ArquimetroError>;

    /// Subcategories of one category ordered by `(sort_order, id)`.
    fn list_subcategories(&self, category: CategoryId)
    -> Result<Vec<Subcategory>, ArquimetroError>;

    /// Questions of one subcategory ordered by `(sort_order, id)`.
    fn list_questions(&self, subcategory: SubcategoryId) -> Result<Vec<Question>, ArquimetroError>;

    /// Response options of one question ordered by `(level, id)`.
    fn list_response_options(
        &self,
        question: QuestionId,
    ) -> Result<Vec<ResponseOption>, ArquimetroError>;

    fn get_category(&self, id: CategoryId) -> Result<Option<Category>, ArquimetroError>;

    fn get_subcategory(&self, id: SubcategoryId) -> Result<Option<Subcategory>, ArquimetroError>;

    fn get_question(&self, id: QuestionId) -> Result<Option<Question>, ArquimetroError>;

    fn get_response_option(
        &self,
        id: ResponseOptionId,
    ) -> Result<Option<ResponseOption>, ArquimetroError>;

    /// Validate and apply one mutation.
    ///
    /// Validation runs before anything is changed; a failed mutation leaves
    /// the store untouched.
    fn apply_mutation(
        &mut self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError>;

    /// An owned in-memory copy of the whole catalog.
    fn snapshot(&self) -> Result<Catalog, ArquimetroError>;

    fn create_category(&mut self, draft: CategoryDraft) -> Result<Category, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::CreateCategory { draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Category(c),
            } => Ok(c),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn update_category(
        &mut self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Category, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::UpdateCategory { id, draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Category(c),
            } => Ok(c),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<DeletionSummary, ArquimetroError> {
        deleted(self.apply_mutation(CatalogMutation::DeleteCategory { id })?)
    }

    fn create_subcategory(
        &mut self,
        draft: SubcategoryDraft,
    ) -> Result<Subcategory, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::CreateSubcategory { draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Subcategory(s),
            } => Ok(s),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn update_subcategory(
        &mut self,
        id: SubcategoryId,
        draft: SubcategoryDraft,
    ) -> Result<Subcategory, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::UpdateSubcategory { id, draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Subcategory(s),
            } => Ok(s),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn delete_subcategory(
        &mut self,
        id: SubcategoryId,
    ) -> Result<DeletionSummary, ArquimetroError> {
        deleted(self.apply_mutation(CatalogMutation::DeleteSubcategory { id })?)
    }

    fn create_question(&mut self, draft: QuestionDraft) -> Result<Question, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::CreateQuestion { draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Question(q),
            } => Ok(q),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn update_question(
        &mut self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<Question, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::UpdateQuestion { id, draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::Question(q),
            } => Ok(q),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn delete_question(&mut self, id: QuestionId) -> Result<DeletionSummary, ArquimetroError> {
        deleted(self.apply_mutation(CatalogMutation::DeleteQuestion { id })?)
    }

    fn create_response_option(
        &mut self,
        draft: ResponseOptionDraft,
    ) -> Result<ResponseOption, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::CreateResponseOption { draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::ResponseOption(o),
            } => Ok(o),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn update_response_option(
        &mut self,
        id: ResponseOptionId,
        draft: ResponseOptionDraft,
    ) -> Result<ResponseOption, ArquimetroError> {
        match self.apply_mutation(CatalogMutation::UpdateResponseOption { id, draft })? {
            MutationOutcome::Saved {
                record: CatalogRecord::ResponseOption(o),
            } => Ok(o),
            other => Err(unexpected_outcome(&other)),
        }
    }

    fn delete_response_option(
        &mut self,
        id: ResponseOptionId,
    ) -> Result<DeletionSummary, ArquimetroError> {
        deleted(self.apply_mutation(CatalogMutation::DeleteResponseOption { id })?)
    }
}

fn deleted(outcome: MutationOutcome) -> Result<DeletionSummary, ArquimetroError> {
    match outcome {
        MutationOutcome::Deleted { summary } => Ok(summary),
        other => Err(unexpected_outcome(&other)),
    }
}

fn unexpected_outcome(outcome: &MutationOutcome) -> ArquimetroError {
    ArquimetroError::DeserializationError(format!(
        "store returned an outcome of the wrong kind: {:?}",
        outcome
    ))
}

// =============================================================================
// CATALOG IMPLEMENTATION
// =============================================================================

/// The in-memory catalog.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
/// Ids are allocated from a single monotonic counter shared by all kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    questions: BTreeMap<QuestionId, Question>,
    options: BTreeMap<ResponseOptionId, ResponseOption>,
    /// Next id to hand out
    next_id: u64,
}

/// The fixed default categories: title, description, icon, color.
const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 5] = [
    (
        "Estratégia",
        "Planejamento, políticas e governança da gestão de documentos.",
        "target",
        "#1f6feb",
    ),
    (
        "Ciclo de Vida",
        "Produção, classificação, avaliação, temporalidade e destinação.",
        "refresh-cw",
        "#2da44e",
    ),
    (
        "Comunicação",
        "Difusão, acesso e transparência dos acervos.",
        "message-circle",
        "#bf8700",
    ),
    (
        "Operação",
        "Rotinas, infraestrutura, sistemas e preservação.",
        "settings",
        "#cf222e",
    ),
    (
        "Pessoal",
        "Equipe, capacitação e responsabilidades.",
        "users",
        "#8250df",
    ),
];

impl Catalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with the five fixed default categories.
    #[must_use]
    pub fn with_default_categories() -> Self {
        let mut catalog = Self::new();
        for (order, (title, description, icon, color)) in DEFAULT_CATEGORIES.iter().enumerate() {
            let id = CategoryId(catalog.allocate_id());
            catalog.categories.insert(
                id,
                Category {
                    id,
                    title: (*title).to_string(),
                    description: (*description).to_string(),
                    icon: (*icon).to_string(),
                    color: (*color).to_string(),
                    sort_order: order as i32 + 1,
                },
            );
        }
        catalog
    }

    /// Build a catalog from records that already carry ids.
    ///
    /// Every record is re-validated and every parent reference must resolve.
    /// The id counter continues after the highest id seen.
    pub fn from_parts(parts: CatalogParts) -> Result<Self, ArquimetroError> {
        let mut catalog = Self::new();
        let mut seen = BTreeSet::new();
        let mut max_id = 0u64;

        let mut check_id = |entity: EntityKind, raw: u64| -> Result<(), ArquimetroError> {
            if !seen.insert((entity, raw)) {
                return Err(ArquimetroError::validation(
                    entity,
                    "id",
                    format!("duplicate id {}", raw),
                ));
            }
            max_id = max_id.max(raw);
            Ok(())
        };

        for c in parts.categories {
            check_id(EntityKind::Category, c.id.0)?;
            Validator::validate_category(&c.to_draft())?;
            catalog.categories.insert(c.id, c);
        }
        for s in parts.subcategories {
            check_id(EntityKind::Subcategory, s.id.0)?;
            Validator::validate_subcategory(&s.to_draft())?;
            if !catalog.categories.contains_key(&s.category_id) {
                return Err(missing_parent(
                    EntityKind::Subcategory,
                    "category_id",
                    EntityRef::Category(s.category_id),
                ));
            }
            catalog.subcategories.insert(s.id, s);
        }
        for q in parts.questions {
            check_id(EntityKind::Question, q.id.0)?;
            Validator::validate_question(&q.to_draft())?;
            if !catalog.subcategories.contains_key(&q.subcategory_id) {
                return Err(missing_parent(
                    EntityKind::Question,
                    "subcategory_id",
                    EntityRef::Subcategory(q.subcategory_id),
                ));
            }
            catalog.questions.insert(q.id, q);
        }
        for o in parts.response_options {
            check_id(EntityKind::ResponseOption, o.id.0)?;
            Validator::validate_response_option(&o.to_draft())?;
            if !catalog.questions.contains_key(&o.question_id) {
                return Err(missing_parent(
                    EntityKind::ResponseOption,
                    "question_id",
                    EntityRef::Question(o.question_id),
                ));
            }
            catalog.check_option_capacity(o.question_id, None)?;
            catalog.options.insert(o.id, o);
        }

        catalog.next_id = max_id.saturating_add(1);
        Ok(catalog)
    }

    /// All records as flat lists, each sorted by id.
    #[must_use]
    pub fn to_parts(&self) -> CatalogParts {
        CatalogParts {
            categories: self.categories.values().cloned().collect(),
            subcategories: self.subcategories.values().cloned().collect(),
            questions: self.questions.values().cloned().collect(),
            response_options: self.options.values().cloned().collect(),
        }
    }

    /// Record counts per kind.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            categories: self.categories.len(),
            subcategories: self.subcategories.len(),
            questions: self.questions.len(),
            response_options: self.options.len(),
        }
    }

    /// Whether the catalog holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The id the next created record would receive.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id.max(1)
    }

    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    /// Category by id (internal, non-Result version).
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Question by id (internal, non-Result version).
    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(&id)
    }

    /// Response option by id (internal, non-Result version).
    #[must_use]
    pub fn response_option(&self, id: ResponseOptionId) -> Option<&ResponseOption> {
        self.options.get(&id)
    }

    /// Subcategory by id (internal, non-Result version).
    #[must_use]
    pub fn subcategory(&self, id: SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.get(&id)
    }

    /// Ordered categories (internal, non-Result version).
    #[must_use]
    pub fn categories_ordered(&self) -> Vec<&Category> {
        let mut list: Vec<&Category> = self.categories.values().collect();
        list.sort_by_key(|c| (c.sort_order, c.id));
        list
    }

    /// Ordered subcategories of one category (internal, non-Result version).
    #[must_use]
    pub fn subcategories_ordered(&self, category: CategoryId) -> Vec<&Subcategory> {
        let mut list: Vec<&Subcategory> = self
            .subcategories
            .values()
            .filter(|s| s.category_id == category)
            .collect();
        list.sort_by_key(|s| (s.sort_order, s.id));
        list
    }

    /// Ordered questions of one subcategory (internal, non-Result version).
    #[must_use]
    pub fn questions_ordered(&self, subcategory: SubcategoryId) -> Vec<&Question> {
        let mut list: Vec<&Question> = self
            .questions
            .values()
            .filter(|q| q.subcategory_id == subcategory)
            .collect();
        list.sort_by_key(|q| (q.sort_order, q.id));
        list
    }

    /// Options of one question ordered by level (internal, non-Result version).
    #[must_use]
    pub fn options_ordered(&self, question: QuestionId) -> Vec<&ResponseOption> {
        let mut list: Vec<&ResponseOption> = self
            .options
            .values()
            .filter(|o| o.question_id == question)
            .collect();
        list.sort_by_key(|o| (o.level, o.id));
        list
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id.saturating_add(1);
        id
    }

    fn check_option_capacity(
        &self,
        question: QuestionId,
        moving: Option<ResponseOptionId>,
    ) -> Result<(), ArquimetroError> {
        let count = self
            .options
            .values()
            .filter(|o| o.question_id == question && Some(o.id) != moving)
            .count();
        if count >= MAX_OPTIONS_PER_QUESTION {
            return Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "question_id",
                format!(
                    "question {} already has {} response options",
                    question, MAX_OPTIONS_PER_QUESTION
                ),
            ));
        }
        Ok(())
    }

    fn require_category(&self, id: CategoryId) -> Result<(), ArquimetroError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(ArquimetroError::NotFound(EntityRef::Category(id)))
        }
    }

    fn require_subcategory(&self, id: SubcategoryId) -> Result<(), ArquimetroError> {
        if self.subcategories.contains_key(&id) {
            Ok(())
        } else {
            Err(ArquimetroError::NotFound(EntityRef::Subcategory(id)))
        }
    }

    fn require_question(&self, id: QuestionId) -> Result<(), ArquimetroError> {
        if self.questions.contains_key(&id) {
            Ok(())
        } else {
            Err(ArquimetroError::NotFound(EntityRef::Question(id)))
        }
    }

    fn remove_question_cascade(&mut self, id: QuestionId, removed: &mut Vec<EntityRef>) {
        if self.questions.remove(&id).is_none() {
            return;
        }
        removed.push(EntityRef::Question(id));
        let options: Vec<ResponseOptionId> = self
            .options
            .values()
            .filter(|o| o.question_id == id)
            .map(|o| o.id)
            .collect();
        for option in options {
            self.options.remove(&option);
            removed.push(EntityRef::ResponseOption(option));
        }
    }

    fn remove_subcategory_cascade(&mut self, id: SubcategoryId, removed: &mut Vec<EntityRef>) {
        if self.subcategories.remove(&id).is_none() {
            return;
        }
        removed.push(EntityRef::Subcategory(id));
        let questions: Vec<QuestionId> = self
            .questions
            .values()
            .filter(|q| q.subcategory_id == id)
            .map(|q| q.id)
            .collect();
        for question in questions {
            self.remove_question_cascade(question, removed);
        }
    }

    fn mutate(&mut self, mutation: CatalogMutation) -> Result<MutationOutcome, ArquimetroError> {
        let record = match mutation {
            CatalogMutation::CreateCategory { draft } => {
                let id = CategoryId(self.allocate_id());
                let category = Category::from_draft(id, draft);
                self.categories.insert(id, category.clone());
                CatalogRecord::Category(category)
            }
            CatalogMutation::UpdateCategory { id, draft } => {
                self.require_category(id)?;
                let category = Category::from_draft(id, draft);
                self.categories.insert(id, category.clone());
                CatalogRecord::Category(category)
            }
            CatalogMutation::DeleteCategory { id } => {
                self.require_category(id)?;
                self.categories.remove(&id);
                let mut removed = vec![EntityRef::Category(id)];
                let subcategories: Vec<SubcategoryId> = self
                    .subcategories
                    .values()
                    .filter(|s| s.category_id == id)
                    .map(|s| s.id)
                    .collect();
                for subcategory in subcategories {
                    self.remove_subcategory_cascade(subcategory, &mut removed);
                }
                return Ok(MutationOutcome::Deleted {
                    summary: DeletionSummary { removed },
                });
            }
            CatalogMutation::CreateSubcategory { draft } => {
                self.require_category(draft.category_id)?;
                let id = SubcategoryId(self.allocate_id());
                let subcategory = Subcategory::from_draft(id, draft);
                self.subcategories.insert(id, subcategory.clone());
                CatalogRecord::Subcategory(subcategory)
            }
            CatalogMutation::UpdateSubcategory { id, draft } => {
                self.require_subcategory(id)?;
                self.require_category(draft.category_id)?;
                let subcategory = Subcategory::from_draft(id, draft);
                self.subcategories.insert(id, subcategory.clone());
                CatalogRecord::Subcategory(subcategory)
            }
            CatalogMutation::DeleteSubcategory { id } => {
                self.require_subcategory(id)?;
                let mut removed = Vec::new();
                self.remove_subcategory_cascade(id, &mut removed);
                return Ok(MutationOutcome::Deleted {
                    summary: DeletionSummary { removed },
                });
            }
            CatalogMutation::CreateQuestion { draft } => {
                self.require_subcategory(draft.subcategory_id)?;
                let id = QuestionId(self.allocate_id());
                let question = Question::from_draft(id, draft);
                self.questions.insert(id, question.clone());
                CatalogRecord::Question(question)
            }
            CatalogMutation::UpdateQuestion { id, draft } => {
                self.require_question(id)?;
                self.require_subcategory(draft.subcategory_id)?;
                let question = Question::from_draft(id, draft);
                self.questions.insert(id, question.clone());
                CatalogRecord::Question(question)
            }
            CatalogMutation::DeleteQuestion { id } => {
                self.require_question(id)?;
                let mut removed = Vec::new();
                self.remove_question_cascade(id, &mut removed);
                return Ok(MutationOutcome::Deleted {
                    summary: DeletionSummary { removed },
                });
            }
            CatalogMutation::CreateResponseOption { draft } => {
                self.require_question(draft.question_id)?;
                self.check_option_capacity(draft.question_id, None)?;
                let id = ResponseOptionId(self.allocate_id());
                let option = ResponseOption::from_draft(id, draft)?;
                self.options.insert(id, option.clone());
                CatalogRecord::ResponseOption(option)
            }
            CatalogMutation::UpdateResponseOption { id, draft } => {
                if !self.options.contains_key(&id) {
                    return Err(ArquimetroError::NotFound(EntityRef::ResponseOption(id)));
                }
                self.require_question(draft.question_id)?;
                self.check_option_capacity(draft.question_id, Some(id))?;
                let option = ResponseOption::from_draft(id, draft)?;
                self.options.insert(id, option.clone());
                CatalogRecord::ResponseOption(option)
            }
            CatalogMutation::DeleteResponseOption { id } => {
                if self.options.remove(&id).is_none() {
                    return Err(ArquimetroError::NotFound(EntityRef::ResponseOption(id)));
                }
                return Ok(MutationOutcome::Deleted {
                    summary: DeletionSummary {
                        removed: vec![EntityRef::ResponseOption(id)],
                    },
                });
            }
        };
        Ok(MutationOutcome::Saved { record })
    }
}

fn missing_parent(entity: EntityKind, field: &'static str, parent: EntityRef) -> ArquimetroError {
    ArquimetroError::validation(entity, field, format!("references missing {}", parent))
}

impl CatalogStore for Catalog {
    fn list_categories(&self) -> Result<Vec<Category>, ArquimetroError> {
        Ok(self.categories_ordered().into_iter().cloned().collect())
    }

    fn list_subcategories(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Subcategory>, ArquimetroError> {
        Ok(self
            .subcategories_ordered(category)
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_questions(&self, subcategory: SubcategoryId) -> Result<Vec<Question>, ArquimetroError> {
        Ok(self
            .questions_ordered(subcategory)
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_response_options(
        &self,
        question: QuestionId,
    ) -> Result<Vec<ResponseOption>, ArquimetroError> {
        Ok(self.options_ordered(question).into_iter().cloned().collect())
    }

    fn get_category(&self, id: CategoryId) -> Result<Option<Category>, ArquimetroError> {
        Ok(self.categories.get(&id).cloned())
    }

    fn get_subcategory(&self, id: SubcategoryId) -> Result<Option<Subcategory>, ArquimetroError> {
        Ok(self.subcategories.get(&id).cloned())
    }

    fn get_question(&self, id: QuestionId) -> Result<Option<Question>, ArquimetroError> {
        Ok(self.questions.get(&id).cloned())
    }

    fn get_response_option(
        &self,
        id: ResponseOptionId,
    ) -> Result<Option<ResponseOption>, ArquimetroError> {
        Ok(self.options.get(&id).cloned())
    }

    fn apply_mutation(
        &mut self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError> {
        mutation.validate()?;
        self.mutate(mutation)
    }

    fn snapshot(&self) -> Result<Catalog, ArquimetroError> {
        Ok(self.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
