//! # redb-backed Store
//!
//! A disk-backed catalog and evaluation store using the redb embedded
//! database, providing:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Catalog records are postcard-encoded, one table per kind. Reads are served
//! from a write-through in-memory `Catalog`: every mutation is applied to a
//! copy, the changed records are committed in one transaction, and the copy
//! replaces the cache only after the commit succeeds.
//!
//! Responses and category results are stored per scope as one
//! postcard-encoded map each.

use crate::catalog::{Catalog, CatalogMutation, CatalogParts, CatalogStore, MutationOutcome};
use crate::score::CategoryScore;
use crate::storage::EvaluationStore;
use crate::types::{
    ArquimetroError, Category, CategoryId, EntityKind, EntityRef, EvaluationScope, Question,
    QuestionId, ResponseOption, ResponseOptionId, Subcategory, SubcategoryId,
};
use redb::backends::InMemoryBackend;
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

/// Table for categories: CategoryId(u64) -> serialized Category
const CATEGORIES: TableDefinition<u64, &[u8]> = TableDefinition::new("categories");

/// Table for subcategories: SubcategoryId(u64) -> serialized Subcategory
const SUBCATEGORIES: TableDefinition<u64, &[u8]> = TableDefinition::new("subcategories");

/// Table for questions: QuestionId(u64) -> serialized Question
const QUESTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("questions");

/// Table for response options: ResponseOptionId(u64) -> serialized ResponseOption
const RESPONSE_OPTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("response_options");

/// Table for responses: scope -> serialized BTreeMap<QuestionId, ResponseOptionId>
const RESPONSES: TableDefinition<&str, &[u8]> = TableDefinition::new("responses");

/// Table for category results: scope -> serialized BTreeMap<CategoryId, CategoryScore>
const RESULTS: TableDefinition<&str, &[u8]> = TableDefinition::new("category_results");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ID_KEY: &str = "next_id";

fn io_err(e: impl std::fmt::Display) -> ArquimetroError {
    ArquimetroError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ArquimetroError> {
    postcard::to_allocvec(value).map_err(|e| ArquimetroError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ArquimetroError> {
    postcard::from_bytes(bytes).map_err(|e| ArquimetroError::DeserializationError(e.to_string()))
}

fn record_table(entity: &EntityRef) -> TableDefinition<'static, u64, &'static [u8]> {
    match entity {
        EntityRef::Category(_) => CATEGORIES,
        EntityRef::Subcategory(_) => SUBCATEGORIES,
        EntityRef::Question(_) => QUESTIONS,
        EntityRef::ResponseOption(_) => RESPONSE_OPTIONS,
    }
}

fn load_records<T: DeserializeOwned>(
    txn: &ReadTransaction,
    definition: TableDefinition<'static, u64, &'static [u8]>,
) -> Result<Vec<T>, ArquimetroError> {
    let table = txn.open_table(definition).map_err(io_err)?;
    let mut records = Vec::new();
    for entry in table.iter().map_err(io_err)? {
        let (_, value) = entry.map_err(io_err)?;
        records.push(decode(value.value())?);
    }
    Ok(records)
}

/// A disk-backed catalog and evaluation store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Write-through copy of the catalog tables.
    cache: Catalog,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("catalog", &self.cache.stats())
            .field("next_id", &self.cache.next_id())
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArquimetroError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;
        Self::with_database(db)
    }

    /// Create a store that lives only in memory.
    pub fn in_memory() -> Result<Self, ArquimetroError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(io_err)?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> Result<Self, ArquimetroError> {
        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            for definition in [CATEGORIES, SUBCATEGORIES, QUESTIONS, RESPONSE_OPTIONS] {
                let _ = write_txn.open_table(definition).map_err(io_err)?;
            }
            let _ = write_txn.open_table(RESPONSES).map_err(io_err)?;
            let _ = write_txn.open_table(RESULTS).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let read_txn = db.begin_read().map_err(io_err)?;
        let parts = CatalogParts {
            categories: load_records::<Category>(&read_txn, CATEGORIES)?,
            subcategories: load_records::<Subcategory>(&read_txn, SUBCATEGORIES)?,
            questions: load_records::<Question>(&read_txn, QUESTIONS)?,
            response_options: load_records::<ResponseOption>(&read_txn, RESPONSE_OPTIONS)?,
        };
        let stored_next_id = {
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            table
                .get(NEXT_ID_KEY)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        let mut cache = Catalog::from_parts(parts)?;
        if stored_next_id > cache.next_id() {
            cache.set_next_id(stored_next_id);
        }

        Ok(Self { db, cache })
    }

    /// The cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.cache
    }

    /// Replace every catalog record in one transaction.
    ///
    /// Recorded responses are kept; sessions prune the ones that no longer
    /// resolve when they load.
    pub fn replace_catalog(&mut self, catalog: Catalog) -> Result<(), ArquimetroError> {
        let parts = catalog.to_parts();
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            for definition in [CATEGORIES, SUBCATEGORIES, QUESTIONS, RESPONSE_OPTIONS] {
                write_txn.delete_table(definition).map_err(io_err)?;
            }

            let mut table = write_txn.open_table(CATEGORIES).map_err(io_err)?;
            for c in &parts.categories {
                table.insert(c.id.0, encode(c)?.as_slice()).map_err(io_err)?;
            }
            drop(table);

            let mut table = write_txn.open_table(SUBCATEGORIES).map_err(io_err)?;
            for s in &parts.subcategories {
                table.insert(s.id.0, encode(s)?.as_slice()).map_err(io_err)?;
            }
            drop(table);

            let mut table = write_txn.open_table(QUESTIONS).map_err(io_err)?;
            for q in &parts.questions {
                table.insert(q.id.0, encode(q)?.as_slice()).map_err(io_err)?;
            }
            drop(table);

            let mut table = write_txn.open_table(RESPONSE_OPTIONS).map_err(io_err)?;
            for o in &parts.response_options {
                table.insert(o.id.0, encode(o)?.as_slice()).map_err(io_err)?;
            }
            drop(table);

            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_ID_KEY, catalog.next_id()).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.cache = catalog;
        Ok(())
    }

    /// Number of scopes with recorded responses.
    pub fn scope_count(&self) -> Result<usize, ArquimetroError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(RESPONSES).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }

    /// Commit the records touched by one mutation.
    fn persist(&self, outcome: &MutationOutcome, next_id: u64) -> Result<(), ArquimetroError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            match outcome {
                MutationOutcome::Saved { record } => {
                    let entity = record.entity_ref();
                    let bytes = match record {
                        crate::catalog::CatalogRecord::Category(c) => encode(c)?,
                        crate::catalog::CatalogRecord::Subcategory(s) => encode(s)?,
                        crate::catalog::CatalogRecord::Question(q) => encode(q)?,
                        crate::catalog::CatalogRecord::ResponseOption(o) => encode(o)?,
                    };
                    let mut table = write_txn.open_table(record_table(&entity)).map_err(io_err)?;
                    table
                        .insert(entity.raw_id(), bytes.as_slice())
                        .map_err(io_err)?;
                }
                MutationOutcome::Deleted { summary } => {
                    for entity in &summary.removed {
                        let mut table =
                            write_txn.open_table(record_table(entity)).map_err(io_err)?;
                        table.remove(entity.raw_id()).map_err(io_err)?;
                    }
                }
            }
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_ID_KEY, next_id).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)
    }

    fn read_scoped<T: DeserializeOwned + Default>(
        &self,
        definition: TableDefinition<'static, &'static str, &'static [u8]>,
        scope: &EvaluationScope,
    ) -> Result<T, ArquimetroError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(definition).map_err(io_err)?;
        let stored = table.get(scope.as_str()).map_err(io_err)?;
        match stored {
            Some(bytes) => decode(bytes.value()),
            None => Ok(T::default()),
        }
    }

    fn write_scoped<T: Serialize>(
        &self,
        definition: TableDefinition<'static, &'static str, &'static [u8]>,
        scope: &EvaluationScope,
        value: &T,
    ) -> Result<(), ArquimetroError> {
        let bytes = encode(value)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(definition).map_err(io_err)?;
            table
                .insert(scope.as_str(), bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)
    }
}

// =============================================================================
// CATALOGSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl CatalogStore for RedbStore {
    fn list_categories(&self) -> Result<Vec<Category>, ArquimetroError> {
        self.cache.list_categories()
    }

    fn list_subcategories(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Subcategory>, ArquimetroError> {
        self.cache.list_subcategories(category)
    }

    fn list_questions(&self, subcategory: SubcategoryId) -> Result<Vec<Question>, ArquimetroError> {
        self.cache.list_questions(subcategory)
    }

    fn list_response_options(
        &self,
        question: QuestionId,
    ) -> Result<Vec<ResponseOption>, ArquimetroError> {
        self.cache.list_response_options(question)
    }

    fn get_category(&self, id: CategoryId) -> Result<Option<Category>, ArquimetroError> {
        self.cache.get_category(id)
    }

    fn get_subcategory(&self, id: SubcategoryId) -> Result<Option<Subcategory>, ArquimetroError> {
        self.cache.get_subcategory(id)
    }

    fn get_question(&self, id: QuestionId) -> Result<Option<Question>, ArquimetroError> {
        self.cache.get_question(id)
    }

    fn get_response_option(
        &self,
        id: ResponseOptionId,
    ) -> Result<Option<ResponseOption>, ArquimetroError> {
        self.cache.get_response_option(id)
    }

    fn apply_mutation(
        &mut self,
        mutation: CatalogMutation,
    ) -> Result<MutationOutcome, ArquimetroError> {
        let mut next = self.cache.clone();
        let outcome = next.apply_mutation(mutation)?;
        self.persist(&outcome, next.next_id())?;
        // Update in-memory state only after successful commit.
        self.cache = next;
        Ok(outcome)
    }

    fn snapshot(&self) -> Result<Catalog, ArquimetroError> {
        Ok(self.cache.clone())
    }
}

// =============================================================================
// EVALUATIONSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl EvaluationStore for RedbStore {
    fn user_responses(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<QuestionId, ResponseOptionId>, ArquimetroError> {
        self.read_scoped(RESPONSES, scope)
    }

    fn upsert_response(
        &mut self,
        scope: &EvaluationScope,
        question: QuestionId,
        option: ResponseOptionId,
    ) -> Result<(), ArquimetroError> {
        let Some(record) = self.cache.response_option(option) else {
            return Err(ArquimetroError::NotFound(EntityRef::ResponseOption(option)));
        };
        if record.question_id != question {
            return Err(ArquimetroError::validation(
                EntityKind::ResponseOption,
                "question_id",
                format!(
                    "response option {} does not belong to question {}",
                    option, question
                ),
            ));
        }

        let mut responses = self.user_responses(scope)?;
        if responses.get(&question) == Some(&option) {
            return Ok(());
        }
        responses.insert(question, option);
        self.write_scoped(RESPONSES, scope, &responses)
    }

    fn upsert_category_result(
        &mut self,
        scope: &EvaluationScope,
        category: CategoryId,
        score: &CategoryScore,
    ) -> Result<(), ArquimetroError> {
        if self.cache.category(category).is_none() {
            return Err(ArquimetroError::NotFound(EntityRef::Category(category)));
        }
        let mut results = self.category_results(scope)?;
        results.insert(category, *score);
        self.write_scoped(RESULTS, scope, &results)
    }

    fn category_results(
        &self,
        scope: &EvaluationScope,
    ) -> Result<BTreeMap<CategoryId, CategoryScore>, ArquimetroError> {
        self.read_scoped(RESULTS, scope)
    }

    fn scopes(&self) -> Result<Vec<EvaluationScope>, ArquimetroError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(RESPONSES).map_err(io_err)?;
        let mut scopes = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (key, _) = entry.map_err(io_err)?;
            scopes.push(EvaluationScope::new(key.value())?);
        }
        Ok(scopes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
