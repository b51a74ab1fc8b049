//! # Canonical Export Module
//!
//! Deterministic, bit-exact serialization of the catalog.
//!
//! `redb` files are not bit-identical across runs, so the canonical export is
//! the format used to move catalogs between installations and to compare
//! them. Records are sorted by id and encoded with `postcard`.
//!
//! Format:
//! ```text
//! [header_len: u32 LE] [CanonicalHeader (postcard)] [CanonicalCatalog (postcard)]
//! ```

use crate::catalog::{Catalog, CatalogParts};
use crate::primitives::{EXPORT_MAGIC, EXPORT_VERSION, MAX_EXPORT_SIZE, MAX_IMPORT_RECORDS};
use crate::types::{ArquimetroError, Category, Question, ResponseOption, Subcategory};
use serde::{Deserialize, Serialize};

// =============================================================================
// CANONICAL HEADER
// =============================================================================

/// Header for canonical export files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],
    /// Format version for compatibility.
    pub version: u8,
    pub category_count: u64,
    pub subcategory_count: u64,
    pub question_count: u64,
    pub response_option_count: u64,
    /// Checksum of the data section.
    pub checksum: u64,
}

impl CanonicalHeader {
    #[must_use]
    pub fn for_catalog(canonical: &CanonicalCatalog) -> Self {
        Self {
            magic: *EXPORT_MAGIC,
            version: EXPORT_VERSION,
            category_count: canonical.categories.len() as u64,
            subcategory_count: canonical.subcategories.len() as u64,
            question_count: canonical.questions.len() as u64,
            response_option_count: canonical.response_options.len() as u64,
            checksum: canonical.checksum(),
        }
    }

    /// Total number of records announced by the header.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.category_count
            .saturating_add(self.subcategory_count)
            .saturating_add(self.question_count)
            .saturating_add(self.response_option_count)
    }

    /// Validate magic, version and announced size.
    ///
    /// Error messages stay generic so they do not describe the format.
    pub fn validate(&self) -> Result<(), ArquimetroError> {
        if &self.magic != EXPORT_MAGIC {
            return Err(ArquimetroError::SerializationError(
                "Invalid file format".to_string(),
            ));
        }
        if self.version != EXPORT_VERSION {
            return Err(ArquimetroError::SerializationError(
                "Unsupported file version".to_string(),
            ));
        }
        if self.record_count() > MAX_IMPORT_RECORDS as u64 {
            return Err(ArquimetroError::SerializationError(format!(
                "Record count {} exceeds maximum allowed {}",
                self.record_count(),
                MAX_IMPORT_RECORDS
            )));
        }
        Ok(())
    }
}

// =============================================================================
// CANONICAL CATALOG
// =============================================================================

/// A catalog in canonical form: every list sorted by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalCatalog {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
    pub questions: Vec<Question>,
    pub response_options: Vec<ResponseOption>,
    /// Id counter, so re-imported catalogs never reuse ids.
    pub next_id: u64,
}

impl CanonicalCatalog {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let parts = catalog.to_parts();
        Self {
            categories: parts.categories,
            subcategories: parts.subcategories,
            questions: parts.questions,
            response_options: parts.response_options,
            next_id: catalog.next_id(),
        }
    }

    /// Rebuild a catalog, re-validating every record.
    pub fn to_catalog(&self) -> Result<Catalog, ArquimetroError> {
        let mut catalog = Catalog::from_parts(CatalogParts {
            categories: self.categories.clone(),
            subcategories: self.subcategories.clone(),
            questions: self.questions.clone(),
            response_options: self.response_options.clone(),
        })?;
        if self.next_id > catalog.next_id() {
            catalog.set_next_id(self.next_id);
        }
        Ok(catalog)
    }

    /// Compute a deterministic, order-sensitive checksum of the data.
    ///
    /// This is **NOT** a cryptographic hash. It detects accidental
    /// corruption; use the `crypto-hash` feature for tamper evidence.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hash = Checksum::default();

        for c in &self.categories {
            hash.word(c.id.0);
            hash.text(&c.title);
            hash.text(&c.description);
            hash.text(&c.icon);
            hash.text(&c.color);
            hash.word(c.sort_order as u64);
        }
        for s in &self.subcategories {
            hash.word(s.id.0);
            hash.text(&s.title);
            hash.word(s.category_id.0);
            hash.word(s.sort_order as u64);
        }
        for q in &self.questions {
            hash.word(q.id.0);
            hash.text(&q.text);
            hash.word(q.subcategory_id.0);
            for tag in q.deficiency_types.iter() {
                hash.text(tag.code());
            }
            hash.word(q.sort_order as u64);
        }
        for o in &self.response_options {
            hash.word(o.id.0);
            hash.word(o.question_id.0);
            hash.word(u64::from(o.level.value()));
            hash.text(&o.label);
            hash.text(&o.explanation);
            hash.text(&o.feedback);
            hash.word(u64::from(o.weight.hundredths()));
            for tag in o.deficiency_types.iter() {
                hash.text(tag.code());
            }
        }
        hash.word(self.next_id);

        hash.0
    }
}

/// Rotate-and-xor accumulator.
#[derive(Default)]
struct Checksum(u64);

impl Checksum {
    fn word(&mut self, value: u64) {
        self.0 = self.0.rotate_left(13) ^ value;
    }

    fn text(&mut self, value: &str) {
        self.word(value.len() as u64);
        for byte in value.as_bytes() {
            self.0 = self.0.rotate_left(7) ^ u64::from(*byte);
        }
    }
}

// =============================================================================
// EXPORT FUNCTIONS
// =============================================================================

/// Export a catalog to canonical postcard format.
pub fn export_canonical(catalog: &Catalog) -> Result<Vec<u8>, ArquimetroError> {
    let canonical = CanonicalCatalog::from_catalog(catalog);
    let header = CanonicalHeader::for_catalog(&canonical);

    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| ArquimetroError::SerializationError(format!("Header: {}", e)))?;
    let data_bytes = postcard::to_allocvec(&canonical)
        .map_err(|e| ArquimetroError::SerializationError(format!("Data: {}", e)))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + data_bytes.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&data_bytes);

    Ok(result)
}

/// Import a catalog from canonical postcard format.
///
/// Size limits are checked before the data section is decoded; checksum and
/// counts are verified afterwards, and every record is re-validated.
pub fn import_canonical(data: &[u8]) -> Result<Catalog, ArquimetroError> {
    if data.len() > MAX_EXPORT_SIZE {
        return Err(ArquimetroError::SerializationError(format!(
            "Export of {} bytes exceeds maximum allowed {}",
            data.len(),
            MAX_EXPORT_SIZE
        )));
    }
    let Some(len_bytes) = data.get(..4) else {
        return Err(ArquimetroError::SerializationError(
            "Data too short".to_string(),
        ));
    };
    let header_len =
        u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

    let Some(header_bytes) = 4usize
        .checked_add(header_len)
        .and_then(|end| data.get(4..end))
    else {
        return Err(ArquimetroError::SerializationError(
            "Data too short for header".to_string(),
        ));
    };

    let header: CanonicalHeader = postcard::from_bytes(header_bytes)
        .map_err(|e| ArquimetroError::DeserializationError(format!("Header: {}", e)))?;
    header.validate()?;

    let canonical: CanonicalCatalog = postcard::from_bytes(&data[4 + header_len..])
        .map_err(|e| ArquimetroError::DeserializationError(format!("Data: {}", e)))?;

    let computed = canonical.checksum();
    if computed != header.checksum {
        return Err(ArquimetroError::SerializationError(format!(
            "Checksum mismatch: expected {}, got {}",
            header.checksum, computed
        )));
    }
    if CanonicalHeader::for_catalog(&canonical) != header {
        return Err(ArquimetroError::SerializationError(
            "Record count mismatch".to_string(),
        ));
    }

    canonical.to_catalog()
}

/// Verify that a catalog matches a canonical export.
pub fn verify_canonical(catalog: &Catalog, canonical_data: &[u8]) -> Result<bool, ArquimetroError> {
    let imported = import_canonical(canonical_data)?;
    Ok(CanonicalCatalog::from_catalog(catalog) == CanonicalCatalog::from_catalog(&imported))
}

/// Compute the canonical checksum of a catalog.
#[must_use]
pub fn canonical_checksum(catalog: &Catalog) -> u64 {
    CanonicalCatalog::from_catalog(catalog).checksum()
}

// =============================================================================
// CRYPTOGRAPHIC HASH SUPPORT
// =============================================================================

/// BLAKE3 hash of the canonical export, as 64 hex characters.
///
/// Only available with the `crypto-hash` feature.
#[cfg(feature = "crypto-hash")]
pub fn canonical_crypto_hash(catalog: &Catalog) -> Result<String, ArquimetroError> {
    let data = export_canonical(catalog)?;
    Ok(blake3::hash(&data).to_hex().to_string())
}

/// Check a catalog against an expected BLAKE3 hash.
///
/// Only available with the `crypto-hash` feature.
#[cfg(feature = "crypto-hash")]
pub fn verify_crypto_hash(catalog: &Catalog, expected_hash: &str) -> Result<bool, ArquimetroError> {
    Ok(canonical_crypto_hash(catalog)? == expected_hash)
}

// =============================================================================
// TESTS
// =============================================================================
