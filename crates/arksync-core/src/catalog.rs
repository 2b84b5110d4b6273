// crates/arksync-core/src/catalog.rs
// ============================================================================
// Module: Catalog Port
// Description: Backend-agnostic catalog interface for definition storage.
// Purpose: Define the contract surface the reconciliation engine consumes.
// Dependencies: thiserror, time
// ============================================================================

//! ## Overview
//! The [`Catalog`] trait is the only storage surface the engines see. Upserts
//! report a signed change magnitude so callers can attribute added versus
//! updated outcomes to specific records; conflicts are recoverable per record
//! and must leave previously committed siblings untouched.
//! A [`MemoryCatalog`] reference implementation backs engine tests and
//! embedders without persistence needs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;
use time::OffsetDateTime;

use crate::definition::Definition;
use crate::definition::PidKey;

// ============================================================================
// SECTION: Port Types
// ============================================================================

/// Result of a catalog upsert.
///
/// # Invariants
/// - `change_magnitude < 0` means the definition was newly added, `0` means
///   no stored field changed, `> 0` counts the changed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertReceipt {
    /// Upsert identity of the affected definition.
    pub uniq: String,
    /// Signed change magnitude.
    pub change_magnitude: i64,
}

/// Catalog lifecycle metadata.
///
/// # Invariants
/// - `created` is written once at initialization; `updated` only by
///   [`Catalog::refresh_metadata`] at the end of a successful sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMetadata {
    /// Operator description of the catalog.
    pub description: String,
    /// Initialization time.
    pub created: Option<OffsetDateTime>,
    /// Last successful sync time.
    pub updated: Option<OffsetDateTime>,
}

/// Catalog port errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling; `Conflict` is the only
///   variant the reconciliation engine recovers from per record.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Upsert violated a uniqueness or integrity constraint.
    #[error("catalog conflict: {0}")]
    Conflict(String),
    /// Underlying storage failed.
    #[error("catalog io error: {0}")]
    Io(String),
    /// The catalog or a supplied value is in an invalid state.
    #[error("catalog invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Port Trait
// ============================================================================

/// Storage port for definition catalogs.
pub trait Catalog {
    /// Adds the definition or updates the stored entry sharing its identity.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the upsert fails; a `Conflict` leaves
    /// the catalog as it was before this call.
    fn upsert(&self, definition: &Definition) -> Result<UpsertReceipt, CatalogError>;

    /// Fetches a definition by identity.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails.
    fn get(&self, key: &PidKey) -> Result<Option<Definition>, CatalogError>;

    /// Reads catalog lifecycle metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog is unreadable.
    fn get_metadata(&self) -> Result<CatalogMetadata, CatalogError>;

    /// Stamps `updated` with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the stamp cannot be written.
    fn refresh_metadata(&self) -> Result<(), CatalogError>;

    /// Lists distinct schemes, optionally only those with at least one
    /// definition whose target is an absolute `http(s)` URL.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the listing fails.
    fn list_schemes(&self, valid_targets_only: bool) -> Result<Vec<String>, CatalogError>;

    /// Lists distinct prefixes under a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the listing fails.
    fn list_prefixes(&self, scheme: &str) -> Result<Vec<String>, CatalogError>;
}

/// Returns true when a stored target counts as resolvable for listings.
#[must_use]
pub fn is_valid_target(target: &str) -> bool {
    target.starts_with("https://") || target.starts_with("http://")
}

// ============================================================================
// SECTION: Memory Catalog
// ============================================================================

/// Mutable state behind the in-memory catalog lock.
#[derive(Debug)]
struct MemoryCatalogInner {
    /// Operator description.
    description: String,
    /// Initialization time.
    created: Option<OffsetDateTime>,
    /// Last successful sync time.
    updated: Option<OffsetDateTime>,
    /// Definitions keyed by rendered identity.
    entries: BTreeMap<String, Definition>,
}

/// In-memory reference catalog.
///
/// # Invariants
/// - Upserts are atomic per call; a failed call leaves no partial entry.
#[derive(Debug)]
pub struct MemoryCatalog {
    /// Guarded catalog state.
    inner: Mutex<MemoryCatalogInner>,
}

impl MemoryCatalog {
    /// Creates an initialized in-memory catalog.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryCatalogInner {
                description: description.into(),
                created: Some(OffsetDateTime::now_utc()),
                updated: None,
                entries: BTreeMap::new(),
            }),
        }
    }

    /// Overrides the `updated` stamp, for bootstrap and restore flows that
    /// need to reproduce a prior sync state.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog lock is poisoned.
    pub fn set_updated(&self, updated: Option<OffsetDateTime>) -> Result<(), CatalogError> {
        let mut inner = self.lock()?;
        inner.updated = updated;
        Ok(())
    }

    /// Acquires the state lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryCatalogInner>, CatalogError> {
        self.inner
            .lock()
            .map_err(|_| CatalogError::Io("catalog lock poisoned".to_string()))
    }
}

/// Counts differing stored fields between two definitions sharing an
/// identity.
fn change_magnitude(stored: &Definition, incoming: &Definition) -> i64 {
    let mut changes = 0;
    if stored.target != incoming.target {
        changes += 1;
    }
    if stored.http_code != incoming.http_code {
        changes += 1;
    }
    if stored.canonical != incoming.canonical {
        changes += 1;
    }
    if stored.synonym_for != incoming.synonym_for {
        changes += 1;
    }
    if stored.properties != incoming.properties {
        changes += 1;
    }
    changes
}

impl Catalog for MemoryCatalog {
    fn upsert(&self, definition: &Definition) -> Result<UpsertReceipt, CatalogError> {
        let uniq = definition.uniq();
        let mut inner = self.lock()?;
        let magnitude = match inner.entries.get(&uniq) {
            None => -1,
            Some(stored) => change_magnitude(stored, definition),
        };
        if magnitude != 0 {
            inner.entries.insert(uniq.clone(), definition.clone());
        }
        Ok(UpsertReceipt {
            uniq,
            change_magnitude: magnitude,
        })
    }

    fn get(&self, key: &PidKey) -> Result<Option<Definition>, CatalogError> {
        let inner = self.lock()?;
        Ok(inner.entries.get(&key.uniq()).cloned())
    }

    fn get_metadata(&self) -> Result<CatalogMetadata, CatalogError> {
        let inner = self.lock()?;
        Ok(CatalogMetadata {
            description: inner.description.clone(),
            created: inner.created,
            updated: inner.updated,
        })
    }

    fn refresh_metadata(&self) -> Result<(), CatalogError> {
        let mut inner = self.lock()?;
        inner.updated = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    fn list_schemes(&self, valid_targets_only: bool) -> Result<Vec<String>, CatalogError> {
        let inner = self.lock()?;
        let mut schemes: Vec<String> = Vec::new();
        for definition in inner.entries.values() {
            if valid_targets_only && !is_valid_target(&definition.target) {
                continue;
            }
            if !schemes.contains(&definition.scheme) {
                schemes.push(definition.scheme.clone());
            }
        }
        schemes.sort();
        Ok(schemes)
    }

    fn list_prefixes(&self, scheme: &str) -> Result<Vec<String>, CatalogError> {
        let inner = self.lock()?;
        let mut prefixes: Vec<String> = Vec::new();
        for definition in inner.entries.values() {
            if definition.scheme != scheme {
                continue;
            }
            if let Some(prefix) = &definition.prefix {
                if !prefixes.contains(prefix) {
                    prefixes.push(prefix.clone());
                }
            }
        }
        prefixes.sort();
        Ok(prefixes)
    }
}
