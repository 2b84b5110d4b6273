// crates/arksync-core/src/definition.rs
// ============================================================================
// Module: Definition Model
// Description: Normalized catalog entries for identifier-prefix resolution.
// Purpose: Provide the canonical record type shared by engines and adapters.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Definition`] maps an identifier prefix (and optional shoulder) to a
//! resolution target template and a canonical identifier form. Definitions are
//! keyed by [`PidKey`], whose rendered `uniq` string is the upsert identity in
//! the catalog.
//! Invariants:
//! - An upstream-normalized Definition never has both `prefix` and `value`
//!   unset; the scheme-level default record is the single permitted exception
//!   and is constructed only by the reconciliation engine.
//! - `properties` carries the untouched upstream record for provenance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Redirect status code served for a definition without an explicit one.
pub const DEFAULT_HTTP_CODE: u16 = 302;

/// Provenance key wrapping the original upstream target object inside
/// `properties`, recorded before any local substitution is applied.
pub const PROVENANCE_TARGET_KEY: &str = "DEFAULT";

/// Target template of a scheme-level default definition.
pub const INFO_TARGET_TEMPLATE: &str = "/.info/${pid}";

// ============================================================================
// SECTION: Upsert Identity
// ============================================================================

/// Upsert identity of a definition: `(scheme, prefix, value)`.
///
/// # Invariants
/// - Distinct tuples render to distinct `uniq` strings.
/// - The rendered `uniq` string is unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PidKey {
    /// Identifier scheme tag, for example `ark`.
    pub scheme: String,
    /// Registrant authority code, absent for a scheme-level record.
    pub prefix: Option<String>,
    /// Shoulder under the prefix, absent for prefix-level records.
    pub value: Option<String>,
}

impl PidKey {
    /// Builds a scheme-level key.
    #[must_use]
    pub fn scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            prefix: None,
            value: None,
        }
    }

    /// Builds a prefix-level key.
    #[must_use]
    pub fn prefix(scheme: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            prefix: Some(prefix.into()),
            value: None,
        }
    }

    /// Builds a shoulder-level key.
    #[must_use]
    pub fn shoulder(
        scheme: impl Into<String>,
        prefix: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            prefix: Some(prefix.into()),
            value: Some(value.into()),
        }
    }

    /// Renders the upsert identity string: `scheme`, `scheme:prefix`, or
    /// `scheme:prefix/value`. A shoulder without a parent authority renders
    /// with an empty prefix segment so it never collides with the
    /// scheme-level record.
    #[must_use]
    pub fn uniq(&self) -> String {
        match (&self.prefix, &self.value) {
            (Some(prefix), Some(value)) => format!("{}:{prefix}/{value}", self.scheme),
            (Some(prefix), None) => format!("{}:{prefix}", self.scheme),
            (None, Some(value)) => format!("{}:/{value}", self.scheme),
            (None, None) => self.scheme.clone(),
        }
    }
}

impl fmt::Display for PidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uniq())
    }
}

// ============================================================================
// SECTION: Definition
// ============================================================================

/// Normalized registry entry mapping a prefix or shoulder to its resolution
/// target.
///
/// # Invariants
/// - `target` and `canonical` are `${pid}` / `${prefix}` / `${value}`
///   templates, never pre-expanded URLs for a specific identifier.
/// - `synonym_for` is always `None` for entries produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Identifier scheme tag.
    pub scheme: String,
    /// Registrant authority code.
    pub prefix: Option<String>,
    /// Shoulder under `prefix`.
    pub value: Option<String>,
    /// URL template the identifier resolves through.
    pub target: String,
    /// Redirect status code served for this target.
    pub http_code: u16,
    /// Template producing the canonical identifier string.
    pub canonical: String,
    /// Free-form provenance payload carrying the upstream record.
    pub properties: Value,
    /// Reference to another definition this one aliases.
    pub synonym_for: Option<String>,
}

impl Definition {
    /// Returns the upsert identity key of this definition.
    #[must_use]
    pub fn key(&self) -> PidKey {
        PidKey {
            scheme: self.scheme.clone(),
            prefix: self.prefix.clone(),
            value: self.value.clone(),
        }
    }

    /// Renders the upsert identity string.
    #[must_use]
    pub fn uniq(&self) -> String {
        self.key().uniq()
    }
}
