// crates/arksync-core/src/normalize.rs
// ============================================================================
// Module: Record Normalizer
// Description: Maps raw upstream registry records onto Definition values.
// Purpose: Produce catalog-ready definitions or explicit skips, never errors.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The normalizer turns one raw upstream record into either a [`Definition`]
//! or an explicit skip with a reason. Skips are expected outcomes, not
//! failures: unknown record types and records with neither prefix nor value
//! are passed over while the surrounding pass keeps counting them.
//! Invariants:
//! - Provenance wraps the original upstream target before any rewrite or
//!   authority override touches the stored target.
//! - A produced Definition always carries at least one of prefix or value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;

use crate::definition::DEFAULT_HTTP_CODE;
use crate::definition::Definition;
use crate::definition::PROVENANCE_TARGET_KEY;
use crate::record::RegistryRecord;
use crate::record::TargetSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upstream placeholder for the full identifier inside declared target URLs,
/// rewritten to the scheme's canonical template during normalization.
pub const UPSTREAM_PID_PLACEHOLDER: &str = "$arkpid";

// ============================================================================
// SECTION: Context
// ============================================================================

/// Prefixes whose resolution is deferred to a second authority.
///
/// # Invariants
/// - When `prefixes` is non-empty, `target_template` is the authority's own
///   redirect template and replaces any upstream-declared target.
#[derive(Debug, Clone, Default)]
pub struct ManagedElsewhere {
    /// Prefixes the secondary authority serves.
    pub prefixes: BTreeSet<String>,
    /// The authority's redirect template.
    pub target_template: String,
}

impl ManagedElsewhere {
    /// Builds an override set with the authority's redirect template.
    #[must_use]
    pub fn new(target_template: impl Into<String>, prefixes: BTreeSet<String>) -> Self {
        Self {
            prefixes,
            target_template: target_template.into(),
        }
    }

    /// Returns true when the prefix is deferred to the secondary authority.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }
}

/// Inputs shared by every normalization in a sync pass.
#[derive(Debug, Clone)]
pub struct NormalizerContext {
    /// Scheme tag stamped on every definition, for example `ark`.
    pub scheme: String,
    /// Human-readable scheme name, used by the scheme-level default record.
    pub scheme_name: String,
    /// Scheme-wide canonical identifier template.
    pub canonical: String,
    /// Prefixes resolved by a second authority.
    pub managed: ManagedElsewhere,
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Reason a record produced no definition.
///
/// # Invariants
/// - Variants are stable for observer labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record's declared type is outside the recognized set.
    UnrecognizedType,
    /// The record resolves to neither a prefix nor a value.
    NullPrefixAndValue,
}

impl SkipReason {
    /// Returns a stable label for the skip reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizedType => "unrecognized_type",
            Self::NullPrefixAndValue => "null_prefix_and_value",
        }
    }
}

/// Outcome of normalizing one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The record mapped onto a catalog-ready definition.
    Definition(Definition),
    /// The record was passed over.
    Skip(SkipReason),
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes one raw upstream record.
///
/// Classification is a closed match over the record's declared type; each
/// variant contributes its prefix/value reading and optional explicit target.
#[must_use]
pub fn normalize_record(raw: &Value, ctx: &NormalizerContext) -> Normalized {
    let (prefix, value, target_spec) = match RegistryRecord::classify(raw) {
        RegistryRecord::Naan(record) => (clean(record.what), None, record.target),
        RegistryRecord::Shoulder(record) => {
            (clean(record.naan), clean(record.shoulder), record.target)
        }
        RegistryRecord::Unrecognized => return Normalized::Skip(SkipReason::UnrecognizedType),
    };
    if prefix.is_none() && value.is_none() {
        return Normalized::Skip(SkipReason::NullPrefixAndValue);
    }

    let properties = wrap_provenance(raw);
    let mut target = resolve_target(target_spec.as_ref(), prefix.as_deref(), ctx);
    if prefix.as_deref().is_some_and(|p| ctx.managed.contains(p)) {
        target = ctx.managed.target_template.clone();
    }
    let http_code = target_spec
        .as_ref()
        .and_then(|spec| spec.http_code)
        .unwrap_or(DEFAULT_HTTP_CODE);

    Normalized::Definition(Definition {
        scheme: ctx.scheme.clone(),
        prefix,
        value,
        target,
        http_code,
        canonical: ctx.canonical.clone(),
        properties,
        synonym_for: None,
    })
}

/// Resolves the stored target: an explicit upstream URL with the upstream pid
/// placeholder rewritten to the canonical template, or a synthesized
/// introspection path when the record declares none.
fn resolve_target(spec: Option<&TargetSpec>, prefix: Option<&str>, ctx: &NormalizerContext) -> String {
    match spec.and_then(|s| s.url.as_deref()) {
        Some(url) => url.replace(UPSTREAM_PID_PLACEHOLDER, &ctx.canonical),
        None => format!("/.info/{}/{}", ctx.scheme, prefix.unwrap_or_default()),
    }
}

/// Copies the raw record into provenance with its original target object
/// wrapped under the provenance key.
fn wrap_provenance(raw: &Value) -> Value {
    let original_target = raw.get("target").cloned().unwrap_or(Value::Null);
    let mut properties = raw.clone();
    if let Value::Object(map) = &mut properties {
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(PROVENANCE_TARGET_KEY.to_string(), original_target);
        map.insert("target".to_string(), Value::Object(wrapper));
    }
    properties
}

/// Maps empty or whitespace-only upstream fields to `None`.
fn clean(field: Option<String>) -> Option<String> {
    field.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
