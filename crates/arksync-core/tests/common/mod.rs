// crates/arksync-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Shared builders for batches, contexts, and records.
// Purpose: Keep engine tests focused on behavior, not payload assembly.
// Dependencies: arksync-core, serde_json
// ============================================================================

//! ## Overview
//! Fixture builders for the reconciliation and normalizer tests: an `ark`
//! normalizer context, upstream batch assembly with a declared freshness
//! stamp, and raw registry record payloads.

#![allow(
    dead_code,
    reason = "Fixtures are shared across test binaries with different usage."
)]

use std::collections::BTreeSet;

use arksync_core::ManagedElsewhere;
use arksync_core::NormalizerContext;
use arksync_core::UpstreamBatch;
use arksync_core::parse_timestamp;
use serde_json::Value;
use serde_json::json;

/// Canonical template used by the `ark` fixtures.
pub const ARK_CANONICAL: &str = "ark:/${prefix}/${value}";

/// Freshness stamp declared by fixture batches.
pub const BATCH_UPDATED: &str = "2024-03-01T12:00:00Z";

/// Builds an `ark` normalizer context without authority overrides.
pub fn ark_context() -> NormalizerContext {
    NormalizerContext {
        scheme: "ark".to_string(),
        scheme_name: "Archival Resource Key".to_string(),
        canonical: ARK_CANONICAL.to_string(),
        managed: ManagedElsewhere::default(),
    }
}

/// Builds an `ark` normalizer context deferring the given prefixes to a
/// secondary authority template.
pub fn managed_context(template: &str, prefixes: &[&str]) -> NormalizerContext {
    let mut context = ark_context();
    let set: BTreeSet<String> = prefixes.iter().map(ToString::to_string).collect();
    context.managed = ManagedElsewhere::new(template, set);
    context
}

/// Assembles a batch with the fixture freshness stamp.
pub fn batch(records: Vec<Value>) -> UpstreamBatch {
    batch_updated_at(records, BATCH_UPDATED)
}

/// Assembles a batch with an explicit freshness stamp.
pub fn batch_updated_at(records: Vec<Value>, updated: &str) -> UpstreamBatch {
    UpstreamBatch {
        updated: parse_timestamp(updated).expect("fixture stamp parses"),
        data: records,
    }
}

/// Builds a prefix-level record with an explicit target URL.
pub fn naan_record(what: &str, url: &str) -> Value {
    json!({
        "rtype": "PublicNAAN",
        "what": what,
        "name": format!("registrant {what}"),
        "target": { "url": url, "http_code": 302 },
    })
}

/// Builds a prefix-level record without a target.
pub fn naan_record_untargeted(what: &str) -> Value {
    json!({
        "rtype": "PublicNAAN",
        "what": what,
    })
}

/// Builds a shoulder-level record.
pub fn shoulder_record(naan: &str, shoulder: &str, url: &str) -> Value {
    json!({
        "rtype": "PublicNAANShoulder",
        "what": format!("{naan}/{shoulder}"),
        "naan": naan,
        "shoulder": shoulder,
        "target": { "url": url, "http_code": 301 },
    })
}
