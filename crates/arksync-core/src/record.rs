// crates/arksync-core/src/record.rs
// ============================================================================
// Module: Upstream Record Model
// Description: Wire shapes for upstream registry batches and their records.
// Purpose: Classify raw registry payload entries into a closed variant set.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The primary registry delivers `{ "metadata": { "updated": .. },
//! "data": [ record.. ] }` payloads. Each record carries an `rtype` tag;
//! classification is a closed set of variants with an explicit catch-all, so
//! unknown record types skip instead of failing the batch.
//! Security posture: upstream payloads are untrusted input; fields are
//! optional and unknown keys are preserved only inside provenance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::well_known::Iso8601;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Batch
// ============================================================================

/// Ordered upstream registry batch.
///
/// # Invariants
/// - `data` preserves source order; duplicates are processed independently.
#[derive(Debug, Clone)]
pub struct UpstreamBatch {
    /// Freshness timestamp declared by the source.
    pub updated: OffsetDateTime,
    /// Raw records in source order.
    pub data: Vec<Value>,
}

/// Errors raised while reading a registry batch payload.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BatchParseError {
    /// A required field is absent from the payload.
    #[error("registry batch missing field: {0}")]
    Missing(&'static str),
    /// The declared freshness timestamp does not parse.
    #[error("registry batch timestamp unreadable: {0}")]
    Timestamp(String),
}

impl UpstreamBatch {
    /// Reads a batch from a parsed registry payload.
    ///
    /// # Errors
    ///
    /// Returns [`BatchParseError`] when `metadata.updated` or `data` are
    /// missing or malformed.
    pub fn from_value(payload: &Value) -> Result<Self, BatchParseError> {
        let updated_raw = payload
            .get("metadata")
            .and_then(|metadata| metadata.get("updated"))
            .and_then(Value::as_str)
            .ok_or(BatchParseError::Missing("metadata.updated"))?;
        let updated = parse_timestamp(updated_raw)
            .map_err(|err| BatchParseError::Timestamp(format!("{updated_raw}: {err}")))?;
        let data = payload
            .get("data")
            .and_then(Value::as_array)
            .ok_or(BatchParseError::Missing("data"))?
            .clone();
        Ok(Self {
            updated,
            data,
        })
    }
}

/// Parses a source timestamp, accepting RFC 3339 and offset-less ISO 8601
/// forms (the registry emits both; offset-less values are taken as UTC).
///
/// # Errors
///
/// Returns the underlying parse error when neither form matches.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(raw, &Rfc3339).or_else(|err| {
        PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|_| err)
    })
}

// ============================================================================
// SECTION: Record Classification
// ============================================================================

/// Explicit target carried by a registry record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetSpec {
    /// Resolution URL, possibly templated.
    #[serde(default)]
    pub url: Option<String>,
    /// Redirect status code to serve.
    #[serde(default)]
    pub http_code: Option<u16>,
}

/// Prefix-level registry record body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NaanRecord {
    /// Registrant authority code.
    #[serde(default)]
    pub what: Option<String>,
    /// Explicit resolution target.
    #[serde(default)]
    pub target: Option<TargetSpec>,
}

/// Shoulder-level registry record body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShoulderRecord {
    /// Parent authority code.
    #[serde(default)]
    pub naan: Option<String>,
    /// Shoulder under the parent authority.
    #[serde(default)]
    pub shoulder: Option<String>,
    /// Explicit resolution target.
    #[serde(default)]
    pub target: Option<TargetSpec>,
}

/// Closed classification of upstream registry records by declared type.
///
/// # Invariants
/// - Unknown or untagged records classify as `Unrecognized`, never as an
///   error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "rtype")]
pub enum RegistryRecord {
    /// Prefix-level entry.
    #[serde(rename = "PublicNAAN")]
    Naan(NaanRecord),
    /// Shoulder-level entry.
    #[serde(rename = "PublicNAANShoulder")]
    Shoulder(ShoulderRecord),
    /// Any other record type; skipped by the normalizer.
    #[serde(other)]
    Unrecognized,
}

impl RegistryRecord {
    /// Classifies a raw record value.
    #[must_use]
    pub fn classify(raw: &Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or(Self::Unrecognized)
    }
}
