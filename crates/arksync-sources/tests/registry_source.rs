// crates/arksync-sources/tests/registry_source.rs
// ============================================================================
// Module: Registry Source Tests
// Description: Batch retrieval tests over files and loopback HTTP.
// Purpose: Validate file-or-URL loading, limits, and fail-closed parsing.
// Dependencies: arksync-sources, tempfile, tiny_http
// ============================================================================

//! ## Overview
//! Tests the primary registry source for:
//! - Happy path: batch loading from a file path and from a URL
//! - Fail-closed behavior: non-success statuses, malformed JSON, missing
//!   metadata, oversized payloads
//! - Freshness stamp parsing, with and without an explicit offset

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::fs;

use arksync_sources::FetchConfig;
use arksync_sources::RegistrySource;
use arksync_sources::SourceError;
use tempfile::tempdir;

use crate::common::registry_payload;
use crate::common::spawn_server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a source with default limits.
fn source() -> RegistrySource {
    RegistrySource::new(&FetchConfig::default()).unwrap()
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

/// A registry file on disk loads into a batch.
#[test]
fn loads_batch_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("naans_public.json");
    fs::write(&path, registry_payload("2024-03-01T12:00:00Z", "12345")).unwrap();

    let batch = source().load(path.to_str().unwrap()).unwrap();
    assert_eq!(batch.data.len(), 1);
    assert_eq!(
        batch.data[0].get("what").and_then(serde_json::Value::as_str),
        Some("12345")
    );
}

/// A registry URL loads into a batch.
#[test]
fn loads_batch_from_url() {
    let (url, handle) = spawn_server(registry_payload("2024-03-01T12:00:00Z", "99999"), 200);
    let batch = source().load(&url).unwrap();
    assert_eq!(batch.data.len(), 1);
    handle.join().unwrap();
}

/// An offset-less freshness stamp is accepted and taken as UTC.
#[test]
fn offsetless_stamp_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("naans_public.json");
    fs::write(&path, registry_payload("2024-03-01T12:00:00", "12345")).unwrap();

    let batch = source().load(path.to_str().unwrap()).unwrap();
    assert_eq!(batch.updated.unix_timestamp(), 1_709_294_400);
}

// ============================================================================
// SECTION: Fail-Closed Behavior
// ============================================================================

/// A non-success status aborts the load.
#[test]
fn non_success_status_rejected() {
    let (url, handle) = spawn_server("gone".to_string(), 404);
    let result = source().load(&url);
    assert!(matches!(result, Err(SourceError::Status(404))));
    handle.join().unwrap();
}

/// Malformed JSON aborts the load.
#[test]
fn malformed_json_rejected() {
    let (url, handle) = spawn_server("not json {{{".to_string(), 200);
    let result = source().load(&url);
    assert!(matches!(result, Err(SourceError::Parse(_))));
    handle.join().unwrap();
}

/// A payload without the declared freshness stamp aborts the load.
#[test]
fn missing_metadata_rejected() {
    let (url, handle) = spawn_server(r#"{ "data": [] }"#.to_string(), 200);
    let result = source().load(&url);
    assert!(matches!(result, Err(SourceError::Parse(_))));
    handle.join().unwrap();
}

/// A payload without a record list aborts the load.
#[test]
fn missing_data_rejected() {
    let (url, handle) = spawn_server(
        r#"{ "metadata": { "updated": "2024-03-01T12:00:00Z" } }"#.to_string(),
        200,
    );
    let result = source().load(&url);
    assert!(matches!(result, Err(SourceError::Parse(_))));
    handle.join().unwrap();
}

/// A response beyond the byte ceiling is rejected.
#[test]
fn oversized_response_rejected() {
    let (url, handle) = spawn_server(registry_payload("2024-03-01T12:00:00Z", "12345"), 200);
    let limited = RegistrySource::new(&FetchConfig {
        max_response_bytes: 16,
        ..FetchConfig::default()
    })
    .unwrap();
    let result = limited.load(&url);
    assert!(matches!(result, Err(SourceError::TooLarge { .. })));
    handle.join().unwrap();
}

/// An oversized file on disk is rejected the same way.
#[test]
fn oversized_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("naans_public.json");
    fs::write(&path, registry_payload("2024-03-01T12:00:00Z", "12345")).unwrap();

    let limited = RegistrySource::new(&FetchConfig {
        max_response_bytes: 16,
        ..FetchConfig::default()
    })
    .unwrap();
    let result = limited.load(path.to_str().unwrap());
    assert!(matches!(result, Err(SourceError::TooLarge { .. })));
}

/// A location that is neither a file nor a URL is rejected.
#[test]
fn unreadable_location_rejected() {
    let result = source().load("no-such-file.json");
    assert!(matches!(result, Err(SourceError::InvalidUri(_))));
}
