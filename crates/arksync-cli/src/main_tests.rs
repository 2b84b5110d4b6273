// crates/arksync-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Tests for definition resolution and info payload assembly.
// Purpose: Validate command helpers against the in-memory catalog.
// Dependencies: arksync-core, serde_json
// ============================================================================

//! ## Overview
//! Tests the CLI helpers for:
//! - Most-specific definition resolution (shoulder, then prefix, then scheme)
//! - Info payload shape for populated catalogs

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

use arksync_core::Catalog;
use arksync_core::Definition;
use arksync_core::MemoryCatalog;
use arksync_core::split_identifier;
use serde_json::json;

use crate::info_payload;
use crate::resolve_definition;

/// Builds a definition with the given identity parts.
fn entry(prefix: Option<&str>, value: Option<&str>, target: &str) -> Definition {
    Definition {
        scheme: "ark".to_string(),
        prefix: prefix.map(ToString::to_string),
        value: value.map(ToString::to_string),
        target: target.to_string(),
        http_code: 302,
        canonical: "ark:/${prefix}/${value}".to_string(),
        properties: json!({}),
        synonym_for: None,
    }
}

/// Builds a catalog holding scheme, prefix, and shoulder entries.
fn populated_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new("test catalog");
    catalog.upsert(&entry(None, None, "/.info/${pid}")).unwrap();
    catalog.upsert(&entry(Some("12345"), None, "https://example.org/p")).unwrap();
    catalog
        .upsert(&entry(Some("12345"), Some("x5"), "https://example.org/s"))
        .unwrap();
    catalog
}

/// Shoulder identifiers resolve to the shoulder definition.
#[test]
fn shoulder_resolves_most_specific() {
    let catalog = populated_catalog();
    let parts = split_identifier("ark:/12345/x5").unwrap();
    let definition = resolve_definition(&catalog, &parts).unwrap().unwrap();
    assert_eq!(definition.uniq(), "ark:12345/x5");
}

/// An unregistered shoulder falls back to its prefix definition.
#[test]
fn unregistered_shoulder_falls_back_to_prefix() {
    let catalog = populated_catalog();
    let parts = split_identifier("ark:/12345/zz9").unwrap();
    let definition = resolve_definition(&catalog, &parts).unwrap().unwrap();
    assert_eq!(definition.uniq(), "ark:12345");
}

/// An unregistered prefix falls back to the scheme definition.
#[test]
fn unregistered_prefix_falls_back_to_scheme() {
    let catalog = populated_catalog();
    let parts = split_identifier("ark:/99999/x5").unwrap();
    let definition = resolve_definition(&catalog, &parts).unwrap().unwrap();
    assert_eq!(definition.uniq(), "ark");
}

/// An unknown scheme resolves to nothing.
#[test]
fn unknown_scheme_resolves_to_nothing() {
    let catalog = populated_catalog();
    let parts = split_identifier("doi:10.5072/FK2").unwrap();
    assert!(resolve_definition(&catalog, &parts).unwrap().is_none());
}

/// The info payload carries scheme totals and per-scheme prefix counts.
#[test]
fn info_payload_counts_schemes_and_prefixes() {
    let catalog = populated_catalog();
    let payload = info_payload(&catalog).unwrap();
    assert_eq!(payload["status"], "initialized");
    assert_eq!(payload["schemes"]["total"], 1);
    assert_eq!(payload["schemes"]["valid"], 1);
    assert_eq!(payload["schemes"]["ark"]["prefix_count"], 1);
}
