//! Identifier splitting property-based tests.
//!
//! ## Purpose
//! These tests fuzz identifier strings to ensure splitting never panics and
//! that structurally well-formed identifiers round-trip through template
//! expansion.
//!
//! ## What is covered
//! - Arbitrary strings are split without panic.
//! - Generated `scheme:prefix/value` identifiers recover their parts.
//! - Canonical expansion rebuilds the slashed identifier form.
//!
//! ## What is intentionally out of scope
//! - Scheme-specific semantic validation (the splitter is structural only).
// crates/arksync-core/tests/proptest_pid.rs
// ============================================================================
// Module: Identifier Splitting Property-Based Tests
// Description: Fuzz-like checks for identifier decomposition.
// Purpose: Ensure splitting fails closed without panics on hostile input.
// ============================================================================

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

use arksync_core::expand_template;
use arksync_core::split_identifier;
use proptest::prelude::*;

proptest! {
    /// Arbitrary input never panics the splitter.
    #[test]
    fn splitting_never_panics(identifier in ".{0,128}") {
        let _ = split_identifier(&identifier);
    }

    /// Well-formed identifiers recover their structural parts.
    #[test]
    fn well_formed_identifiers_recover_parts(
        prefix in "[0-9]{5,10}",
        value in "[a-z0-9]{1,12}",
    ) {
        let identifier = format!("ark:/{prefix}/{value}");
        let parts = split_identifier(&identifier).expect("identifier splits");
        prop_assert_eq!(parts.scheme.as_str(), "ark");
        prop_assert_eq!(parts.prefix.as_deref(), Some(prefix.as_str()));
        prop_assert_eq!(parts.value.as_deref(), Some(value.as_str()));
    }

    /// Canonical expansion rebuilds the slashed identifier form.
    #[test]
    fn canonical_expansion_round_trips(
        prefix in "[0-9]{5,10}",
        value in "[a-z0-9]{1,12}",
    ) {
        let identifier = format!("ark:{prefix}/{value}");
        let parts = split_identifier(&identifier).expect("identifier splits");
        let canonical = expand_template("ark:/${prefix}/${value}", &parts);
        prop_assert_eq!(canonical, format!("ark:/{prefix}/{value}"));
    }
}
