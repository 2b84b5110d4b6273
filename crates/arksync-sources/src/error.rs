// crates/arksync-sources/src/error.rs
// ============================================================================
// Module: Source Errors
// Description: Errors raised while retrieving or parsing upstream payloads.
// Purpose: Make source failures abort a sync pass with a precise cause.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A source failure aborts the sync pass it feeds: nothing beyond what
//! already committed reaches the catalog. Variants distinguish transport
//! problems from malformed payloads so operators can tell infrastructure
//! faults from upstream format drift.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors emitted by upstream source adapters.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Local file retrieval failed.
    #[error("source io error: {0}")]
    Io(String),
    /// The source location is not a readable URI.
    #[error("source uri invalid: {0}")]
    InvalidUri(String),
    /// The source URI scheme is unsupported.
    #[error("source scheme unsupported: {0}")]
    UnsupportedScheme(String),
    /// Transport-level retrieval failure.
    #[error("source fetch failed: {0}")]
    Http(String),
    /// The server answered with a non-success status.
    #[error("source http status {0}")]
    Status(u16),
    /// The payload exceeds the configured ceiling.
    #[error("source payload too large: {actual_bytes} > {max_bytes}")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// The payload does not parse as the expected shape.
    #[error("source payload unreadable: {0}")]
    Parse(String),
}
