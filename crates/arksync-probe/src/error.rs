// crates/arksync-probe/src/error.rs
// ============================================================================
// Module: Probe Errors
// Description: Setup-time errors for chain walking and validation.
// Purpose: Keep walk outcomes as values; errors cover setup failures only.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Probe errors cover what prevents a walk from starting: an identifier that
//! does not split, a seed that is not an absolute `http(s)` URL, or a client
//! that cannot be built. Everything that happens during a walk, including
//! transport failures and cycles, is reported inside the chain report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Probe setup errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The identifier carries no recognizable scheme/prefix structure.
    #[error("identifier does not split: {0}")]
    InvalidIdentifier(String),
    /// The expanded seed is not an absolute http(s) URL.
    #[error("seed url invalid: {0}")]
    InvalidSeed(String),
    /// The HTTP client could not be constructed.
    #[error("probe client build failed: {0}")]
    Client(String),
}
