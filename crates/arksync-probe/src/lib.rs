// crates/arksync-probe/src/lib.rs
// ============================================================================
// Module: arksync Probe Library
// Description: Redirect chain walking and live resolution validation.
// Purpose: Verify that configured definitions resolve through real chains.
// Dependencies: arksync-core, reqwest, serde, thiserror, url
// ============================================================================

//! ## Overview
//! arksync-probe exercises a definition's target template against the live
//! redirect infrastructure of the authority under test: the
//! [`RedirectWalker`] follows chains hop by hop with cycle and locality
//! detection, and the [`ResolutionValidator`] turns a definition plus a test
//! identifier into a walkable seed URL.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod validate;
pub mod walker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ProbeError;
pub use validate::ResolutionValidator;
pub use walker::ChainOutcome;
pub use walker::ChainReport;
pub use walker::DEFAULT_MAX_HOPS;
pub use walker::DEFAULT_TIMEOUT_MS;
pub use walker::DEFAULT_USER_AGENT;
pub use walker::RedirectWalker;
pub use walker::WalkerConfig;
