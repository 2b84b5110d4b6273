// crates/arksync-sources/src/lib.rs
// ============================================================================
// Module: arksync Sources Library
// Description: Upstream registry and shoulder list adapters for arksync.
// Purpose: Retrieve and type upstream payloads feeding the sync engine.
// Dependencies: arksync-core, regex, reqwest, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! arksync-sources retrieves the two upstream payloads a sync pass needs:
//! the primary JSON registry batch ([`RegistrySource`]) and the secondary
//! authority's plaintext shoulder list ([`ShoulderListSource`]), which is
//! reduced to the managed-elsewhere prefix set. Retrieval is bounded and
//! fails closed; source failures abort the pass they feed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
mod fetch;
pub mod registry;
pub mod shoulders;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::SourceError;
pub use fetch::DEFAULT_FETCH_TIMEOUT_MS;
pub use fetch::DEFAULT_FETCH_USER_AGENT;
pub use fetch::DEFAULT_MAX_RESPONSE_BYTES;
pub use fetch::FetchConfig;
pub use registry::RegistrySource;
pub use shoulders::ShoulderEntry;
pub use shoulders::ShoulderListSource;
pub use shoulders::extract_shoulder_entries;
pub use shoulders::shoulder_pattern;
