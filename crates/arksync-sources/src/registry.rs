// crates/arksync-sources/src/registry.rs
// ============================================================================
// Module: Primary Registry Source
// Description: Loads the upstream prefix registry batch.
// Purpose: Turn a registry file or URL into a typed upstream batch.
// Dependencies: arksync-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The primary registry publishes a JSON document with a declared freshness
//! stamp and an ordered record list. `RegistrySource` retrieves it from a
//! local file path or an `http(s)` URL and parses it into an
//! [`UpstreamBatch`]; any retrieval or parse failure aborts the surrounding
//! sync pass before a single catalog write happens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use arksync_core::UpstreamBatch;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::SourceError;
use crate::fetch::FetchConfig;
use crate::fetch::build_client;
use crate::fetch::load_text;

// ============================================================================
// SECTION: Registry Source
// ============================================================================

/// Primary registry batch loader.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    /// HTTP client used for URL locations.
    client: Client,
    /// Payload byte ceiling.
    max_bytes: usize,
}

impl RegistrySource {
    /// Builds a registry source with the given fetch limits.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the HTTP client cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, SourceError> {
        let client = build_client(config)?;
        Ok(Self {
            client,
            max_bytes: config.max_response_bytes,
        })
    }

    /// Loads the registry batch from a file path or URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when retrieval fails or the payload does not
    /// parse as a registry batch.
    pub fn load(&self, location: &str) -> Result<UpstreamBatch, SourceError> {
        let text = load_text(&self.client, location, self.max_bytes)?;
        let payload: Value =
            serde_json::from_str(&text).map_err(|err| SourceError::Parse(err.to_string()))?;
        UpstreamBatch::from_value(&payload).map_err(|err| SourceError::Parse(err.to_string()))
    }
}
