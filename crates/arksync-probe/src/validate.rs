// crates/arksync-probe/src/validate.rs
// ============================================================================
// Module: Resolution Validator
// Description: Exercises a definition's target template against a live chain.
// Purpose: Expand an identifier into its seed URL and delegate to the walker.
// Dependencies: arksync-core, url
// ============================================================================

//! ## Overview
//! The validator splits a test identifier into its structural parts,
//! substitutes them into a definition's target template, and walks the
//! resulting chain with the authority's own host prefixes as the locality
//! set. A definition whose target cannot produce an absolute `http(s)` seed
//! (for example an introspection path) fails validation before any request
//! is made.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use arksync_core::Definition;
use arksync_core::expand_template;
use arksync_core::split_identifier;
use url::Url;

use crate::error::ProbeError;
use crate::walker::ChainReport;
use crate::walker::RedirectWalker;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates definitions by exercising their redirect chains.
#[derive(Debug, Clone)]
pub struct ResolutionValidator {
    /// Walker driving the HTTP chain.
    walker: RedirectWalker,
    /// The authority's own host prefixes.
    local_prefixes: Vec<String>,
    /// Headers attached to every hop.
    headers: BTreeMap<String, String>,
}

impl ResolutionValidator {
    /// Creates a validator over the authority identified by `local_prefixes`.
    #[must_use]
    pub fn new(walker: RedirectWalker, local_prefixes: Vec<String>) -> Self {
        Self {
            walker,
            local_prefixes,
            headers: BTreeMap::new(),
        }
    }

    /// Attaches headers sent on every hop.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Expands the identifier through the definition's target template and
    /// walks the resulting chain.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the identifier does not split or the
    /// expanded seed is not an absolute `http(s)` URL. Walk outcomes,
    /// including cycles and transport failures, are values inside the
    /// returned report.
    pub fn validate(
        &self,
        definition: &Definition,
        identifier: &str,
    ) -> Result<ChainReport, ProbeError> {
        let parts = split_identifier(identifier)
            .ok_or_else(|| ProbeError::InvalidIdentifier(identifier.to_string()))?;
        let seed = expand_template(&definition.target, &parts);
        let url = Url::parse(&seed).map_err(|err| ProbeError::InvalidSeed(format!("{seed}: {err}")))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ProbeError::InvalidSeed(format!(
                    "{seed}: unsupported scheme {scheme}"
                )));
            }
        }
        Ok(self.walker.follow_chain(url.as_str(), &self.headers, &self.local_prefixes))
    }
}
