// crates/arksync-sources/src/shoulders.rs
// ============================================================================
// Module: Secondary Shoulder List Source
// Description: Extracts managed prefixes from a plaintext shoulder list.
// Purpose: Build the managed-elsewhere prefix set for authority overrides.
// Dependencies: arksync-core, regex, reqwest
// ============================================================================

//! ## Overview
//! The secondary authority publishes its shoulders as plaintext with
//! pattern-extractable `scheme:prefix/value` entries. This adapter scans the
//! text and reduces it to the set of prefixes that authority serves; the set
//! is only used to override resolution targets, never committed as
//! definitions. An answering server with a non-success status degrades to an
//! empty set (reported through the observer) so the sync pass can proceed
//! without overrides; transport failures propagate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use arksync_core::SyncEvent;
use arksync_core::SyncObserver;
use regex::Regex;
use reqwest::blocking::Client;

use crate::error::SourceError;
use crate::fetch::FetchConfig;
use crate::fetch::build_client;
use crate::fetch::load_text;

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// One `scheme:prefix/value` triple extracted from the shoulder list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoulderEntry {
    /// Identifier scheme tag.
    pub scheme: String,
    /// Registrant authority code.
    pub prefix: String,
    /// Shoulder under the prefix; empty when the entry is prefix-only.
    pub value: String,
}

/// Builds the shoulder entry pattern for a scheme tag.
///
/// # Errors
///
/// Returns [`SourceError`] when the assembled pattern does not compile.
pub fn shoulder_pattern(scheme: &str) -> Result<Regex, SourceError> {
    let pattern = format!(
        r"(?im)\b(?P<pid>{}:/?(?P<prefix>[0-9]{{5,10}})/(?P<value>\S+)?)",
        regex::escape(scheme)
    );
    Regex::new(&pattern).map_err(|err| SourceError::Parse(err.to_string()))
}

/// Scans shoulder-list text for entries of the given scheme.
///
/// # Errors
///
/// Returns [`SourceError`] when the scheme pattern does not compile.
pub fn extract_shoulder_entries(
    text: &str,
    scheme: &str,
) -> Result<Vec<ShoulderEntry>, SourceError> {
    let pattern = shoulder_pattern(scheme)?;
    let mut entries = Vec::new();
    for captures in pattern.captures_iter(text) {
        let Some(prefix) = captures.name("prefix") else {
            continue;
        };
        let value = captures.name("value").map_or("", |m| m.as_str());
        entries.push(ShoulderEntry {
            scheme: scheme.to_string(),
            prefix: prefix.as_str().to_string(),
            value: value.to_string(),
        });
    }
    Ok(entries)
}

// ============================================================================
// SECTION: Shoulder List Source
// ============================================================================

/// Secondary authority shoulder list loader.
#[derive(Debug, Clone)]
pub struct ShoulderListSource {
    /// HTTP client used for URL locations.
    client: Client,
    /// Payload byte ceiling.
    max_bytes: usize,
    /// Scheme tag the extraction pattern matches.
    scheme: String,
}

impl ShoulderListSource {
    /// Builds a shoulder list source for the given scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the HTTP client cannot be constructed.
    pub fn new(config: &FetchConfig, scheme: impl Into<String>) -> Result<Self, SourceError> {
        let client = build_client(config)?;
        Ok(Self {
            client,
            max_bytes: config.max_response_bytes,
            scheme: scheme.into(),
        })
    }

    /// Loads the shoulder list and reduces it to the managed prefix set.
    ///
    /// A server that answers with a non-success status yields an empty set
    /// and a [`SyncEvent::ShoulderListUnavailable`] event; the sync pass then
    /// runs without authority overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failures and unreadable payloads.
    pub fn managed_prefixes(
        &self,
        location: &str,
        observer: &dyn SyncObserver,
    ) -> Result<BTreeSet<String>, SourceError> {
        let text = match load_text(&self.client, location, self.max_bytes) {
            Ok(text) => text,
            Err(SourceError::Status(status)) => {
                observer.record(SyncEvent::ShoulderListUnavailable {
                    status: Some(status),
                    detail: format!("shoulder list fetch from {location} answered {status}"),
                });
                return Ok(BTreeSet::new());
            }
            Err(err) => return Err(err),
        };
        let entries = extract_shoulder_entries(&text, &self.scheme)?;
        Ok(entries.into_iter().map(|entry| entry.prefix).collect())
    }
}
