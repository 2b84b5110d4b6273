// crates/arksync-sources/src/fetch.rs
// ============================================================================
// Module: Upstream Fetch Plumbing
// Description: Bounded blocking HTTP retrieval shared by source adapters.
// Purpose: Fetch upstream text payloads with strict limits, failing closed.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! Both upstream adapters retrieve their payloads through the same bounded
//! fetch: redirects refused, a hard per-request timeout, a response byte
//! ceiling enforced before and during the body read, and non-success status
//! codes surfaced as errors. Local file paths are read with the same byte
//! ceiling so an oversized source fails identically either way.
//! Security posture: upstream payloads are untrusted remote input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

use crate::error::SourceError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default upstream fetch timeout in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
/// Default upstream response ceiling in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Default user agent for upstream fetches.
pub const DEFAULT_FETCH_USER_AGENT: &str = "arksync-sources/0.1";

/// Limits applied to every upstream retrieval.
///
/// # Invariants
/// - `max_response_bytes` is a hard ceiling on payload size, for files and
///   HTTP responses alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum payload size in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_FETCH_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Builds the blocking client used by source adapters.
///
/// # Errors
///
/// Returns [`SourceError`] when the HTTP client cannot be constructed.
pub(crate) fn build_client(config: &FetchConfig) -> Result<Client, SourceError> {
    Client::builder()
        .redirect(Policy::none())
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|err| SourceError::Http(err.to_string()))
}

// ============================================================================
// SECTION: Retrieval
// ============================================================================

/// Fetches a text payload over HTTP with the byte ceiling enforced.
///
/// # Errors
///
/// Returns [`SourceError`] on unsupported schemes, transport failures,
/// non-success status codes, oversized payloads, or non-UTF-8 bodies.
pub(crate) fn fetch_text(
    client: &Client,
    location: &str,
    max_bytes: usize,
) -> Result<String, SourceError> {
    let url = Url::parse(location).map_err(|err| SourceError::InvalidUri(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(SourceError::UnsupportedScheme(scheme.to_string())),
    }

    let response = client
        .get(url.as_str())
        .send()
        .map_err(|err| SourceError::Http(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }
    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(SourceError::TooLarge {
                max_bytes,
                actual_bytes: usize::try_from(length).unwrap_or(usize::MAX),
            });
        }
    }

    let mut limited = response.take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited
        .read_to_end(&mut bytes)
        .map_err(|err| SourceError::Http(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(SourceError::TooLarge {
            max_bytes,
            actual_bytes: bytes.len(),
        });
    }
    String::from_utf8(bytes).map_err(|err| SourceError::Parse(err.to_string()))
}

/// Reads a local payload file with the byte ceiling enforced.
///
/// # Errors
///
/// Returns [`SourceError`] when the file is unreadable or oversized.
pub(crate) fn read_file(path: &Path, max_bytes: usize) -> Result<String, SourceError> {
    let metadata = fs::metadata(path).map_err(|err| SourceError::Io(err.to_string()))?;
    if metadata.len() > max_bytes as u64 {
        return Err(SourceError::TooLarge {
            max_bytes,
            actual_bytes: usize::try_from(metadata.len()).unwrap_or(usize::MAX),
        });
    }
    fs::read_to_string(path).map_err(|err| SourceError::Io(err.to_string()))
}

/// Retrieves a payload from a local path when one exists, otherwise over
/// HTTP.
///
/// # Errors
///
/// Returns [`SourceError`] when retrieval fails either way.
pub(crate) fn load_text(
    client: &Client,
    location: &str,
    max_bytes: usize,
) -> Result<String, SourceError> {
    let path = Path::new(location);
    if path.exists() {
        read_file(path, max_bytes)
    } else {
        fetch_text(client, location, max_bytes)
    }
}
