// crates/arksync-probe/src/walker.rs
// ============================================================================
// Module: Redirect Walker
// Description: Bounded hop-by-hop traversal of HTTP redirect chains.
// Purpose: Confirm a definition's chain stays local and exits cleanly.
// Dependencies: reqwest, serde, url
// ============================================================================

//! ## Overview
//! The walker drives an HTTP client through a redirect chain one hop at a
//! time, never following redirects implicitly. Hops whose destination starts
//! with one of the authority's own host prefixes are local and are fetched;
//! the first non-local destination terminates the walk without being
//! dereferenced. Cycles, hop-ceiling exhaustion, and transport failures are
//! first-class outcomes inside the returned report, never errors.
//! Invariants:
//! - `visited` holds the seed plus every fetched local hop, in order.
//! - At most one request is in flight per chain; hops are sequentially
//!   dependent.
//! - No request outlives the configured timeout, so a walk never hangs.
//! Security posture: chain destinations are untrusted remote input; only the
//! authority under test is ever dereferenced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use serde::Serialize;
use url::Url;

use crate::error::ProbeError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default hop ceiling for a single chain walk.
pub const DEFAULT_MAX_HOPS: u32 = 16;
/// Default user agent for probe requests.
pub const DEFAULT_USER_AGENT: &str = "arksync-probe/0.1";

/// Configuration for the redirect walker.
///
/// # Invariants
/// - `timeout_ms` bounds every individual request in the chain.
/// - `max_hops` bounds fetched local hops; cycle detection alone cannot stop
///   a chain that keeps minting novel URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of local hops fetched after the seed.
    pub max_hops: u32,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_hops: DEFAULT_MAX_HOPS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Terminal disposition of one chain walk.
///
/// # Invariants
/// - Variants are stable for programmatic handling; `Cycle` indicates a
///   configuration defect while `Transport` indicates an infrastructure one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ChainOutcome {
    /// The chain ended, either without a redirect or by leaving the
    /// authority under test.
    Terminal,
    /// A local hop revisited an already-seen URL.
    Cycle,
    /// The hop ceiling was reached before the chain ended.
    HopLimit,
    /// A request failed at the transport level.
    Transport(String),
}

/// Result of walking one redirect chain.
///
/// # Invariants
/// - Immutable after return; owned solely by the caller.
/// - `elapsed_ms` is the measured latency of the response that decided the
///   outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Seed URL the walk started from.
    pub start_url: String,
    /// Final destination, when one was reached.
    pub final_url: Option<String>,
    /// Status of the deciding response.
    pub status_code: Option<u16>,
    /// Latency of the deciding response in milliseconds.
    pub elapsed_ms: u64,
    /// Seed plus every fetched local hop, in order.
    pub visited: Vec<String>,
    /// Terminal disposition.
    pub outcome: ChainOutcome,
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Hop-by-hop redirect chain walker.
#[derive(Debug, Clone)]
pub struct RedirectWalker {
    /// HTTP client with implicit redirects disabled.
    client: Client,
    /// Walk configuration.
    config: WalkerConfig,
}

/// Destination read from one response.
enum NextHop {
    /// The response carries no further redirect.
    End,
    /// The response redirects to the resolved URL.
    Hop(String),
    /// The response redirects somewhere unreadable.
    Invalid(String),
}

impl RedirectWalker {
    /// Creates a walker with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the HTTP client cannot be constructed.
    pub fn new(config: WalkerConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ProbeError::Client(err.to_string()))?;
        Ok(Self {
            client,
            config,
        })
    }

    /// Walks the redirect chain from `seed_url`.
    ///
    /// Destinations starting with any prefix in `local_prefixes` are fetched;
    /// the first destination outside that set ends the walk without being
    /// dereferenced. `headers` pass through to every hop.
    #[must_use]
    pub fn follow_chain(
        &self,
        seed_url: &str,
        headers: &BTreeMap<String, String>,
        local_prefixes: &[String],
    ) -> ChainReport {
        let mut visited = vec![seed_url.to_string()];
        let mut current = seed_url.to_string();
        let mut last_status: Option<u16> = None;
        let mut last_elapsed: u64 = 0;
        let mut hops: u32 = 0;

        loop {
            let started = Instant::now();
            let response = match self.send(&current, headers) {
                Ok(response) => response,
                Err(detail) => {
                    return ChainReport {
                        start_url: seed_url.to_string(),
                        final_url: (hops > 0).then(|| current.clone()),
                        status_code: last_status,
                        elapsed_ms: last_elapsed,
                        visited,
                        outcome: ChainOutcome::Transport(detail),
                    };
                }
            };
            let elapsed = millis_since(started);
            let status = response.status().as_u16();

            let next = match read_next_hop(&response, &current) {
                NextHop::End => {
                    return ChainReport {
                        start_url: seed_url.to_string(),
                        final_url: Some(current),
                        status_code: Some(status),
                        elapsed_ms: elapsed,
                        visited,
                        outcome: ChainOutcome::Terminal,
                    };
                }
                NextHop::Invalid(detail) => {
                    return ChainReport {
                        start_url: seed_url.to_string(),
                        final_url: None,
                        status_code: Some(status),
                        elapsed_ms: elapsed,
                        visited,
                        outcome: ChainOutcome::Transport(detail),
                    };
                }
                NextHop::Hop(next) => next,
            };

            if !is_local(&next, local_prefixes) {
                return ChainReport {
                    start_url: seed_url.to_string(),
                    final_url: Some(next),
                    status_code: Some(status),
                    elapsed_ms: elapsed,
                    visited,
                    outcome: ChainOutcome::Terminal,
                };
            }
            if visited.contains(&next) {
                return ChainReport {
                    start_url: seed_url.to_string(),
                    final_url: None,
                    status_code: Some(status),
                    elapsed_ms: elapsed,
                    visited,
                    outcome: ChainOutcome::Cycle,
                };
            }
            visited.push(next.clone());
            last_status = Some(status);
            last_elapsed = elapsed;
            hops += 1;
            if hops >= self.config.max_hops {
                return ChainReport {
                    start_url: seed_url.to_string(),
                    final_url: None,
                    status_code: Some(status),
                    elapsed_ms: elapsed,
                    visited,
                    outcome: ChainOutcome::HopLimit,
                };
            }
            current = next;
        }
    }

    /// Issues one GET with the caller's headers attached.
    fn send(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<Response, String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request.send().map_err(|err| err.to_string())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the redirect destination from a response, resolving relative
/// locations against the fetched URL.
fn read_next_hop(response: &Response, current: &str) -> NextHop {
    if !response.status().is_redirection() {
        return NextHop::End;
    }
    let Some(location) = response.headers().get(LOCATION) else {
        return NextHop::End;
    };
    let Ok(location) = location.to_str() else {
        return NextHop::Invalid("redirect location is not readable text".to_string());
    };
    match Url::parse(current).and_then(|base| base.join(location)) {
        Ok(resolved) => NextHop::Hop(resolved.to_string()),
        Err(err) => NextHop::Invalid(format!("redirect location unresolvable: {err}")),
    }
}

/// Returns true when the destination stays inside the authority under test.
fn is_local(url: &str, local_prefixes: &[String]) -> bool {
    local_prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
}

/// Milliseconds elapsed since `started`, saturating on overflow.
fn millis_since(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
