// crates/arksync-probe/tests/walker_chain.rs
// ============================================================================
// Module: Redirect Walker Tests
// Description: Chain traversal tests against scripted loopback servers.
// Purpose: Validate terminal, cycle, hop-limit, and transport outcomes.
// Dependencies: arksync-probe, tiny_http
// ============================================================================

//! ## Overview
//! Tests the redirect walker for:
//! - Happy path: no-redirect terminals and local-then-external exits
//! - Relative `Location` resolution and header pass-through
//! - Failure modes: cycles, hop-ceiling exhaustion, transport errors
//! - The external boundary: non-local destinations are never dereferenced

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

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use arksync_probe::ChainOutcome;
use arksync_probe::RedirectWalker;
use arksync_probe::WalkerConfig;
use tiny_http::Response;
use tiny_http::Server;

use crate::common::closed_port_base;
use crate::common::spawn_server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a walker with a short timeout suitable for loopback tests.
fn test_walker() -> RedirectWalker {
    RedirectWalker::new(WalkerConfig {
        timeout_ms: 5_000,
        ..WalkerConfig::default()
    })
    .unwrap()
}

/// Loopback locality set covering every 127.0.0.1 listener.
fn loopback_prefixes() -> Vec<String> {
    vec!["http://127.0.0.1".to_string()]
}

/// Empty header set.
fn no_headers() -> BTreeMap<String, String> {
    BTreeMap::new()
}

// ============================================================================
// SECTION: Terminal Outcomes
// ============================================================================

/// A seed whose response carries no redirect terminates at the seed itself.
#[test]
fn no_redirect_terminates_at_seed() {
    let (base, handle) = spawn_server(|_, _| (200, None));
    let seed = format!("{base}/landing");
    let report = test_walker().follow_chain(&seed, &no_headers(), &loopback_prefixes());
    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(report.final_url.as_deref(), Some(seed.as_str()));
    assert_eq!(report.status_code, Some(200));
    assert_eq!(report.visited, vec![seed]);
    handle.join().unwrap();
}

/// One local hop followed by an external destination exits without
/// dereferencing the external URL.
#[test]
fn local_hop_then_external_exit() {
    let (base, handle) = spawn_server(|path, base| match path {
        "/a" => (302, Some(format!("{base}/b"))),
        "/b" => (302, Some("https://external.example.org/landing".to_string())),
        _ => (404, None),
    });
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base.clone()]);
    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(
        report.final_url.as_deref(),
        Some("https://external.example.org/landing")
    );
    assert_eq!(report.status_code, Some(302));
    assert_eq!(report.visited, vec![seed, format!("{base}/b")]);
    handle.join().unwrap();
}

/// A seed that redirects straight off-authority exits with zero local hops.
#[test]
fn immediate_external_exit() {
    let (base, handle) = spawn_server(|_, _| {
        (301, Some("https://external.example.org/".to_string()))
    });
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base]);
    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(report.final_url.as_deref(), Some("https://external.example.org/"));
    assert_eq!(report.status_code, Some(301));
    assert_eq!(report.visited.len(), 1);
    handle.join().unwrap();
}

/// Relative locations resolve against the fetched URL.
#[test]
fn relative_location_resolves() {
    let (base, handle) = spawn_server(|path, _| match path {
        "/a" => (302, Some("/b".to_string())),
        "/b" => (200, None),
        _ => (404, None),
    });
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base.clone()]);
    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(report.final_url.as_deref(), Some(format!("{base}/b").as_str()));
    assert_eq!(report.status_code, Some(200));
    handle.join().unwrap();
}

/// A redirect status without a Location header terminates at the current URL.
#[test]
fn redirect_without_location_terminates() {
    let (base, handle) = spawn_server(|_, _| (302, None));
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base]);
    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(report.final_url.as_deref(), Some(seed.as_str()));
    assert_eq!(report.status_code, Some(302));
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Cycle Detection
// ============================================================================

/// A two-node local loop is reported as a cycle, never walked forever.
#[test]
fn two_node_loop_detected() {
    let (base, handle) = spawn_server(|path, base| match path {
        "/a" => (302, Some(format!("{base}/b"))),
        "/b" => (302, Some(format!("{base}/a"))),
        _ => (404, None),
    });
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base.clone()]);
    assert_eq!(report.outcome, ChainOutcome::Cycle);
    assert!(report.final_url.is_none());
    assert_eq!(report.visited, vec![seed, format!("{base}/b")]);
    handle.join().unwrap();
}

/// A self-redirecting seed is the smallest cycle.
#[test]
fn self_redirect_detected() {
    let (base, handle) = spawn_server(|_, base| (302, Some(format!("{base}/a"))));
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &vec![base]);
    assert_eq!(report.outcome, ChainOutcome::Cycle);
    assert_eq!(report.visited.len(), 1);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Hop Ceiling
// ============================================================================

/// A chain minting novel local URLs stops at the configured hop ceiling.
#[test]
fn novel_urls_hit_hop_ceiling() {
    let (base, handle) = spawn_server(|path, base| {
        let n: u32 = path.trim_start_matches("/hop").parse().unwrap_or(0);
        (302, Some(format!("{base}/hop{}", n + 1)))
    });
    let walker = RedirectWalker::new(WalkerConfig {
        timeout_ms: 5_000,
        max_hops: 3,
        ..WalkerConfig::default()
    })
    .unwrap();
    let seed = format!("{base}/hop0");
    let report = walker.follow_chain(&seed, &no_headers(), &vec![base]);
    assert_eq!(report.outcome, ChainOutcome::HopLimit);
    assert_eq!(report.visited.len(), 4);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Transport Failures
// ============================================================================

/// A failure on the first hop returns a partial report without a final URL.
#[test]
fn first_hop_transport_failure() {
    let seed = format!("{}/a", closed_port_base());
    let report = test_walker().follow_chain(&seed, &no_headers(), &loopback_prefixes());
    assert!(matches!(report.outcome, ChainOutcome::Transport(_)));
    assert!(report.final_url.is_none());
    assert!(report.status_code.is_none());
    assert_eq!(report.visited, vec![seed]);
}

/// A failure after a local hop keeps the partial chain state.
#[test]
fn mid_chain_transport_failure() {
    let dead = closed_port_base();
    let dead_url = format!("{dead}/x");
    let dead_for_route = dead_url.clone();
    let (base, handle) = spawn_server(move |_, _| (302, Some(dead_for_route.clone())));
    let seed = format!("{base}/a");
    let report = test_walker().follow_chain(&seed, &no_headers(), &loopback_prefixes());
    assert!(matches!(report.outcome, ChainOutcome::Transport(_)));
    assert_eq!(report.final_url.as_deref(), Some(dead_url.as_str()));
    assert_eq!(report.status_code, Some(302));
    assert_eq!(report.visited, vec![seed, dead_url]);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Header Pass-Through
// ============================================================================

/// Caller-supplied headers reach every hop.
#[test]
fn headers_reach_the_server() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let seed = format!("http://{addr}/a");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_thread = Arc::clone(&seen);

    let handle = thread::spawn(move || {
        if let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(2_000)) {
            for header in request.headers() {
                if header.field.equiv("x-probe-token") {
                    seen_in_thread.lock().unwrap().push(header.value.to_string());
                }
            }
            let _ = request.respond(Response::from_string("").with_status_code(200));
        }
    });

    let mut headers = BTreeMap::new();
    headers.insert("x-probe-token".to_string(), "chain-check".to_string());
    let report = test_walker().follow_chain(&seed, &headers, &loopback_prefixes());
    handle.join().unwrap();

    assert_eq!(report.outcome, ChainOutcome::Terminal);
    assert_eq!(seen.lock().unwrap().as_slice(), &["chain-check".to_string()]);
}
