// crates/arksync-sources/tests/common/mod.rs
// ============================================================================
// Module: Source Test Fixtures
// Description: One-shot local HTTP servers and payload builders.
// Purpose: Exercise source adapters against real sockets and files.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! Spawns one-shot `tiny_http` servers answering a fixed body and status,
//! plus builders for registry batch payload text.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Fixtures are shared across test binaries with different usage."
)]

use std::thread;
use std::time::Duration;

use tiny_http::Response;
use tiny_http::Server;

/// Spawns a server answering every request with the given body and status
/// until a short idle timeout.
pub fn spawn_server(body: String, status: u16) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        while let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(500)) {
            let response = Response::from_string(body.clone()).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (url, handle)
}

/// Builds a minimal registry payload with one prefix record.
pub fn registry_payload(updated: &str, what: &str) -> String {
    format!(
        r#"{{
  "metadata": {{ "updated": "{updated}" }},
  "data": [
    {{
      "rtype": "PublicNAAN",
      "what": "{what}",
      "target": {{ "url": "https://example.org/{what}", "http_code": 302 }}
    }}
  ]
}}"#
    )
}
