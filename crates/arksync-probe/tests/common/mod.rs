// crates/arksync-probe/tests/common/mod.rs
// ============================================================================
// Module: Probe Test Fixtures
// Description: Local HTTP servers issuing scripted redirect chains.
// Purpose: Exercise the walker against real sockets without external hosts.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! Spawns throwaway `tiny_http` servers whose responses are scripted per
//! request path, so walker tests can assemble redirect chains, cycles, and
//! terminal answers on loopback. Servers drain requests until a short idle
//! timeout and then exit, so joining the handle never hangs.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Fixtures are shared across test binaries with different usage."
)]

use std::thread;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Idle window after which a scripted server stops serving.
const SERVER_IDLE: Duration = Duration::from_millis(500);

/// Spawns a scripted server; `respond` maps a request path and the server's
/// base URL to a status code and optional `Location` header.
pub fn spawn_server<F>(respond: F) -> (String, thread::JoinHandle<()>)
where
    F: Fn(&str, &str) -> (u16, Option<String>) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base = format!("http://{addr}");
    let base_for_thread = base.clone();

    let handle = thread::spawn(move || {
        while let Ok(Some(request)) = server.recv_timeout(SERVER_IDLE) {
            let (status, location) = respond(request.url(), &base_for_thread);
            let mut response = Response::from_string("").with_status_code(status);
            if let Some(location) = location {
                response = response.with_header(
                    Header::from_bytes(&b"Location"[..], location.as_bytes()).unwrap(),
                );
            }
            let _ = request.respond(response);
        }
    });

    (base, handle)
}

/// Reserves a loopback port with nothing listening on it.
pub fn closed_port_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
