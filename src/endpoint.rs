//! HTTP endpoint for the rowing skill
//!
//! Endpoints:
//! - POST /skill    - voice-platform request envelope in, response envelope out
//! - GET /advisory  - current advisory and the reading behind it, as JSON
//! - GET /health    - service health check
//!
//! Requests are served one at a time from a single loop, all sharing one
//! `ReadingCache`.

use crate::advisory;
use crate::cache::{Clock, MeasureSource, ReadingCache};
use crate::skill::{self, RequestEnvelope};
use std::io::Read;
use thiserror::Error;
use tiny_http::Method;
use tracing::{debug, error, info, warn};

/// Skill envelopes are a few hundred bytes; anything near this is not one.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to start HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Routes one request to a status code and JSON body.
pub fn route<S: MeasureSource, C: Clock>(
    method: &Method,
    url: &str,
    body: &str,
    cache: &ReadingCache<S, C>,
) -> (u16, serde_json::Value) {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/health") => handle_health(cache),
        (Method::Get, "/advisory") => handle_advisory(cache),
        (Method::Post, "/skill") => handle_skill(body, cache),
        (_, "/health") | (_, "/advisory") | (_, "/skill") => (
            405,
            serde_json::json!({ "error": "Method not allowed", "path": path }),
        ),
        _ => (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["GET /health", "GET /advisory", "POST /skill"]
            }),
        ),
    }
}

/// Handle /health endpoint
fn handle_health<S: MeasureSource, C: Clock>(
    cache: &ReadingCache<S, C>,
) -> (u16, serde_json::Value) {
    (
        200,
        serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "cached_at": cache.cached_at(),
        }),
    )
}

/// Handle /advisory endpoint
fn handle_advisory<S: MeasureSource, C: Clock>(
    cache: &ReadingCache<S, C>,
) -> (u16, serde_json::Value) {
    match cache.get_reading() {
        Ok(reading) => {
            let advisory = advisory::classify(&reading);
            (
                200,
                serde_json::json!({
                    "tier": advisory.tier,
                    "message": advisory.message,
                    "reading": reading,
                }),
            )
        }
        Err(e) => (
            503,
            serde_json::json!({
                "error": e.to_string(),
                "speech": skill::FETCH_FAILED_SPEECH,
            }),
        ),
    }
}

/// Handle /skill endpoint
fn handle_skill<S: MeasureSource, C: Clock>(
    body: &str,
    cache: &ReadingCache<S, C>,
) -> (u16, serde_json::Value) {
    let envelope: RequestEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "rejecting malformed skill envelope");
            return (
                400,
                serde_json::json!({ "error": format!("Malformed request envelope: {}", e) }),
            );
        }
    };

    let response = skill::handle_envelope(&envelope, cache);
    match serde_json::to_value(&response) {
        Ok(json) => (200, json),
        Err(e) => {
            error!(error = %e, "failed to serialize skill response");
            (500, serde_json::json!({ "error": "Failed to serialize response" }))
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the given address, e.g. `0.0.0.0:8080`.
///
/// Blocks for the lifetime of the server.
pub fn start_endpoint_server<S: MeasureSource, C: Clock>(
    addr: &str,
    cache: &ReadingCache<S, C>,
) -> Result<(), EndpointError> {
    let server = tiny_http::Server::http(addr).map_err(|e| EndpointError::Bind {
        addr: addr.to_string(),
        message: e.to_string(),
    })?;

    info!(%addr, "HTTP endpoint listening");
    info!("   POST /skill     - voice skill requests");
    info!("   GET  /advisory  - current advisory as JSON");
    info!("   GET  /health    - service health check");

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let (status, json) = match read_body(request.as_reader()) {
            Ok(body) => route(&method, &url, &body, cache),
            Err(rejection) => rejection,
        };
        debug!(%method, %url, status, "handled request");

        if let Err(e) = request.respond(create_response(status, &json)) {
            error!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

/// Reads a request body of at most `MAX_BODY_BYTES`. Larger bodies get 413,
/// unreadable or non-UTF-8 ones 400.
fn read_body(reader: impl Read) -> Result<String, (u16, serde_json::Value)> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| {
            (
                400,
                serde_json::json!({ "error": format!("Unreadable request body: {}", e) }),
            )
        })?;

    if bytes.len() as u64 > MAX_BODY_BYTES {
        warn!(limit = MAX_BODY_BYTES, "rejecting oversized request body");
        return Err((
            413,
            serde_json::json!({ "error": "Request body too large", "limit_bytes": MAX_BODY_BYTES }),
        ));
    }

    String::from_utf8(bytes).map_err(|e| {
        (
            400,
            serde_json::json!({ "error": format!("Unreadable request body: {}", e) }),
        )
    })
}

/// Create HTTP response with JSON body
fn create_response(
    status_code: u16,
    json: &serde_json::Value,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string());

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
