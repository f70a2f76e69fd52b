//! Ingest authentication.
//!
//! Stations authenticate with an `X-API-Key` header. When no key is
//! configured any non-empty key is accepted, which keeps first-time setup
//! working before a key has been provisioned.

use axum::http::HeaderMap;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Check the ingest key. The error string is the 401 response message; it
/// deliberately says nothing about the configured key.
pub fn verify_ingest_key(headers: &HeaderMap, configured: Option<&str>) -> Result<(), &'static str> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    match (provided, configured) {
        (None, _) => Err("X-API-Key header required"),
        (Some(key), Some(expected)) if key != expected => Err("invalid API key"),
        _ => Ok(()),
    }
}
