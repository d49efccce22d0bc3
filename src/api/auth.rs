//! Shared-secret check for the one-shot command entry
//!
//! ## Usage
//! ```bash
//! AUTH_TOKEN=s3cret relay-server
//!
//! curl -X POST http://localhost:8080/cmd \
//!   -H "Content-Type: application/json" \
//!   -H "x-auth: s3cret" \
//!   -d '{"cmd":"senter_on"}'
//!
//! # or as a query parameter
//! curl -X POST "http://localhost:8080/cmd?token=s3cret" -d '{"cmd":"vibrate"}' \
//!   -H "Content-Type: application/json"
//! ```

use axum::http::HeaderMap;
use serde::Deserialize;

use crate::types::{RelayError, RelayResult};

/// Header carrying the shared secret
pub const AUTH_HEADER: &str = "x-auth";

/// Query parameters accepted by `POST /cmd`
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

/// Pick the presented token: the header wins over the query parameter
pub fn presented_token<'a>(headers: &'a HeaderMap, params: &'a TokenParams) -> Option<&'a str> {
    headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .or(params.token.as_deref())
}

/// Check the presented token against the configured secret.
///
/// With no secret configured every caller is allowed.
pub fn authorize(expected: Option<&str>, presented: Option<&str>) -> RelayResult<()> {
    match expected {
        None => Ok(()),
        Some(secret) if presented == Some(secret) => Ok(()),
        Some(_) => Err(RelayError::Unauthorized),
    }
}
