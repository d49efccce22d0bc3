//! REST API module for HTTP endpoints
//!
//! - `POST /cmd` - One-shot command submission
//! - `GET /status` - Connected client counts and last activity

pub mod command;
pub mod status;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::types::RelayError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    fn status_for(err: &RelayError) -> StatusCode {
        match err {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::MalformedFrame(_) | RelayError::InvalidRole(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&RelayError> for ApiError {
    fn from(err: &RelayError) -> Self {
        // Unauthorized bodies are exactly {ok:false, error:"Unauthorized"}
        let message = match err {
            RelayError::Unauthorized => None,
            other => Some(other.to_string()),
        };
        Self {
            ok: false,
            error: err.code().to_string(),
            message,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = ApiError::status_for(&self);
        (status, Json(ApiError::from(&self))).into_response()
    }
}
