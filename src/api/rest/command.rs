//! Command endpoint - One-shot command submission

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::api::auth::{authorize, presented_token, TokenParams};
use crate::api::state::AppState;
use crate::types::{normalize_meta, Command, RelayError};

/// Response for POST /cmd
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub ok: bool,
    #[serde(rename = "sentTo")]
    pub sent_to: usize,
}

/// POST /cmd - Broadcast a command to every connected phone
///
/// When a shared secret is configured it must arrive as the `x-auth` header
/// or the `token` query parameter; otherwise the request fails with 401 and
/// nothing is broadcast.
pub async fn submit_command(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TokenParams>,
    headers: HeaderMap,
    body: Result<Json<Command>, JsonRejection>,
) -> Result<Json<CommandResponse>, RelayError> {
    if let Err(e) = authorize(
        state.config.auth_token.as_deref(),
        presented_token(&headers, &params),
    ) {
        tracing::warn!(entry = "http", "Command rejected: bad or missing token");
        return Err(e);
    }

    let Json(mut command) = body.map_err(|e| RelayError::MalformedFrame(e.body_text()))?;
    command.meta = normalize_meta(command.meta);

    let sent_to = state.dispatch_command(&command).await;
    tracing::info!(cmd = %command.cmd, delivered = sent_to, entry = "http", "Command broadcast");

    Ok(Json(CommandResponse { ok: true, sent_to }))
}
