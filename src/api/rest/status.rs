//! Status endpoint

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::api::state::{AppState, StatusSnapshot};

/// GET /status - Live phone/controller counts, last activity and server time
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusSnapshot> {
    Json(state.status())
}
