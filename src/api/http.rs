//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::rest::{command, status};
use super::state::AppState;
use super::websocket::{root_handler, ws_handler};
use crate::types::RelayResult;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // WebSocket endpoints (root also serves the index page)
        .route("/", get(root_handler))
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // One-shot entry and status
        .route("/cmd", post(command::submit_command))
        .route("/status", get(status::get_status))
        // Client web files
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the relay on an already-bound listener until `shutdown` resolves.
///
/// Starts the heartbeat monitor alongside the HTTP server and stops it when
/// the server returns.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> RelayResult<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let heartbeat = state.heartbeat().spawn();
    let app = create_router(state);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    heartbeat.abort();
    result?;
    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::types::{Command, Role};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn state_with_token(token: Option<&str>) -> Arc<AppState> {
        let config = RelayConfig {
            auth_token: token.map(str::to_string),
            ..RelayConfig::default()
        };
        Arc::new(AppState::new(config))
    }

    fn post_cmd(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(state_with_token(None));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_cmd_without_secret_reaches_phone() {
        let state = state_with_token(None);
        let (ctl, _ctl_rx) = state.registry.accept(None);
        let (phone, mut phone_rx) = state.registry.accept(None);
        state.registry.register(ctl, Role::Controller, None).unwrap();
        state.registry.register(phone, Role::Phone, None).unwrap();

        let response = create_router(Arc::clone(&state))
            .oneshot(post_cmd("/cmd", r#"{"cmd":"senter_on"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true, "sentTo": 1}));

        let frame = match phone_rx.recv().await.unwrap() {
            crate::registry::Outbound::Text(text) => serde_json::from_str::<Value>(&text).unwrap(),
            other => panic!("unexpected frame {:?}", other),
        };
        assert_eq!(frame, json!({"type": "cmd", "cmd": "senter_on", "meta": null}));
    }

    #[tokio::test]
    async fn test_cmd_with_wrong_secret_is_rejected() {
        let state = state_with_token(Some("s3cret"));
        let (phone, mut phone_rx) = state.registry.accept(None);
        state.registry.register(phone, Role::Phone, None).unwrap();

        let mut request = post_cmd("/cmd", r#"{"cmd":"senter_on"}"#);
        request
            .headers_mut()
            .insert("x-auth", "wrong".parse().unwrap());

        let response = create_router(Arc::clone(&state)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({"ok": false, "error": "Unauthorized"}));
        assert!(phone_rx.try_recv().is_err());
        assert!(state.last_seen().is_none());
    }

    #[tokio::test]
    async fn test_cmd_with_secret_in_header_or_query() {
        let state = state_with_token(Some("s3cret"));
        let (phone, _rx) = state.registry.accept(None);
        state.registry.register(phone, Role::Phone, None).unwrap();

        let mut request = post_cmd("/cmd", r#"{"cmd":"vibrate"}"#);
        request
            .headers_mut()
            .insert("x-auth", "s3cret".parse().unwrap());
        let response = create_router(Arc::clone(&state)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = create_router(Arc::clone(&state))
            .oneshot(post_cmd("/cmd?token=s3cret", r#"{"cmd":"vibrate"}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"ok": true, "sentTo": 1}));
    }

    #[tokio::test]
    async fn test_cmd_with_missing_secret_is_rejected_before_body_parse() {
        let app = create_router(state_with_token(Some("s3cret")));
        let response = app.oneshot(post_cmd("/cmd", "garbage")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cmd_with_malformed_body() {
        let app = create_router(state_with_token(None));
        let response = app.oneshot(post_cmd("/cmd", r#"{"meta":1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "MalformedFrame");
    }

    #[tokio::test]
    async fn test_status_reports_counts_and_last_seen() {
        let state = state_with_token(None);
        let (phone, _rx) = state.registry.accept(None);
        state.registry.register(phone, Role::Phone, None).unwrap();
        state.dispatch_command(&Command::new("beep")).await;

        let response = create_router(Arc::clone(&state))
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["clients"], json!({"phones": 1, "controllers": 0}));
        assert!(body["lastSeen"].is_string());
        assert!(body["serverTime"].is_string());
    }

    #[tokio::test]
    async fn test_root_without_upgrade_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>relay</h1>").unwrap();
        std::fs::write(dir.path().join("phone.js"), "console.log('phone')").unwrap();

        let config = RelayConfig {
            static_dir: dir.path().to_path_buf(),
            ..RelayConfig::default()
        };
        let app = create_router(Arc::new(AppState::new(config)));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>relay</h1>");

        let response = app
            .oneshot(Request::builder().uri("/phone.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
