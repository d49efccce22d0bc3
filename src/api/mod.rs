//! API module for HTTP and WebSocket endpoints
//!
//! Both ingress paths share one [`AppState`](state::AppState) and converge on
//! the same registry and command router.

pub mod auth;
pub mod http;
pub mod rest;
pub mod state;
pub mod websocket;
