//! Command Relay
//!
//! A small real-time relay: controllers issue named commands ("senter_on",
//! "vibrate", ...) and the relay fans each one out to every connected phone.
//!
//! # Features
//!
//! - **Two ingress paths**: a persistent WebSocket channel and a one-shot `POST /cmd`
//! - **Role-based fan-out**: commands reach phone connections only
//! - **Heartbeat eviction**: silent peers are dropped within two probe periods
//! - **Optional shared secret** on the one-shot entry (`x-auth` or `?token=`)
//! - **Status endpoint**: live phone/controller counts and last activity
//!
//! # Modules
//!
//! - `types`: Roles, commands and the error taxonomy
//! - `protocol`: WebSocket frame encoding/decoding
//! - `registry`: Thread-safe connection registry
//! - `relay`: Command router and heartbeat monitor
//! - `api`: Axum routes for both ingress paths
//! - `config`: Environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use command_relay::{api, AppState, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> command_relay::RelayResult<()> {
//!     let config = RelayConfig::from_env()?;
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
//!     let state = Arc::new(AppState::new(config));
//!     api::http::serve(listener, state, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```

pub mod api;
pub mod config;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod types;

// Re-export commonly used items at crate root
pub use api::state::AppState;
pub use config::RelayConfig;
pub use protocol::{Inbound, ServerFrame};
pub use registry::{ConnectionHandle, ConnectionKey, ConnectionRegistry, Outbound};
pub use relay::{CommandRouter, HeartbeatMonitor};
pub use types::{Command, RegistrationPolicy, RelayError, RelayResult, Role};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
