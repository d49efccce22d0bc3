//! WebSocket module for the streaming entry
//!
//! Phones and controllers connect on `/` or `/ws` and exchange one JSON
//! object per frame.
//!
//! ## Features
//! - Role registration with a `welcome` acknowledgment
//! - Commands from any connection are fanned out to every phone
//! - Ping/pong liveness tracking for the heartbeat monitor

pub mod handler;

pub use handler::{root_handler, ws_handler};
