//! Wire protocol for the streaming entry
//!
//! One JSON object per WebSocket frame. Inbound frames are decoded once, at
//! the socket boundary, into [`Inbound`]; the rest of the relay never looks
//! at raw `type` strings.

mod client;
mod server;

pub use client::Inbound;
pub use server::ServerFrame;
