//! Relay core: command fan-out and liveness tracking
//!
//! Both pieces work purely through the [`ConnectionRegistry`](crate::registry::ConnectionRegistry).

pub mod heartbeat;
pub mod router;

pub use heartbeat::{CycleReport, HeartbeatMonitor, DEFAULT_HEARTBEAT_INTERVAL};
pub use router::{CommandRouter, DEFAULT_SEND_TIMEOUT};
