//! Connection records and the handles lent out of the registry

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TrySendError};

use crate::types::{RelayError, RelayResult, Role};

/// Process-unique identity of one accepted connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionKey(pub(crate) u64);

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work item for a connection's socket writer
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A JSON text frame
    Text(String),
    /// Heartbeat probe
    Ping,
    /// Close the socket and stop writing
    Close,
}

/// A live connection as stored in the registry
pub(crate) struct Connection {
    pub(crate) key: ConnectionKey,
    pub(crate) id: String,
    pub(crate) role: Role,
    pub(crate) alive: AtomicBool,
    pub(crate) tx: mpsc::Sender<Outbound>,
    pub(crate) connected_at: DateTime<Utc>,
}

impl Connection {
    pub(crate) fn new(key: ConnectionKey, id: String, tx: mpsc::Sender<Outbound>) -> Self {
        Self {
            key,
            id,
            role: Role::Unknown,
            alive: AtomicBool::new(true),
            tx,
            connected_at: Utc::now(),
        }
    }

    /// Open means the socket writer still holds the receiving end
    pub(crate) fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn handle(&self) -> ConnectionHandle {
        ConnectionHandle {
            key: self.key,
            id: self.id.clone(),
            role: self.role,
            connected_at: self.connected_at,
            tx: self.tx.clone(),
        }
    }
}

/// Point-in-time view of a connection, valid for one operation.
///
/// Holding a handle does not keep the connection registered; delivery
/// through a handle whose connection has gone away fails with
/// `DeliveryFailure`.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub key: ConnectionKey,
    pub id: String,
    pub role: Role,
    pub connected_at: DateTime<Utc>,
    tx: mpsc::Sender<Outbound>,
}

impl ConnectionHandle {
    /// Queue a text frame, waiting at most `timeout` for queue space
    pub async fn deliver(&self, frame: String, timeout: Duration) -> RelayResult<()> {
        self.tx
            .send_timeout(Outbound::Text(frame), timeout)
            .await
            .map_err(|e| {
                let reason = match e {
                    SendTimeoutError::Timeout(_) => "send queue full",
                    SendTimeoutError::Closed(_) => "channel closed",
                };
                self.failure(reason)
            })
    }

    /// Queue a frame without waiting
    pub fn try_deliver(&self, frame: Outbound) -> RelayResult<()> {
        self.tx.try_send(frame).map_err(|e| {
            let reason = match e {
                TrySendError::Full(_) => "send queue full",
                TrySendError::Closed(_) => "channel closed",
            };
            self.failure(reason)
        })
    }

    fn failure(&self, reason: &str) -> RelayError {
        RelayError::DeliveryFailure {
            connection: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.id)
    }
}
