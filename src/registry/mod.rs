//! Connection registry
//!
//! The single owner of every live connection record. Ingress handlers, the
//! command router and the heartbeat monitor all go through this type; the
//! underlying map is never handed out.
//!
//! Each record owns the only long-lived sender for its connection's outbound
//! queue. Removing a record drops that sender, which ends the socket writer
//! and closes the socket.

mod connection;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc;

pub use connection::{ConnectionHandle, ConnectionKey, Outbound};
use connection::Connection;

use crate::types::{RegistrationPolicy, RelayError, RelayResult, Role};

/// Default depth of each connection's outbound queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Outcome of a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Role the connection holds after the call
    pub role: Role,
    /// False when the policy kept an earlier role
    pub changed: bool,
}

/// Live connection counts per role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub phones: usize,
    pub controllers: usize,
    pub unknown: usize,
}

/// Result of one heartbeat sweep
#[derive(Debug, Default)]
pub struct Sweep {
    /// Connections removed for missing the previous probe
    pub evicted: Vec<ConnectionHandle>,
    /// Connections marked pending and due a fresh probe
    pub to_probe: Vec<ConnectionHandle>,
}

/// Thread-safe registry of live connections
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionKey, Connection>>,
    next_key: AtomicU64,
    policy: RegistrationPolicy,
    queue_capacity: usize,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(RegistrationPolicy::default(), DEFAULT_QUEUE_CAPACITY)
    }
}

impl ConnectionRegistry {
    pub fn new(policy: RegistrationPolicy, queue_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_key: AtomicU64::new(1),
            policy,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Record a freshly accepted connection with role `Unknown`.
    ///
    /// Returns the new key and the receiving end of its outbound queue, which
    /// the caller hands to the socket writer.
    pub fn accept(&self, id: Option<String>) -> (ConnectionKey, mpsc::Receiver<Outbound>) {
        let key = ConnectionKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        let id = id.unwrap_or_else(|| format!("conn-{}", key.0));
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        self.connections
            .write()
            .insert(key, Connection::new(key, id, tx));
        (key, rx)
    }

    /// Assign a role to a connection.
    ///
    /// `role` must be `Phone` or `Controller`; `Unknown` fails with
    /// `InvalidRole` and leaves the connection untouched. A `client_id`, if
    /// given, replaces the connection's log label.
    pub fn register(
        &self,
        key: ConnectionKey,
        role: Role,
        client_id: Option<String>,
    ) -> RelayResult<Registration> {
        if role == Role::Unknown {
            return Err(RelayError::InvalidRole(role.to_string()));
        }

        let mut connections = self.connections.write();
        let conn = connections
            .get_mut(&key)
            .ok_or_else(|| RelayError::UnknownConnection(key.to_string()))?;

        if self.policy == RegistrationPolicy::FirstWins && conn.role != Role::Unknown {
            return Ok(Registration {
                role: conn.role,
                changed: false,
            });
        }

        let changed = conn.role != role;
        conn.role = role;
        if let Some(id) = client_id.filter(|id| !id.is_empty()) {
            conn.id = id;
        }
        Ok(Registration { role, changed })
    }

    /// Remove a connection. Removing an absent key is a no-op.
    ///
    /// Returns whether a record was actually removed.
    pub fn remove(&self, key: ConnectionKey) -> bool {
        self.connections.write().remove(&key).is_some()
    }

    /// Consistent view of the open connections, optionally filtered by role
    pub fn snapshot(&self, filter: Option<Role>) -> Vec<ConnectionHandle> {
        let connections = self.connections.read();
        let mut handles: Vec<ConnectionHandle> = connections
            .values()
            .filter(|c| c.is_open())
            .filter(|c| filter.map_or(true, |role| c.role == role))
            .map(Connection::handle)
            .collect();
        handles.sort_by_key(|h| h.key);
        handles
    }

    /// Open connections counted per role
    pub fn counts(&self) -> RoleCounts {
        let connections = self.connections.read();
        let mut counts = RoleCounts::default();
        for conn in connections.values().filter(|c| c.is_open()) {
            match conn.role {
                Role::Phone => counts.phones += 1,
                Role::Controller => counts.controllers += 1,
                Role::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn get(&self, key: ConnectionKey) -> Option<ConnectionHandle> {
        self.connections.read().get(&key).map(Connection::handle)
    }

    pub fn contains(&self, key: ConnectionKey) -> bool {
        self.connections.read().contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }

    /// Record a probe answer. Unknown keys are ignored.
    pub fn mark_alive(&self, key: ConnectionKey) {
        if let Some(conn) = self.connections.read().get(&key) {
            conn.alive.store(true, Ordering::Release);
        }
    }

    /// One heartbeat step, done atomically under the write lock.
    ///
    /// Connections that did not answer since the last sweep are removed;
    /// every survivor is flagged as pending and returned for probing.
    pub fn sweep(&self) -> Sweep {
        let mut connections = self.connections.write();
        let mut sweep = Sweep::default();

        let dead: Vec<ConnectionKey> = connections
            .values()
            .filter(|c| !c.is_alive() || !c.is_open())
            .map(|c| c.key)
            .collect();

        for key in dead {
            if let Some(conn) = connections.remove(&key) {
                // Best effort; dropping the sender closes the socket anyway.
                let _ = conn.tx.try_send(Outbound::Close);
                sweep.evicted.push(conn.handle());
            }
        }

        for conn in connections.values() {
            conn.alive.store(false, Ordering::Release);
            sweep.to_probe.push(conn.handle());
        }
        sweep.evicted.sort_by_key(|h| h.key);
        sweep.to_probe.sort_by_key(|h| h.key);
        sweep
    }
}
