//! Shared application state for both ingress paths

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::RelayConfig;
use crate::registry::ConnectionRegistry;
use crate::relay::{CommandRouter, HeartbeatMonitor};
use crate::types::Command;

/// Live client counts as reported by `GET /status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientCounts {
    pub phones: usize,
    pub controllers: usize,
}

/// Read-only status view, rebuilt on every query
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub ok: bool,
    pub clients: ClientCounts,
    #[serde(rename = "lastSeen")]
    pub last_seen: Option<String>,
    #[serde(rename = "serverTime")]
    pub server_time: String,
}

/// Everything a handler needs; cloned into axum as `Arc<AppState>`
pub struct AppState {
    pub config: RelayConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub router: CommandRouter,

    /// Last successful registration or broadcast
    last_seen: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(
            config.registration_policy,
            config.send_queue_capacity,
        ));
        let router = CommandRouter::new(Arc::clone(&registry), config.send_timeout);

        Self {
            config,
            registry,
            router,
            last_seen: Mutex::new(None),
        }
    }

    /// Heartbeat monitor bound to this state's registry
    pub fn heartbeat(&self) -> HeartbeatMonitor {
        HeartbeatMonitor::new(Arc::clone(&self.registry), self.config.heartbeat_interval)
    }

    /// Broadcast a command to all phones. Shared by both ingress paths.
    pub async fn dispatch_command(&self, command: &Command) -> usize {
        let delivered = self.router.broadcast(command).await;
        if delivered > 0 {
            self.touch();
        }
        delivered
    }

    /// Mark activity for the status view
    pub fn touch(&self) {
        *self.last_seen.lock() = Some(Utc::now());
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        *self.last_seen.lock()
    }

    pub fn status(&self) -> StatusSnapshot {
        let counts = self.registry.counts();
        StatusSnapshot {
            ok: true,
            clients: ClientCounts {
                phones: counts.phones,
                controllers: counts.controllers,
            },
            last_seen: self.last_seen().map(iso8601),
            server_time: iso8601(Utc::now()),
        }
    }
}

fn iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}
