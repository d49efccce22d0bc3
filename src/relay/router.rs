//! Command fan-out to phones

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::protocol::ServerFrame;
use crate::registry::ConnectionRegistry;
use crate::types::{Command, Role};

/// Default bound on a single per-connection delivery attempt
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Delivers commands to every open phone connection
pub struct CommandRouter {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
}

impl CommandRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// Broadcast `command` to all phones, returning how many accepted it.
    ///
    /// Deliveries run concurrently against a snapshot taken before any send,
    /// so the registry lock is never held across I/O. A phone whose delivery
    /// fails is evicted and simply not counted.
    pub async fn broadcast(&self, command: &Command) -> usize {
        let phones = self.registry.snapshot(Some(Role::Phone));
        if phones.is_empty() {
            tracing::debug!(cmd = %command.cmd, "No phones connected, dropping command");
            return 0;
        }

        let frame = match ServerFrame::command(command).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(cmd = %command.cmd, error = %e, "Failed to encode command frame");
                return 0;
            }
        };

        let results = join_all(
            phones
                .iter()
                .map(|phone| phone.deliver(frame.clone(), self.send_timeout)),
        )
        .await;

        let mut delivered = 0;
        for (phone, result) in phones.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(conn = %phone, error = %e, "Delivery failed, evicting connection");
                    self.registry.remove(phone.key);
                }
            }
        }
        delivered
    }
}
