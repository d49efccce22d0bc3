//! Heartbeat monitor for dead-connection eviction

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::registry::{ConnectionRegistry, Outbound};
use crate::types::RelayError;

/// Default probe period
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Counts from one heartbeat cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub evicted: usize,
    pub probed: usize,
}

/// Periodically pings every connection and evicts the ones that stay silent.
///
/// A connection is evicted on the first cycle that finds it still pending
/// from the previous cycle's probe, so a dead peer is gone after one to two
/// periods.
pub struct HeartbeatMonitor {
    registry: Arc<ConnectionRegistry>,
    period: Duration,
}

impl HeartbeatMonitor {
    pub fn new(registry: Arc<ConnectionRegistry>, period: Duration) -> Self {
        Self { registry, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run a single evict-then-probe cycle
    pub fn run_cycle(&self) -> CycleReport {
        let sweep = self.registry.sweep();
        let mut report = CycleReport {
            evicted: sweep.evicted.len(),
            probed: 0,
        };

        for conn in &sweep.evicted {
            let err = RelayError::DeadPeer(conn.to_string());
            tracing::info!(conn = %conn, role = %conn.role, error = %err, "Evicted dead connection");
        }

        for conn in &sweep.to_probe {
            match conn.try_deliver(Outbound::Ping) {
                Ok(()) => report.probed += 1,
                Err(e) => {
                    tracing::warn!(conn = %conn, error = %e, "Probe failed, evicting connection");
                    if self.registry.remove(conn.key) {
                        report.evicted += 1;
                    }
                }
            }
        }

        report
    }

    /// Run cycles forever, one per period
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // consume first immediate tick

        loop {
            ticker.tick().await;
            let report = self.run_cycle();
            if report.evicted > 0 {
                tracing::info!(evicted = report.evicted, probed = report.probed, "Heartbeat cycle");
            } else {
                tracing::trace!(probed = report.probed, "Heartbeat cycle");
            }
        }
    }

    /// Start the monitor as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(period: Duration) -> (Arc<ConnectionRegistry>, HeartbeatMonitor) {
        let registry = Arc::new(ConnectionRegistry::default());
        let monitor = HeartbeatMonitor::new(Arc::clone(&registry), period);
        (registry, monitor)
    }

    #[test]
    fn test_cycle_probes_then_evicts_silent_connection() {
        let (registry, monitor) = monitor(DEFAULT_HEARTBEAT_INTERVAL);
        let (key, mut rx) = registry.accept(None);

        assert_eq!(monitor.run_cycle(), CycleReport { evicted: 0, probed: 1 });
        assert_eq!(rx.try_recv().unwrap(), Outbound::Ping);
        assert!(registry.contains(key));

        assert_eq!(monitor.run_cycle(), CycleReport { evicted: 1, probed: 0 });
        assert!(!registry.contains(key));
    }

    #[test]
    fn test_answering_connection_is_kept() {
        let (registry, monitor) = monitor(DEFAULT_HEARTBEAT_INTERVAL);
        let (key, _rx) = registry.accept(None);

        for _ in 0..5 {
            monitor.run_cycle();
            registry.mark_alive(key);
        }
        assert!(registry.contains(key));
    }

    #[test]
    fn test_full_queue_probe_evicts() {
        let registry = Arc::new(ConnectionRegistry::new(Default::default(), 1));
        let monitor = HeartbeatMonitor::new(Arc::clone(&registry), DEFAULT_HEARTBEAT_INTERVAL);
        let (key, _rx) = registry.accept(None);
        registry
            .get(key)
            .unwrap()
            .try_deliver(Outbound::Text("queued".into()))
            .unwrap();

        let report = monitor.run_cycle();
        assert_eq!(report, CycleReport { evicted: 1, probed: 0 });
        assert!(!registry.contains(key));
    }

    #[test]
    fn test_connection_removed_mid_cycle() {
        let (registry, monitor) = monitor(DEFAULT_HEARTBEAT_INTERVAL);
        let (key, _rx) = registry.accept(None);

        monitor.run_cycle();
        registry.remove(key);
        assert_eq!(monitor.run_cycle(), CycleReport::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_latency_between_one_and_two_periods() {
        let period = Duration::from_secs(30);
        let (registry, monitor) = monitor(period);
        let (key, _rx) = registry.accept(None);
        let task = monitor.spawn();

        tokio::time::sleep(period + Duration::from_secs(1)).await;
        assert!(registry.contains(key), "evicted before one full period");

        tokio::time::sleep(period).await;
        assert!(!registry.contains(key), "still present after two periods");

        task.abort();
    }
}
