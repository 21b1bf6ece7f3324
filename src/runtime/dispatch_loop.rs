use std::time::Duration;

use tokio::sync::watch::Receiver;

use crate::broker::{DispatchReport, SharedBroker, lock};
use crate::utils::error::DispatchLoopError;

/// Running totals across every round a dispatch loop performed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopStats {
    pub rounds: u64,
    pub messages: usize,
    pub deliveries: usize,
    pub dropped: usize,
    pub failures: usize,
}

impl LoopStats {
    fn absorb(&mut self, report: &DispatchReport) {
        self.rounds += 1;
        self.messages += report.messages;
        self.deliveries += report.deliveries;
        self.dropped += report.dropped;
        self.failures += report.failures.len();
    }
}

/// Dispatch `broker` every `interval` until `shutdown_rx` fires.
///
/// One last round runs on shutdown so nothing published before the signal is
/// left in the queue. The lock is held for a whole round and released before
/// the next await. A zero `interval` is rejected before any round runs.
pub async fn run_dispatch_loop<P>(
    broker: SharedBroker<P>,
    interval: Duration,
    mut shutdown_rx: Receiver<()>,
) -> Result<LoopStats, DispatchLoopError> {
    if interval.is_zero() {
        return Err(DispatchLoopError::ZeroInterval);
    }

    let mut ticker = tokio::time::interval(interval);
    let mut stats = LoopStats::default();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = lock(&broker).dispatch();
                if report.messages > 0 {
                    tracing::debug!(
                        "Dispatch round delivered {} of {} messages.",
                        report.deliveries,
                        report.messages
                    );
                }
                stats.absorb(&report);
            }

            _ = shutdown_rx.changed() => {
                tracing::info!("Shutdown signal received. Dispatching before exit...");
                let report = lock(&broker).dispatch();
                stats.absorb(&report);
                tracing::info!(
                    "Final dispatch completed: {} messages, {} deliveries, {} failures.",
                    report.messages,
                    report.deliveries,
                    report.failures.len()
                );
                break;
            }
        }
    }

    Ok(stats)
}
