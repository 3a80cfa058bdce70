use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::Refresher;

/// Scheduling driver: one refresh cycle immediately, then one per interval,
/// until shutdown.
///
/// Per-widget fetch tasks are supervised in a [`JoinSet`]; panics are reaped
/// and logged, tasks from consecutive cycles may overlap (the later-arriving
/// response wins the content region), and teardown aborts whatever is still
/// in flight.
pub struct RefreshDriver {
    refresher: Arc<Refresher>,
    interval: Duration,
}

impl RefreshDriver {
    pub fn new(refresher: Arc<Refresher>, interval: Duration) -> Self {
        Self {
            refresher,
            interval,
        }
    }

    /// Run until `shutdown` observes a request
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut tasks: JoinSet<()> = JoinSet::new();

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "refresh driver started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let scheduled = self.refresher.spawn_cycle(&mut tasks).await;
                    debug!(scheduled, in_flight = tasks.len(), "refresh cycle started");
                }
                Some(result) = tasks.join_next() => {
                    if let Err(e) = result {
                        if e.is_panic() {
                            error!(error = %e, "widget refresh task panicked");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let in_flight = tasks.len();
        tasks.shutdown().await;
        if in_flight > 0 {
            info!(aborted = in_flight, "cancelled in-flight widget fetches");
        }
        info!("refresh driver stopped");
    }
}
