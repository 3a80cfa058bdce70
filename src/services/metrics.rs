use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Metrics collector for observability
pub struct Metrics {
    /// Refresh cycles started
    pub cycles: AtomicU64,
    /// Successful fetch-and-apply operations
    pub fetches_ok: AtomicU64,
    /// Failed fetch-and-apply operations
    pub fetches_failed: AtomicU64,
    /// Container ids that failed to parse during a scan
    pub parse_failures: AtomicU64,
    /// When the last cycle started
    last_cycle: RwLock<Option<DateTime<Utc>>>,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub fetches_ok: u64,
    pub fetches_failed: u64,
    pub parse_failures: u64,
    pub last_cycle: Option<DateTime<Utc>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            fetches_ok: AtomicU64::new(0),
            fetches_failed: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            last_cycle: RwLock::new(None),
        }
    }

    /// Record the start of a refresh cycle
    pub async fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        *self.last_cycle.write().await = Some(Utc::now());
    }

    pub fn inc_fetches_ok(&self) {
        self.fetches_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetches_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            fetches_ok: self.fetches_ok.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            last_cycle: *self.last_cycle.read().await,
        }
    }

    /// Export metrics in Prometheus format
    pub async fn prometheus(&self) -> String {
        let snapshot = self.snapshot().await;

        format!(
            r#"# HELP refresher_cycles_total Refresh cycles started
# TYPE refresher_cycles_total counter
refresher_cycles_total {}

# HELP refresher_fetches_ok_total Successful widget fetches
# TYPE refresher_fetches_ok_total counter
refresher_fetches_ok_total {}

# HELP refresher_fetches_failed_total Failed widget fetches
# TYPE refresher_fetches_failed_total counter
refresher_fetches_failed_total {}

# HELP refresher_parse_failures_total Container ids that failed to parse
# TYPE refresher_parse_failures_total counter
refresher_parse_failures_total {}
"#,
            snapshot.cycles,
            snapshot.fetches_ok,
            snapshot.fetches_failed,
            snapshot.parse_failures,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
