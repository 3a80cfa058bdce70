pub mod health;
pub mod metrics;

pub use health::{HealthResponse, HealthStatus, StatusServer, StatusState};
pub use metrics::{Metrics, MetricsSnapshot};
