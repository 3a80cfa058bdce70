//! Status HTTP server for process supervision.
//!
//! Serves liveness and health probes, a Prometheus metrics endpoint and the
//! current rendered page. CORS is permissive so dashboards on other origins
//! can poll it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RefresherError;
use crate::page::Document;
use crate::services::Metrics;

/// Health status of the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Overall status response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub metrics: crate::services::MetricsSnapshot,
}

/// Shared state for the status server
pub struct StatusState {
    pub started_at: DateTime<Utc>,
    pub metrics: Arc<Metrics>,
    pub page: Arc<RwLock<Document>>,
    /// A last cycle older than this counts as stale
    pub staleness_threshold: Duration,
}

impl StatusState {
    /// The staleness threshold is twice the refresh interval: one missed
    /// cycle is tolerated, two are not.
    pub fn new(metrics: Arc<Metrics>, page: Arc<RwLock<Document>>, interval: Duration) -> Self {
        Self {
            started_at: Utc::now(),
            metrics,
            page,
            staleness_threshold: interval * 2,
        }
    }

    pub async fn get_health(&self) -> HealthResponse {
        let snapshot = self.metrics.snapshot().await;
        let now = Utc::now();

        let status = match snapshot.last_cycle {
            Some(last) => {
                let age = (now - last).to_std().unwrap_or(Duration::ZERO);
                if age <= self.staleness_threshold {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                }
            }
            None => HealthStatus::Unhealthy,
        };

        HealthResponse {
            status,
            timestamp: now,
            uptime_seconds: (now - self.started_at).num_seconds().max(0) as u64,
            metrics: snapshot,
        }
    }
}

/// Status server
pub struct StatusServer {
    state: Arc<StatusState>,
    port: u16,
}

impl StatusServer {
    pub fn new(state: Arc<StatusState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Serve until the process exits
    pub async fn run(&self) -> crate::error::Result<()> {
        let app = router(Arc::clone(&self.state));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting status server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| RefresherError::Internal(format!("status server error: {}", e)))?;

        Ok(())
    }
}

pub(crate) fn router(state: Arc<StatusState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/page", get(page_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Full health check endpoint
async fn health_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    let health = state.get_health().await;
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

/// Liveness probe - is the process alive?
async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    state.metrics.prometheus().await
}

/// Current rendered page markup
async fn page_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    Html(state.page.read().await.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetId;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> Arc<StatusState> {
        let page = Document::with_widgets(&[WidgetId::new("7").unwrap()]);
        Arc::new(StatusState::new(
            Arc::new(Metrics::new()),
            Arc::new(RwLock::new(page)),
            Duration::from_secs(30),
        ))
    }

    #[tokio::test]
    async fn liveness_always_ok() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_unhealthy_before_first_cycle() {
        let state = test_state();
        let response = router(Arc::clone(&state))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.metrics.record_cycle().await;
        let response = router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn page_endpoint_returns_rendered_markup() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let markup = String::from_utf8(body.to_vec()).unwrap();
        assert!(markup.contains("id=\"widget-7\""));
    }

    #[tokio::test]
    async fn metrics_endpoint_is_prometheus_text() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("refresher_cycles_total 0"));
    }
}
