//! End-to-end refresh cycles against an in-process fragment server.

use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use refresher::adapters::FragmentApiClient;
use refresher::page::Document;
use refresher::refresh::Refresher;
use refresher::services::Metrics;
use refresher::widget::WidgetId;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

async fn widget_handler(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        // always fails
        "3" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "boom"})),
        ),
        // wrong shape
        "9" => (StatusCode::OK, Json(json!({"markup": "no content field"}))),
        // hostile markup
        "unsafe" => (
            StatusCode::OK,
            Json(json!({"content": "<script>evil()</script><b>ok</b>"})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({"content": format!("<b>{id}</b>")})),
        ),
    }
}

async fn spawn_fragment_server() -> SocketAddr {
    let app = Router::new().route("/widget/:id", get(widget_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn ids(tokens: &[&str]) -> Vec<WidgetId> {
    tokens.iter().map(|t| WidgetId::new(t).unwrap()).collect()
}

fn build_refresher(
    base_url: &str,
    tokens: &[&str],
    sanitize: bool,
) -> (Refresher, Arc<RwLock<Document>>) {
    let client = FragmentApiClient::new(base_url, Duration::from_secs(5)).unwrap();
    let page = Arc::new(RwLock::new(Document::with_widgets(&ids(tokens))));
    let refresher = Refresher::new(
        Arc::new(client),
        Arc::clone(&page),
        Arc::new(Metrics::new()),
        sanitize,
    );
    (refresher, page)
}

#[tokio::test]
async fn refreshes_every_container() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["7", "42"], false);

    assert_eq!(refresher.refresh_all().await, 2);

    let page = page.read().await;
    assert_eq!(page.content_markup("widget-7").unwrap(), "<b>7</b>");
    assert_eq!(page.content_markup("widget-42").unwrap(), "<b>42</b>");

    let snapshot = refresher.metrics().snapshot().await;
    assert_eq!(snapshot.fetches_ok, 2);
    assert_eq!(snapshot.fetches_failed, 0);
}

#[tokio::test]
async fn server_error_leaves_existing_content() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["3"], false);

    page.write()
        .await
        .replace_content("widget-3", "before".to_string())
        .unwrap();

    refresher.refresh_all().await;

    assert_eq!(
        page.read().await.content_markup("widget-3").unwrap(),
        "before"
    );
    assert_eq!(refresher.metrics().snapshot().await.fetches_failed, 1);
}

#[tokio::test]
async fn one_failing_widget_does_not_block_the_others() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["7", "3"], false);

    refresher.refresh_all().await;

    let page = page.read().await;
    assert_eq!(page.content_markup("widget-7").unwrap(), "<b>7</b>");
    assert_eq!(page.content_markup("widget-3").unwrap(), "");
}

#[tokio::test]
async fn malformed_body_counts_as_failure() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["9"], false);

    refresher.refresh_all().await;

    assert_eq!(page.read().await.content_markup("widget-9").unwrap(), "");
    assert_eq!(refresher.metrics().snapshot().await.fetches_failed, 1);
}

#[tokio::test]
async fn hostile_markup_is_sanitized() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["unsafe"], true);

    refresher.refresh_all().await;

    assert_eq!(
        page.read().await.content_markup("widget-unsafe").unwrap(),
        "<b>ok</b>"
    );
}

#[tokio::test]
async fn repeated_cycles_leave_identical_content() {
    let addr = spawn_fragment_server().await;
    let (refresher, page) = build_refresher(&format!("http://{addr}"), &["7"], false);

    refresher.refresh_all().await;
    let first = page.read().await.content_markup("widget-7").unwrap();
    refresher.refresh_all().await;
    let second = page.read().await.content_markup("widget-7").unwrap();

    assert_eq!(first, "<b>7</b>");
    assert_eq!(first, second);
}

#[tokio::test]
async fn unreachable_server_only_logs_a_failure() {
    // nothing listens on this port
    let (refresher, page) = build_refresher("http://127.0.0.1:9", &["7"], false);

    assert_eq!(refresher.refresh_all().await, 1);

    assert_eq!(page.read().await.content_markup("widget-7").unwrap(), "");
    assert_eq!(refresher.metrics().snapshot().await.fetches_failed, 1);
}
