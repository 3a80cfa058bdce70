//! Widget refresh engine.
//!
//! Scans the page for widget containers, parses each container's element id
//! into a typed [`WidgetId`] and fetches replacement content for every widget
//! concurrently. A failure for one widget is caught and logged, leaving its
//! current content untouched; it never affects any other widget or a later
//! cycle.

mod driver;
mod lifecycle;

pub use driver::RefreshDriver;
pub use lifecycle::{install_signal_handlers, Shutdown};

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::adapters::FragmentSource;
use crate::error::Result;
use crate::page::Document;
use crate::sanitize::sanitize_markup;
use crate::services::Metrics;
use crate::widget::WidgetId;

pub struct Refresher {
    source: Arc<dyn FragmentSource>,
    page: Arc<RwLock<Document>>,
    metrics: Arc<Metrics>,
    sanitize: bool,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn FragmentSource>,
        page: Arc<RwLock<Document>>,
        metrics: Arc<Metrics>,
        sanitize: bool,
    ) -> Self {
        Self {
            source,
            page,
            metrics,
            sanitize,
        }
    }

    pub fn page(&self) -> Arc<RwLock<Document>> {
        Arc::clone(&self.page)
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one refresh cycle to completion.
    ///
    /// Scans for containers, fetches all widgets concurrently and waits for
    /// every fetch of this cycle to settle. Returns the number of fetches
    /// scheduled. One-shot commands and tests use this; the daemon loop uses
    /// [`spawn_cycle`](Self::spawn_cycle) so cycles may overlap.
    pub async fn refresh_all(&self) -> usize {
        let mut tasks = JoinSet::new();
        let scheduled = self.spawn_cycle(&mut tasks).await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                if e.is_panic() {
                    tracing::error!(error = %e, "widget refresh task panicked");
                }
            }
        }
        scheduled
    }

    /// Schedule one cycle's fetches onto `tasks` without waiting for them.
    ///
    /// Containers whose element id does not parse are skipped with a
    /// diagnostic. Containers added to the page after the scan are picked up
    /// on the next cycle.
    pub(crate) async fn spawn_cycle(&self, tasks: &mut JoinSet<()>) -> usize {
        self.metrics.record_cycle().await;

        let element_ids = self.page.read().await.container_element_ids();

        let mut scheduled = 0;
        for element_id in element_ids {
            match WidgetId::from_element_id(&element_id) {
                Ok(id) => {
                    scheduled += 1;
                    let source = Arc::clone(&self.source);
                    let page = Arc::clone(&self.page);
                    let metrics = Arc::clone(&self.metrics);
                    let sanitize = self.sanitize;
                    tasks.spawn(async move {
                        fetch_and_apply(source, page, metrics, sanitize, id).await;
                    });
                }
                Err(e) => {
                    self.metrics.inc_parse_failures();
                    warn!(element_id = %element_id, error = %e, "skipping container with unparseable id");
                }
            }
        }

        debug!(scheduled, "refresh cycle scheduled");
        scheduled
    }
}

/// Fetch one widget's fragment and splice it into the page.
///
/// All failures (transport, status, body shape, missing container or slot)
/// collapse into one logged diagnostic tagged with the widget id; the
/// displayed content is left unmodified and the next cycle retries
/// independently.
async fn fetch_and_apply(
    source: Arc<dyn FragmentSource>,
    page: Arc<RwLock<Document>>,
    metrics: Arc<Metrics>,
    sanitize: bool,
    id: WidgetId,
) {
    match try_fetch_and_apply(source.as_ref(), &page, sanitize, &id).await {
        Ok(()) => {
            metrics.inc_fetches_ok();
            debug!(widget = %id, "widget content refreshed");
        }
        Err(e) => {
            metrics.inc_fetches_failed();
            warn!(widget = %id, error = %e, "widget refresh failed");
        }
    }
}

async fn try_fetch_and_apply(
    source: &dyn FragmentSource,
    page: &RwLock<Document>,
    sanitize: bool,
    id: &WidgetId,
) -> Result<()> {
    let payload = source.fetch_fragment(id).await?;

    let markup = if sanitize {
        sanitize_markup(&payload.content)
    } else {
        payload.content
    };

    page.write().await.replace_content(&id.element_id(), markup)
}
