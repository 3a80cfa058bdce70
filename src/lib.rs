pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod page;
pub mod refresh;
pub mod sanitize;
pub mod services;
pub mod widget;

pub use adapters::{FragmentApiClient, FragmentSource, ReleaseApiClient};
pub use config::AppConfig;
pub use error::{RefresherError, Result};
pub use page::{Document, Element, Node, CONTAINER_CLASS, CONTENT_SLOT_CLASS};
pub use refresh::{install_signal_handlers, RefreshDriver, Refresher, Shutdown};
pub use sanitize::sanitize_markup;
pub use services::{Metrics, MetricsSnapshot, StatusServer, StatusState};
pub use widget::{WidgetId, WidgetIdError, WidgetPayload};
