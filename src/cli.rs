use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::adapters::{FragmentApiClient, FragmentSource};
use crate::config::AppConfig;
use crate::error::{RefresherError, Result};
use crate::page::Document;
use crate::refresh::Refresher;
use crate::services::Metrics;
use crate::widget::WidgetId;

#[derive(Parser)]
#[command(name = "refresher")]
#[command(version = "0.1.0")]
#[command(about = "Periodic widget fragment refresher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Override the fragment server base URL
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Override the refresh interval in milliseconds
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Override the status server port
    #[arg(long)]
    pub status_port: Option<u16>,

    /// Widget tokens to refresh, comma-separated (overrides page.widgets)
    #[arg(short, long, value_delimiter = ',')]
    pub widgets: Option<Vec<String>>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the refresh daemon
    Run,
    /// Fetch a single widget fragment and print the payload
    Fetch {
        /// Widget token (the `<id>` part of `widget-<id>`)
        id: String,
    },
    /// Run one refresh cycle and print the rendered page
    Render,
    /// Validate the configuration and exit
    Check,
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.refresh.interval_ms = interval_ms;
    }
    if let Some(port) = cli.status_port {
        config.status_port = Some(port);
    }
    if let Some(widgets) = &cli.widgets {
        config.page.widgets = widgets.clone();
    }
}

/// Fetch one widget fragment and print the payload as JSON
pub async fn fetch_widget(client: &FragmentApiClient, token: &str) -> Result<()> {
    let id: WidgetId = token.parse()?;
    let payload = client.fetch_fragment(&id).await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Run one refresh cycle against a fresh page skeleton and print the rendered
/// page
pub async fn render_page(config: &AppConfig) -> Result<()> {
    let client = FragmentApiClient::new(
        &config.server.base_url,
        Duration::from_millis(config.server.request_timeout_ms),
    )?;
    let page = Arc::new(RwLock::new(Document::with_widgets(&config.widget_ids())));
    let refresher = Refresher::new(
        Arc::new(client),
        Arc::clone(&page),
        Arc::new(Metrics::new()),
        config.refresh.sanitize,
    );

    refresher.refresh_all().await;
    println!("{}", page.read().await.render());
    Ok(())
}

/// Validate the configuration, printing every violation
pub fn check_config(config: &AppConfig) -> Result<()> {
    match config.validate() {
        Ok(()) => {
            println!("configuration OK");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("configuration error: {}", error);
            }
            Err(RefresherError::Internal(format!(
                "{} configuration error(s)",
                errors.len()
            )))
        }
    }
}
