use clap::Parser;
use refresher::adapters::{check_for_update, FragmentApiClient};
use refresher::cli::{self, Cli, Commands};
use refresher::config::{AppConfig, LoggingConfig};
use refresher::error::{RefresherError, Result};
use refresher::page::Document;
use refresher::refresh::{install_signal_handlers, RefreshDriver, Refresher, Shutdown};
use refresher::services::{Metrics, StatusServer, StatusState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    cli::apply_overrides(&mut config, &cli);

    match &cli.command {
        Some(Commands::Fetch { id }) => {
            init_logging_simple();
            let client =
                FragmentApiClient::new(&config.server.base_url, request_timeout(&config))?;
            cli::fetch_widget(&client, id).await?;
        }
        Some(Commands::Render) => {
            init_logging_simple();
            cli::render_page(&config).await?;
        }
        Some(Commands::Check) => {
            init_logging_simple();
            cli::check_config(&config)?;
        }
        Some(Commands::Run) | None => {
            let _guard = init_logging(&config.logging);
            run_daemon(config).await?;
        }
    }

    Ok(())
}

fn request_timeout(config: &AppConfig) -> Duration {
    Duration::from_millis(config.server.request_timeout_ms)
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("configuration error: {}", e);
        }
        return Err(RefresherError::Internal(
            "invalid configuration".to_string(),
        ));
    }

    let widget_ids = config.widget_ids();
    if widget_ids.is_empty() {
        warn!("no widgets configured; the page has nothing to refresh");
    }

    info!(
        base_url = %config.server.base_url,
        widgets = widget_ids.len(),
        interval_ms = config.refresh.interval_ms,
        "starting refresher v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Some(check_url) = config.update.check_url.clone() {
        tokio::spawn(async move { check_for_update(&check_url).await });
    }

    let client = FragmentApiClient::new(&config.server.base_url, request_timeout(&config))?;
    let page = Arc::new(RwLock::new(Document::with_widgets(&widget_ids)));
    let metrics = Arc::new(Metrics::new());

    if let Some(port) = config.status_port {
        let state = Arc::new(StatusState::new(
            Arc::clone(&metrics),
            Arc::clone(&page),
            config.refresh.interval(),
        ));
        let server = StatusServer::new(state, port);
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("status server failed: {}", e);
            }
        });
    }

    let refresher = Arc::new(Refresher::new(
        Arc::new(client),
        page,
        metrics,
        config.refresh.sanitize,
    ));
    let driver = RefreshDriver::new(refresher, config.refresh.interval());

    let shutdown = Arc::new(Shutdown::new());
    install_signal_handlers(Arc::clone(&shutdown));

    driver.run(shutdown.subscribe()).await;

    info!("refresher stopped");
    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},refresher=debug", config.level)));

    match &config.file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("refresher.log"));
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            if config.json {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(writer)
                    .init();
            }
            Some(guard)
        }
        None => {
            if config.json {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .init();
            }
            None
        }
    }
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
