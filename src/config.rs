use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::widget::WidgetId;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub update: UpdateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Status server port (disabled when unset)
    #[serde(default)]
    pub status_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the fragment server
    pub base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Interval between refresh cycles in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Filter fetched markup through the allowlist sanitizer
    #[serde(default = "default_sanitize")]
    pub sanitize: bool,
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_sanitize() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            sanitize: default_sanitize(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageConfig {
    /// Widget tokens the daemon builds its page skeleton from
    #[serde(default)]
    pub widgets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateConfig {
    /// Releases endpoint for the startup version check (disabled when unset)
    #[serde(default)]
    pub check_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Also write logs to this file
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("server.base_url", "http://127.0.0.1:5000")?
            .set_default("server.request_timeout_ms", 10_000)?
            .set_default("refresh.interval_ms", 30_000)?
            .set_default("refresh.sanitize", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g. config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("REFRESHER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (REFRESHER_SERVER__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("REFRESHER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config(base_url: &str) -> Self {
        Self {
            server: ServerConfig {
                base_url: base_url.to_string(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            refresh: RefreshConfig::default(),
            page: PageConfig::default(),
            update: UpdateConfig::default(),
            logging: LoggingConfig::default(),
            status_port: None,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match Url::parse(&self.server.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "server.base_url must use http or https, got `{}`",
                url.scheme()
            )),
            Err(e) => errors.push(format!("server.base_url is not a valid URL: {e}")),
        }

        if self.refresh.interval_ms == 0 {
            errors.push("refresh.interval_ms must be positive".to_string());
        }

        if self.server.request_timeout_ms == 0 {
            errors.push("server.request_timeout_ms must be positive".to_string());
        }

        for token in &self.page.widgets {
            if let Err(e) = WidgetId::new(token) {
                errors.push(format!("page.widgets entry is invalid: {e}"));
            }
        }

        if let Some(url) = &self.update.check_url {
            if let Err(e) = Url::parse(url) {
                errors.push(format!("update.check_url is not a valid URL: {e}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Parsed widget ids from `page.widgets`; call `validate` first
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.page
            .widgets
            .iter()
            .filter_map(|token| WidgetId::new(token).ok())
            .collect()
    }
}
