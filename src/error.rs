use crate::widget::WidgetIdError;
use thiserror::Error;

/// Main error type for the refresher
#[derive(Error, Debug)]
pub enum RefresherError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    // Serialization errors
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Widget identifier errors
    #[error("Invalid widget identifier: {0}")]
    WidgetId(#[from] WidgetIdError),

    // Page lookup errors
    #[error("No widget container with element id `{element_id}`")]
    ContainerMissing { element_id: String },

    #[error("Container `{element_id}` has no content slot")]
    ContentSlotMissing { element_id: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for RefresherError
pub type Result<T> = std::result::Result<T, RefresherError>;
