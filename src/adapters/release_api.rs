//! Startup version self-check against a releases endpoint.
//!
//! One GET at startup, log-only outcome; the refresh loop never depends on
//! this call.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{RefresherError, Result};

const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ReleaseInfo {
    tag_name: String,
}

/// Client for a GitHub-style "latest release" endpoint
pub struct ReleaseApiClient {
    http: Client,
    check_url: String,
}

impl ReleaseApiClient {
    pub fn new(check_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("refresher/", env!("CARGO_PKG_VERSION")))
            .timeout(CHECK_TIMEOUT)
            .build()
            .map_err(|e| {
                RefresherError::Internal(format!("failed to build release HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            check_url: check_url.to_string(),
        })
    }

    /// The latest release tag when it differs from this build, `None` when up
    /// to date
    pub async fn newer_release(&self) -> Result<Option<String>> {
        let response = self.http.get(&self.check_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefresherError::UnexpectedStatus {
                status,
                url: self.check_url.clone(),
            });
        }

        let body = response.text().await?;
        let info: ReleaseInfo = serde_json::from_str(&body)?;

        let current = env!("CARGO_PKG_VERSION");
        let latest = info.tag_name.trim_start_matches('v');
        if latest != current {
            Ok(Some(info.tag_name))
        } else {
            Ok(None)
        }
    }
}

/// Run the version check once and log the outcome.
pub async fn check_for_update(check_url: &str) {
    let outcome = match ReleaseApiClient::new(check_url) {
        Ok(client) => client.newer_release().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(Some(tag)) => warn!(%tag, "a newer refresher release is available"),
        Ok(None) => info!("refresher is up to date"),
        Err(e) => info!(error = %e, "update check failed"),
    }
}
