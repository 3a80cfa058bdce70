use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{RefresherError, Result};
use crate::widget::{WidgetId, WidgetPayload};

/// Source of widget fragment payloads.
///
/// The refresher only depends on this seam; the production implementation is
/// [`FragmentApiClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch_fragment(&self, id: &WidgetId) -> Result<WidgetPayload>;
}

/// REST client for the fragment server's `GET /widget/{id}` endpoint
#[derive(Clone)]
pub struct FragmentApiClient {
    http: Client,
    base_url: String,
}

impl FragmentApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let http = Client::builder()
            .user_agent(concat!("refresher/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                RefresherError::Internal(format!("failed to build fragment HTTP client: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn widget_url(&self, id: &WidgetId) -> String {
        // the token charset is validated at parse time, no escaping needed
        format!("{}/widget/{}", self.base_url, id.as_str())
    }
}

#[async_trait]
impl FragmentSource for FragmentApiClient {
    async fn fetch_fragment(&self, id: &WidgetId) -> Result<WidgetPayload> {
        let url = self.widget_url(id);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefresherError::UnexpectedStatus { status, url });
        }

        // decode from text so a malformed body is distinguishable from a
        // transport failure
        let body = response.text().await?;
        let payload: WidgetPayload = serde_json::from_str(&body)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_url_embeds_the_token() {
        let client =
            FragmentApiClient::new("http://localhost:5000", Duration::from_secs(10)).unwrap();
        let id = WidgetId::new("7").unwrap();
        assert_eq!(client.widget_url(&id), "http://localhost:5000/widget/7");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            FragmentApiClient::new("http://localhost:5000/", Duration::from_secs(10)).unwrap();
        let id = WidgetId::new("42").unwrap();
        assert_eq!(client.widget_url(&id), "http://localhost:5000/widget/42");
    }
}
