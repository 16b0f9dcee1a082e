//! HTTP client for the feed backend.

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;

use crate::config::{Config, EndpointsConfig};
use crate::item::BucketKind;

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: EndpointsConfig,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, endpoints: EndpointsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            endpoints,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.effective_base_url();
        if base_url.is_empty() {
            bail!("base_url or BYTE_BASE_URL is required");
        }
        Ok(Self::new(base_url, config.endpoints.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoints(&self) -> &EndpointsConfig {
        &self.endpoints
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Fetches the raw body of a bucket's read endpoint.
    ///
    /// Non-2xx statuses are errors.
    pub async fn fetch_bucket(&self, kind: BucketKind) -> Result<Bytes> {
        let url = self.url(self.endpoints.for_bucket(kind));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", kind.label()))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "{} request failed with status {}: {}",
                kind.label(),
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
        }

        response
            .bytes()
            .await
            .with_context(|| format!("Failed to read {} response body", kind.label()))
    }

    /// Posts the digest payload and returns the response status.
    ///
    /// Only transport errors are `Err`; status interpretation is the caller's.
    pub async fn send_digest<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<StatusCode, reqwest::Error> {
        let url = self.url(&self.endpoints.digest);
        let response = self.http.post(url).json(body).send().await?;
        Ok(response.status())
    }
}
