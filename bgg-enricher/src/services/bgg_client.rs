//! BoardGameGeek XML API v2 client
//!
//! One authenticated GET of the thing endpoint per call, for any number of
//! IDs. The client never retries: rate-limit backoff and failure handling
//! belong to the batch enricher, which sees every response as either a body
//! or a typed [`GatewayError`].

use crate::error::{error_chain, GatewayError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;

const USER_AGENT: &str = concat!("bgg-enricher/", env!("CARGO_PKG_VERSION"));

/// Error bodies kept in [`GatewayError::Status`]; 5xx pages can be full HTML documents
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Detail endpoint seam used by the batch enricher
#[async_trait]
pub trait DetailGateway: Send + Sync {
    /// Fetch the raw XML body for `ids` in a single request
    async fn fetch_details(&self, ids: &[String]) -> Result<String, GatewayError>;
}

/// Build the thing endpoint URL: `{base}/thing?id=1,2,3&stats=1`
pub fn build_thing_url(base_url: &str, ids: &[String]) -> String {
    format!(
        "{}/thing?id={}&stats=1",
        base_url.trim_end_matches('/'),
        ids.join(",")
    )
}

/// First [`MAX_ERROR_BODY_CHARS`] characters of `body`, marked when cut
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}... [truncated]", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// reqwest-backed API client
pub struct BggApiClient {
    http_client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl BggApiClient {
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::Network(error_chain(&e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
        })
    }
}

#[async_trait]
impl DetailGateway for BggApiClient {
    async fn fetch_details(&self, ids: &[String]) -> Result<String, GatewayError> {
        let url = build_thing_url(&self.base_url, ids);

        tracing::debug!(url = %url, count = ids.len(), "Querying thing endpoint");

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer_token))
            .header(ACCEPT, "application/xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| GatewayError::Network(error_chain(&e)))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| GatewayError::Network(error_chain(&e)))
    }
}
