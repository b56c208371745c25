//! # Retrying HTTP GET client.
//!
//! [`HttpClient`] wraps a [`reqwest::Client`] configured from [`SourcesConfig`] and adds a
//! bounded retry loop around GET requests.
//!
//! ## Retry loop
//! ```text
//! for attempt in 0..=retries:
//!   ├─ GET url (User-Agent, optional Accept)
//!   ├─ 2xx ─► return body
//!   └─ error / non-2xx:
//!        ├─ last attempt ─► SourceError::Exhausted
//!        └─ sleep(backoff.next(attempt)) or ctx.cancelled() ─► SourceError::Canceled
//! ```

use reqwest::header::{ACCEPT, USER_AGENT};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::{SourceError, SourcesConfig};

/// Shared HTTP transport for all sources. Cheap to clone.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    cfg: SourcesConfig,
}

impl HttpClient {
    /// Builds a client with the configured per-request timeout.
    pub fn new(cfg: SourcesConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self { client, cfg })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &SourcesConfig {
        &self.cfg
    }

    /// GET with the configured number of retries.
    pub async fn get_text(
        &self,
        url: &str,
        accept: Option<&str>,
        ctx: &CancellationToken,
    ) -> Result<String, SourceError> {
        self.get_text_with_retries(url, accept, self.cfg.retries, ctx)
            .await
    }

    /// GET with an explicit number of retries.
    pub async fn get_text_with_retries(
        &self,
        url: &str,
        accept: Option<&str>,
        retries: u32,
        ctx: &CancellationToken,
    ) -> Result<String, SourceError> {
        let mut attempt = 0u32;
        loop {
            let reason = match self.get_once(url, accept).await {
                Ok(body) => return Ok(body),
                Err(e) => e.to_string(),
            };

            if attempt >= retries {
                return Err(SourceError::Exhausted {
                    url: url.to_string(),
                    attempts: attempt + 1,
                    reason,
                });
            }

            let delay = self.cfg.backoff.next(attempt);
            tracing::debug!(url, attempt, ?delay, error = %reason, "retrying GET");

            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = ctx.cancelled() => return Err(SourceError::Canceled),
            }
            attempt += 1;
        }
    }

    /// GET and decode the body as JSON.
    pub async fn get_json(
        &self,
        url: &str,
        ctx: &CancellationToken,
    ) -> Result<serde_json::Value, SourceError> {
        let body = self.get_text(url, Some("application/json"), ctx).await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Parse {
            what: "json",
            reason: e.to_string(),
        })
    }

    async fn get_once(&self, url: &str, accept: Option<&str>) -> Result<String, reqwest::Error> {
        let mut req = self
            .client
            .get(url)
            .header(USER_AGENT, self.cfg.user_agent.as_str());
        if let Some(accept) = accept {
            req = req.header(ACCEPT, accept);
        }
        req.send().await?.error_for_status()?.text().await
    }
}
