//! # Sources configuration.
//!
//! [`SourcesConfig`] is threaded into [`HttpClient`](super::HttpClient) at construction;
//! every fetcher built on that client shares it.

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// HTTP settings shared by all sources.
///
/// ## Field semantics
/// - `user_agent`: sent on every request (SEC EDGAR rejects anonymous clients)
/// - `http_timeout`: per-request timeout, independent of the task timeout
/// - `retries`: extra attempts after the first failed GET
/// - `backoff`: delay between attempts
#[derive(Clone, Debug)]
pub struct SourcesConfig {
    pub user_agent: String,
    pub http_timeout: Duration,
    pub retries: u32,
    pub backoff: BackoffPolicy,
}

impl Default for SourcesConfig {
    /// Default configuration:
    ///
    /// - `user_agent = "gathervisor/0.1 (contact: local dev)"`
    /// - `http_timeout = 20s`
    /// - `retries = 2`
    /// - `backoff = 800ms × 2^attempt`
    fn default() -> Self {
        Self {
            user_agent: "gathervisor/0.1 (contact: local dev)".to_string(),
            http_timeout: Duration::from_secs(20),
            retries: 2,
            backoff: BackoffPolicy::default(),
        }
    }
}
