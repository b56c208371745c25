//! Errors raised by the HTTP-backed sources.

use thiserror::Error;

/// # Errors produced while fetching or parsing a source.
///
/// Converted into [`TaskError::Fail`](crate::TaskError::Fail) at the task boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SourceError {
    /// The HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed on every attempt.
    #[error("GET {url} failed after {attempts} attempt(s): {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The response body was not what the source expected.
    #[error("unexpected {what} payload: {reason}")]
    Parse { what: &'static str, reason: String },

    /// The surrounding task was cancelled while waiting to retry.
    #[error("request cancelled")]
    Canceled,
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Client(_) => "source_client",
            SourceError::Exhausted { .. } => "source_exhausted",
            SourceError::Parse { .. } => "source_parse",
            SourceError::Canceled => "source_canceled",
        }
    }
}
