//! Retry delay policies.
//!
//! Used by the HTTP transport of the sources layer to space out retries of failed
//! requests. The supervisor itself never retries: one attempt per task per run.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization applied on top of the base delay
//!
//! ## Wiring
//! ```text
//! SourcesConfig { retries, backoff: BackoffPolicy, .. }
//!      └─► HttpClient::get_text
//!           for attempt in 0..=retries:
//!             GET ─ ok ─► return body
//!                 └ err ─► sleep(backoff.next(attempt)) ─► again
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=800ms, factor=2.0, max=10s, jitter=None.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
