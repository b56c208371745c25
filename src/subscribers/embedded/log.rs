//! # LogWriter: heartbeat logger
//!
//! A minimal subscriber that turns each [`Heartbeat`] into a `tracing` event
//! under the `gathervisor::heartbeat` target.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO gathervisor::heartbeat: task started task="news"
//! INFO gathervisor::heartbeat: task done task="fundamentals" elapsed_ms=812
//! WARN gathervisor::heartbeat: task failed task="filings" elapsed_ms=40001 error="timeout after 40s"
//! ```

use async_trait::async_trait;

use crate::events::{Heartbeat, HeartbeatKind};
use crate::subscribers::Subscribe;

/// Heartbeat logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, beat: &Heartbeat) {
        let task = &*beat.task;
        let elapsed_ms = beat.elapsed.map(|d| d.as_millis() as u64);
        match beat.kind {
            HeartbeatKind::Start => {
                tracing::info!(target: "gathervisor::heartbeat", seq = beat.seq, task, "task started");
            }
            HeartbeatKind::Done => {
                tracing::info!(
                    target: "gathervisor::heartbeat",
                    seq = beat.seq,
                    task,
                    elapsed_ms,
                    "task done"
                );
            }
            HeartbeatKind::Error => {
                tracing::warn!(
                    target: "gathervisor::heartbeat",
                    seq = beat.seq,
                    task,
                    elapsed_ms,
                    error = beat.error.as_deref().unwrap_or("unknown"),
                    "task failed"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
