//! # Heartbeats emitted by the supervisor for each task.
//!
//! A [`Heartbeat`] marks one moment in a task's life:
//! - [`HeartbeatKind::Start`]: the operation is about to run
//! - [`HeartbeatKind::Done`]: the operation produced a value in time
//! - [`HeartbeatKind::Error`]: the operation failed, panicked or timed out
//!
//! Every task gets exactly one `Start` followed by exactly one terminal beat.
//!
//! ## Ordering guarantees
//! Each heartbeat has a globally unique sequence number (`seq`) that increases monotonically.
//! Within one task `start.seq < terminal.seq`; across tasks there is no ordering.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use gathervisor::{Heartbeat, HeartbeatKind};
//!
//! let start = Heartbeat::start("news");
//! let beat = Heartbeat::error("news", Duration::from_millis(25), "boom");
//!
//! assert_eq!(beat.kind, HeartbeatKind::Error);
//! assert_eq!(&*beat.task, "news");
//! assert_eq!(beat.error.as_deref(), Some("boom"));
//! assert!(start.seq < beat.seq);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Global sequence counter for heartbeat ordering.
static HEARTBEAT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatKind {
    /// Task is starting.
    ///
    /// Sets: `task`, `at`, `seq`.
    Start,

    /// Task finished with a value before its timeout.
    ///
    /// Sets: `task`, `at`, `seq`, `elapsed`.
    Done,

    /// Task failed, panicked or exceeded its timeout.
    ///
    /// Sets: `task`, `at`, `seq`, `elapsed`, `error`.
    Error,
}

impl HeartbeatKind {
    /// Returns `true` for `Done` and `Error`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, HeartbeatKind::Start)
    }

    /// Short lowercase label, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            HeartbeatKind::Start => "start",
            HeartbeatKind::Done => "done",
            HeartbeatKind::Error => "error",
        }
    }
}

/// Lifecycle record for one task.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `elapsed`/`error`: set depending on the [`HeartbeatKind`]
#[derive(Clone, Debug, Serialize)]
pub struct Heartbeat {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    #[serde(serialize_with = "serialize_unix_secs")]
    pub at: SystemTime,
    /// Heartbeat classification.
    pub kind: HeartbeatKind,
    /// Name of the task.
    pub task: Arc<str>,
    /// Time between the task's start and this beat (terminal beats only).
    #[serde(serialize_with = "serialize_opt_secs")]
    pub elapsed: Option<Duration>,
    /// Failure description (`Error` beats only).
    pub error: Option<Arc<str>>,
}

impl Heartbeat {
    fn new(kind: HeartbeatKind, task: impl Into<Arc<str>>) -> Self {
        Self {
            seq: HEARTBEAT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: task.into(),
            elapsed: None,
            error: None,
        }
    }

    /// Creates a `Start` beat stamped now.
    pub fn start(task: impl Into<Arc<str>>) -> Self {
        Self::new(HeartbeatKind::Start, task)
    }

    /// Creates a `Done` beat carrying the elapsed time.
    pub fn done(task: impl Into<Arc<str>>, elapsed: Duration) -> Self {
        Self::new(HeartbeatKind::Done, task).with_elapsed(elapsed)
    }

    /// Creates an `Error` beat carrying the elapsed time and failure description.
    pub fn error(task: impl Into<Arc<str>>, elapsed: Duration, error: impl Into<Arc<str>>) -> Self {
        Self::new(HeartbeatKind::Error, task)
            .with_elapsed(elapsed)
            .with_error(error)
    }

    /// Attaches an elapsed duration.
    #[inline]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Attaches a failure description.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Seconds since the Unix epoch, `0.0` for clocks set before it.
    pub fn unix_secs(&self) -> f64 {
        unix_secs(self.at)
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] task={:?}", self.kind.as_str(), &*self.task)?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " elapsed={elapsed:?}")?;
        }
        if let Some(error) = self.error.as_deref() {
            write!(f, " err={error:?}")?;
        }
        Ok(())
    }
}

fn unix_secs(at: SystemTime) -> f64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn serialize_unix_secs<S: serde::Serializer>(at: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(unix_secs(*at))
}

fn serialize_opt_secs<S: serde::Serializer>(
    d: &Option<Duration>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&d.as_secs_f64()),
        None => s.serialize_none(),
    }
}
