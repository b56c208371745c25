//! Error types used by the supervisor and by supervised tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RunError`]: caller misuse detected before a parallel run starts.
//! - [`TaskError`]: the terminal failure of one supervised task.
//!
//! Both types provide `as_label` for logs/metrics. A [`TaskError`] never escapes
//! [`Supervisor::run_parallel`](crate::Supervisor::run_parallel): it is recorded in the
//! task's entry of the [`ResultMap`](crate::ResultMap) instead.

use std::time::Duration;
use thiserror::Error;

/// # Errors returned by a parallel run itself.
///
/// These are programming errors in the submitted task list. They are reported
/// before any task is launched, so no heartbeat is emitted for a rejected run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A task was submitted with a zero timeout.
    #[error("task {task:?} has a non-positive timeout ({timeout:?})")]
    InvalidTimeout {
        /// Name of the offending task.
        task: String,
        /// The rejected timeout.
        timeout: Duration,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use gathervisor::RunError;
    /// use std::time::Duration;
    ///
    /// let err = RunError::InvalidTimeout { task: "news".into(), timeout: Duration::ZERO };
    /// assert_eq!(err.as_label(), "run_invalid_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::InvalidTimeout { .. } => "run_invalid_timeout",
        }
    }
}

/// # Errors produced by task execution.
///
/// Every variant is terminal: a task is attempted exactly once.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task did not finish before its timeout elapsed.
    #[error("timeout after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The operation returned an error.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The operation panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The operation observed its cancellation token and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Wraps any displayable error as [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use gathervisor::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// True if the task was abandoned because its timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}
