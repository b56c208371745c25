//! # Task specification for a parallel run.
//!
//! Defines [`TaskSpec`], the `(name, operation, timeout)` triple handed to
//! [`Supervisor::run_parallel`](crate::Supervisor::run_parallel).
//!
//! A spec can be created:
//! - **Explicitly** with [`TaskSpec::new`] / [`TaskSpec::blocking`]
//! - **From config** with [`TaskSpec::with_defaults`] (inherits the default timeout)
//! - **Fluently** with [`TaskSpec::builder`]
//!
//! ## Rules
//! - Names are opaque. Duplicates are accepted; the last one to finish wins in the result map.
//! - The timeout must be positive. A zero timeout is rejected by `run_parallel` before
//!   anything starts.
//! - A spec is consumed by exactly one run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{core::SupervisorConfig, error::TaskError, tasks::operation::Operation};

/// Specification for running one task under supervision.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use gathervisor::{TaskSpec, TaskError, SupervisorConfig};
///
/// let spec = TaskSpec::new("fast", Duration::from_secs(1), |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>("value")
/// });
/// assert_eq!(spec.name(), "fast");
///
/// let cfg = SupervisorConfig::default();
/// let spec2 = TaskSpec::with_defaults("slow", &cfg, |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>("later")
/// });
/// assert_eq!(spec2.timeout(), cfg.default_timeout);
/// ```
pub struct TaskSpec<T> {
    name: Arc<str>,
    timeout: Duration,
    op: Operation<T>,
}

impl<T: Send + 'static> TaskSpec<T> {
    /// Creates a task from an async closure.
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, timeout: Duration, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self::from_operation(name, timeout, Operation::new(f))
    }

    /// Creates a task from a blocking closure (see [`Operation::blocking`]).
    pub fn blocking<F>(name: impl Into<Arc<str>>, timeout: Duration, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Result<T, TaskError> + Send + 'static,
    {
        Self::from_operation(name, timeout, Operation::blocking(f))
    }

    /// Creates a task inheriting the timeout from config.
    pub fn with_defaults<F, Fut>(name: impl Into<Arc<str>>, cfg: &SupervisorConfig, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self::new(name, cfg.default_timeout, f)
    }

    /// Creates a task from an existing [`Operation`].
    pub fn from_operation(name: impl Into<Arc<str>>, timeout: Duration, op: Operation<T>) -> Self {
        Self {
            name: name.into(),
            timeout,
            op,
        }
    }
}

impl<T> TaskSpec<T> {
    /// Returns the task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns a new spec with updated timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn into_parts(self) -> (Arc<str>, Duration, Operation<T>) {
        (self.name, self.timeout, self.op)
    }
}

impl<T> std::fmt::Debug for TaskSpec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
