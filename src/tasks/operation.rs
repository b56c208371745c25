//! # Deferred operations.
//!
//! An [`Operation`] is the unit of work inside a [`TaskSpec`](crate::TaskSpec): a one-shot
//! closure that receives a [`CancellationToken`] and yields a future resolving to
//! `Result<T, TaskError>`. The closure is called exactly once, when the task starts.
//!
//! Two shapes are supported:
//! - [`Operation::new`] wraps an async closure. On timeout the future is dropped, so it
//!   stops at its next `.await`.
//! - [`Operation::blocking`] wraps a synchronous closure and runs it on Tokio's blocking
//!   pool. On timeout the thread keeps running until the closure returns or observes the
//!   token; its late result is discarded.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

type BoxedFn<T> = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Result<T, TaskError>> + Send>;

/// One-shot asynchronous unit of work producing a `T`.
pub struct Operation<T> {
    f: BoxedFn<T>,
}

impl<T: Send + 'static> Operation<T> {
    /// Wraps an async closure.
    ///
    /// ## Example
    /// ```rust
    /// use gathervisor::{Operation, TaskError};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// let op = Operation::new(|_ctx: CancellationToken| async { Ok::<_, TaskError>(42) });
    /// # let _ = op;
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self {
            f: Box::new(move |ctx| f(ctx).boxed()),
        }
    }

    /// Wraps a blocking closure, executed via [`tokio::task::spawn_blocking`].
    ///
    /// The closure should poll `ctx.is_cancelled()` between expensive steps if it wants
    /// to stop early after a timeout. Nothing forces it to.
    pub fn blocking<F>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Result<T, TaskError> + Send + 'static,
    {
        Self::new(move |ctx| async move {
            match tokio::task::spawn_blocking(move || f(ctx)).await {
                Ok(res) => res,
                Err(join) if join.is_panic() => Err(TaskError::Panicked {
                    info: crate::core::panic_message(join.into_panic().as_ref()),
                }),
                Err(_) => Err(TaskError::Canceled),
            }
        })
    }

    /// Consumes the operation and returns its future.
    pub(crate) fn call(self, ctx: CancellationToken) -> BoxFuture<'static, Result<T, TaskError>> {
        (self.f)(ctx)
    }
}

impl<T> std::fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Operation { .. }")
    }
}
