//! # Run a single task under its timeout.
//!
//! Executes one [`Operation`] with a timeout and publishes its heartbeats to [`Bus`].
//!
//! - **Execute once** with a child cancellation token
//! - **Apply timeout** (wraps execution in `tokio::time::timeout`)
//! - **Catch panics** so a misbehaving operation still reaches a terminal state
//! - **Publish heartbeats** for observability (start, then done or error)
//!
//! ## Heartbeat flow
//!
//! ```text
//! Success:
//!   publish Start → op() → Ok(v)          → publish Done
//!
//! Failure:
//!   publish Start → op() → Err(e)         → publish Error(e)
//!
//! Panic:
//!   publish Start → op() → panic caught   → publish Error(panicked: ..)
//!
//! Timeout:
//!   publish Start → timeout elapsed → cancel child, drop future
//!                                   → publish Error(timeout after ..)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** `Start` and **exactly one** terminal beat, in that order
//! - Never panics and never returns early: every failure becomes the returned `TaskError`
//! - Timeout cancellation is advisory: the child token is cancelled and the future is
//!   dropped, but work already handed to another thread (blocking operations) is not
//!   interrupted. Whatever it produces later is discarded.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{Outcome, panic_message},
    error::TaskError,
    events::{Bus, Heartbeat},
    tasks::Operation,
};

/// Runs `op` once under `timeout`, publishing heartbeats to `bus`.
///
/// ### Cancellation semantics
/// - The operation receives a **child** of `parent`; cancelling `parent` reaches it.
/// - On timeout the child token is cancelled. The parent is never affected.
pub(crate) async fn run_one<T: Send + 'static>(
    name: Arc<str>,
    op: Operation<T>,
    timeout: Duration,
    parent: &CancellationToken,
    bus: &Bus,
) -> (Arc<str>, Outcome<T>) {
    let child = parent.child_token();
    let started = Instant::now();
    bus.publish(Heartbeat::start(Arc::clone(&name)));

    let ctx = child.clone();
    let attempt = AssertUnwindSafe(async move { op.call(ctx).await }).catch_unwind();

    let result = match time::timeout(timeout, attempt).await {
        Ok(Ok(res)) => res,
        Ok(Err(panic)) => Err(TaskError::Panicked {
            info: panic_message(panic.as_ref()),
        }),
        Err(_elapsed) => {
            child.cancel();
            Err(TaskError::Timeout { timeout })
        }
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(_) => publish_done(bus, &name, elapsed),
        Err(e) => publish_error(bus, &name, elapsed, e),
    }
    (name, Outcome::new(result, elapsed))
}

/// Publishes `Done` heartbeat.
fn publish_done(bus: &Bus, name: &Arc<str>, elapsed: Duration) {
    bus.publish(Heartbeat::done(Arc::clone(name), elapsed));
}

/// Publishes `Error` heartbeat with error details.
fn publish_error(bus: &Bus, name: &Arc<str>, elapsed: Duration, err: &TaskError) {
    bus.publish(Heartbeat::error(Arc::clone(name), elapsed, err.to_string()));
}
