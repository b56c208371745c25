//! # Callback-backed subscriber (`SinkFn`)
//!
//! [`SinkFn`] adapts a plain callback `F: Fn(&Heartbeat) -> Result<(), E>` into a
//! [`Subscribe`] implementation. The callback runs on the subscriber's own worker, so it
//! never runs inside a task. An `Err` from the callback is logged at `debug` and
//! otherwise ignored.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use gathervisor::{Heartbeat, SinkFn, Subscribe};
//!
//! let printer = SinkFn::arc("printer", |beat: &Heartbeat| {
//!     println!("[heartbeat] {beat}");
//!     Ok::<(), std::io::Error>(())
//! });
//! let subs: Vec<Arc<dyn Subscribe>> = vec![printer];
//! # let _ = subs;
//! ```

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Heartbeat;
use crate::subscribers::Subscribe;

/// Function-backed subscriber.
pub struct SinkFn<F> {
    name: &'static str,
    f: F,
}

impl<F> SinkFn<F> {
    /// Creates a new callback subscriber.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, E> Subscribe for SinkFn<F>
where
    F: Fn(&Heartbeat) -> Result<(), E> + Send + Sync + 'static,
    E: Display,
{
    async fn on_event(&self, beat: &Heartbeat) {
        if let Err(err) = (self.f)(beat) {
            tracing::debug!(subscriber = self.name, task = %beat.task, error = %err, "heartbeat sink failed");
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
