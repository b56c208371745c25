//! # Heartbeat subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging heartbeat observers into the
//! supervisor (logging, progress display, metrics).
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber unbounded queue** (every heartbeat of a run is delivered)
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► [queue] ──► worker task ──► subscriber.on_event()
//!                             └─► panic caught → tracing::warn!
//! ```
//!
//! ## Rules
//! - A slow subscriber only affects its own queue, which grows until it catches up.
//! - Every published heartbeat reaches every subscriber; nothing is dropped on the way.
//! - Heartbeats are processed sequentially (FIFO) per subscriber, so a task's `Start`
//!   always reaches a subscriber before its terminal beat.
//! - Subscribers never block tasks or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use gathervisor::{Heartbeat, HeartbeatKind, Subscribe};
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, beat: &Heartbeat) {
//!         if beat.kind == HeartbeatKind::Error {
//!             // page someone, bump a counter, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Heartbeat;

/// Heartbeat observer.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally. A panic is caught, but the heartbeat is lost for this
///   subscriber.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single heartbeat.
    ///
    /// Called from a dedicated worker task, not in the task's context.
    async fn on_event(&self, beat: &Heartbeat);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
