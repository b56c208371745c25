//! # Built-in subscribers
//!
//! Small, self-contained implementations that cover the common cases:
//!
//! - [`LogWriter`]: turns heartbeats into `tracing` events.
//! - [`Timeline`]: records every heartbeat for later inspection.
//! - [`SinkFn`]: adapts a plain callback into a subscriber.

mod log;
mod sink_fn;
mod timeline;

pub use log::LogWriter;
pub use sink_fn::SinkFn;
pub use timeline::Timeline;
