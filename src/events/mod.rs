//! Heartbeats: data model and bus.
//!
//! ## Contents
//! - [`HeartbeatKind`], [`Heartbeat`] lifecycle classification and payload
//! - [`Bus`] lossless dispatch queue plus a `tokio::sync::broadcast` ring for raw receivers
//!
//! ## Quick reference
//! - **Publisher**: `core::runner::run_one` (one `Start` and one terminal beat per task).
//! - **Consumers**: the heartbeat listener spawned by `SupervisorBuilder::build`
//!   (fans out to `SubscriberSet`) and any receiver from `Supervisor::subscribe`.

mod bus;
mod heartbeat;

pub use bus::Bus;
pub use heartbeat::{Heartbeat, HeartbeatKind};
