//! Runtime core: parallel runs and their outcomes.
//!
//! The public API from this module is [`Supervisor`] (with its builder and config) and the
//! result types [`Outcome`] / [`ResultMap`].
//!
//! Internal modules:
//! - [`runner`]: executes one task with timeout, panic capture and heartbeat publishing;
//! - [`supervisor`]: fans tasks out, collects outcomes, owns the bus and root token;
//! - [`builder`]: wires the bus, the heartbeat listener and the subscriber set;
//! - [`outcome`]: per-task outcome and the aggregated result map.

mod builder;
mod config;
mod outcome;
mod runner;
mod supervisor;

use std::any::Any;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use outcome::{Outcome, ResultMap};
pub use supervisor::Supervisor;

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
