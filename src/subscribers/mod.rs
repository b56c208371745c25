//! # Heartbeat subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and a few
//! built-in implementations. Heartbeats reach subscribers through the
//! [`Bus`](crate::events::Bus) listener started by the supervisor builder.
//!
//! ```text
//! run_one ── publish(Heartbeat) ──► Bus ──► listener ──► SubscriberSet
//!                                                          │
//!                                           ┌──────────────┼──────────────┐
//!                                           ▼              ▼              ▼
//!                                       LogWriter      Timeline        SinkFn / custom
//! ```
//!
//! A subscriber never runs inside a task and can never change a task's result.

mod embedded;
mod set;
mod subscriber;

pub use embedded::{LogWriter, SinkFn, Timeline};
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
