//! # Task definitions.
//!
//! This module provides the task-related types:
//! - [`Operation`] - one-shot async (or blocking) unit of work receiving a cancellation token
//! - [`TaskSpec`] - `(name, operation, timeout)` triple consumed by a parallel run
//! - [`TaskSpecBuilder`] - fluent construction of a [`TaskSpec`]

mod operation;
mod spec;
mod spec_builder;

pub use operation::Operation;
pub use spec::TaskSpec;
pub use spec_builder::TaskSpecBuilder;
