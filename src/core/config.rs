//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the settings a [`Supervisor`](crate::Supervisor) is built with.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::builder(config)`
//! 2. **TaskSpec defaults**: `TaskSpec::with_defaults(name, &config, op)`
//!
//! There is no concurrency limit: every task of a run is in flight at once.

use std::time::Duration;

/// Configuration for the supervisor.
///
/// ## Field semantics
/// - `bus_capacity`: ring buffer size for raw heartbeat receivers (min 1; clamped by Bus)
/// - `default_timeout`: timeout inherited by `TaskSpec::with_defaults` (must be `> 0`
///   to be accepted by a run)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Capacity of the broadcast ring behind `Supervisor::subscribe()`.
    ///
    /// A run publishes two heartbeats per task. Raw receivers that lag behind more than
    /// `bus_capacity` heartbeats skip the oldest ones. Subscribers registered on the
    /// builder are fed from a separate queue and never skip.
    pub bus_capacity: usize,

    /// Default per-task timeout.
    pub default_timeout: Duration,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `default_timeout = 30s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            default_timeout: Duration::from_secs(30),
        }
    }
}
