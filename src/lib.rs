//! # gathervisor
//!
//! **Gathervisor** runs a set of independent, individually timed async operations in
//! parallel and hands back one uniform result map, whatever happened to each of them.
//! On top of that core it ships a small company-report gatherer (fundamentals, news,
//! regulatory filings) and the `gather` CLI.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskSpec   │   │   TaskSpec   │   │   TaskSpec   │
//!     │ (name, op,   │   │ (name, op,   │   │ (name, op,   │
//!     │   timeout)   │   │   timeout)   │   │   timeout)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor::run_parallel                                         │
//! │  - validate (zero timeout → RunError, nothing started)            │
//! │  - JoinSet: one tokio task per TaskSpec, no concurrency cap       │
//! │  - collect outcomes in completion order into a ResultMap          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   run_one    │   │   run_one    │   │   run_one    │
//!     │ Start beat   │   │ Start beat   │   │ Start beat   │
//!     │ timeout(op)  │   │ timeout(op)  │   │ timeout(op)  │
//!     │ Done / Error │   │ Done / Error │   │ Done / Error │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus: dispatch queue (every beat) ──► heartbeat listener          │
//! │       broadcast ring (bus_capacity) ──► Supervisor::subscribe()   │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                        heartbeat listener ──► SubscriberSet
//!                                          ┌─────────┼─────────┐
//!                                          ▼         ▼         ▼
//!                                       LogWriter Timeline  SinkFn / custom
//! ```
//!
//! ### Lifecycle of one task
//! ```text
//! publish Start
//! timeout(task_timeout, catch_unwind(op(child_token)))
//!   ├─ Ok(Ok(v))      ─► publish Done        ─► Outcome { Ok(v) }
//!   ├─ Ok(Err(e))     ─► publish Error(e)    ─► Outcome { Err(e) }
//!   ├─ panic          ─► publish Error       ─► Outcome { Err(Panicked) }
//!   └─ elapsed        ─► cancel child token, drop future
//!                        publish Error       ─► Outcome { Err(Timeout) }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Supervision**   | Parallel runs with per-task timeouts.                         | [`Supervisor`], [`ResultMap`]           |
//! | **Tasks**         | One-shot async or blocking operations.                        | [`TaskSpec`], [`Operation`]             |
//! | **Heartbeats**    | Start / done / error progress events.                         | [`Heartbeat`], [`Subscribe`]            |
//! | **Errors**        | Typed errors for run misuse and task failure.                 | [`RunError`], [`TaskError`]             |
//! | **Configuration** | Centralized runtime settings.                                 | [`SupervisorConfig`]                    |
//! | **Policies**      | Retry delays for the HTTP sources.                            | [`BackoffPolicy`], [`JitterPolicy`]     |
//!
//! ## Optional features
//! - `sources` (default): HTTP fetchers, the Ollama summarizer and the report gatherer.
//! - `cli` (default): the `gather` binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use gathervisor::{Subscribe, Supervisor, SupervisorConfig, TaskError, TaskSpec, Timeline};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let timeline = Arc::new(Timeline::new());
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .with_subscriber(timeline.clone() as Arc<dyn Subscribe>)
//!         .build();
//!
//!     let tasks = vec![
//!         TaskSpec::new("fast", Duration::from_secs(1), |_ctx: CancellationToken| async {
//!             Ok::<_, TaskError>(1)
//!         }),
//!         TaskSpec::new("slow", Duration::from_millis(50), |ctx: CancellationToken| async move {
//!             ctx.cancelled().await;
//!             Ok(2)
//!         }),
//!     ];
//!
//!     let results = sup.run_parallel(tasks).await?;
//!     assert_eq!(results.value("fast"), Some(&1));
//!     assert!(results.error("slow").unwrap().is_timeout());
//!
//!     sup.shutdown().await;
//!     assert_eq!(timeline.snapshot().len(), 4);
//!     Ok(())
//! }
//! ```

pub mod cluster;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod tasks;

#[cfg(feature = "sources")]
pub mod report;
#[cfg(feature = "sources")]
pub mod sources;
#[cfg(feature = "sources")]
pub mod summarize;

// ---- Public re-exports ----

pub use core::{Outcome, ResultMap, Supervisor, SupervisorBuilder, SupervisorConfig};
pub use error::{RunError, TaskError};
pub use events::{Heartbeat, HeartbeatKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{LogWriter, SinkFn, Subscribe, SubscriberSet, Timeline};
pub use tasks::{Operation, TaskSpec, TaskSpecBuilder};

#[cfg(feature = "sources")]
pub use report::{GatherOptions, Gatherer, Payload, Report};
