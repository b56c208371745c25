//! # Supervisor: runs a set of independent tasks in parallel under per-task timeouts.
//!
//! The [`Supervisor`] owns the heartbeat bus, the heartbeat listener (which feeds the
//! [`SubscriberSet`](crate::SubscriberSet)), and a root cancellation token.
//!
//! ## Key responsibilities
//! - validate the submitted task list before anything starts
//! - spawn every task at once (no concurrency cap)
//! - collect each terminal [`Outcome`] into a [`ResultMap`] as tasks finish
//! - return only once every task is terminal (barrier)
//!
//! ## High-level architecture
//! ```text
//! Inputs to run_parallel():
//!   Vec<TaskSpec<T>> ──► validate (zero timeout → RunError, nothing started)
//!
//! Spawn:
//!   TaskSpec[0]  TaskSpec[1]  ...  TaskSpec[N-1]
//!       │            │                   │
//!       └──► JoinSet::spawn(run_one(name, op, timeout, root_token, bus))
//!                    └──► child CancellationToken = root_token.child_token()
//!
//! Heartbeat flow:
//!   run_one ── publish(Heartbeat) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                        └──► Supervisor::subscribe() receivers
//!
//! Collect:
//!   join_next_with_id() ──► ResultMap::insert(name, outcome)   (completion order)
//!   all joined          ──► return ResultMap
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use gathervisor::{Supervisor, SupervisorConfig, TaskError, TaskSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(SupervisorConfig::default()).build();
//!
//!     let tasks = vec![
//!         TaskSpec::new("fast", Duration::from_secs(1), |_ctx: CancellationToken| async {
//!             Ok::<_, TaskError>("v")
//!         }),
//!         TaskSpec::new("broken", Duration::from_secs(1), |_ctx: CancellationToken| async {
//!             Err(TaskError::fail("boom"))
//!         }),
//!     ];
//!
//!     let results = sup.run_parallel(tasks).await?;
//!     assert_eq!(results.value("fast"), Some(&"v"));
//!     assert_eq!(results.error("broken").unwrap().to_string(), "boom");
//!
//!     sup.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{builder::SupervisorBuilder, config::SupervisorConfig, runner::run_one};
use crate::core::{Outcome, ResultMap};
use crate::error::{RunError, TaskError};
use crate::events::{Bus, Heartbeat};
use crate::tasks::TaskSpec;

/// Runs independent tasks concurrently and aggregates their outcomes.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    root: CancellationToken,
    listener: JoinHandle<()>,
}

impl Supervisor {
    /// Creates a builder. `build()` must be called inside a Tokio runtime.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: SupervisorConfig,
        bus: Bus,
        root: CancellationToken,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            bus,
            root,
            listener,
        }
    }

    /// Returns the configuration this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Creates a raw receiver that observes heartbeats published after this call.
    ///
    /// Useful to follow progress while `run_parallel` is still waiting. Raw receivers
    /// share a ring of `bus_capacity` heartbeats and skip the oldest when they fall
    /// behind; register a [`Subscribe`](crate::Subscribe) on the builder to see every one.
    pub fn subscribe(&self) -> broadcast::Receiver<Heartbeat> {
        self.bus.subscribe()
    }

    /// Cancels the root token. Every running and future task observes a cancelled token.
    ///
    /// Cancellation is advisory: `run_parallel` still waits for each task to finish or
    /// time out.
    pub fn cancel(&self) {
        self.root.cancel();
    }

    /// Runs every task concurrently, each bounded by its own timeout.
    ///
    /// Returns once **all** tasks are terminal. Individual task failures, panics and
    /// timeouts are recorded in the returned map, never returned as errors.
    ///
    /// ### Errors
    /// [`RunError::InvalidTimeout`] if any task has a zero timeout. The check runs before
    /// any task is launched.
    pub async fn run_parallel<T: Send + 'static>(
        &self,
        tasks: Vec<TaskSpec<T>>,
    ) -> Result<ResultMap<T>, RunError> {
        validate(&tasks)?;

        let started = Instant::now();
        let mut set = JoinSet::new();
        let mut launched: HashMap<tokio::task::Id, (Arc<str>, Arc<AtomicBool>)> =
            HashMap::with_capacity(tasks.len());

        for spec in tasks {
            let (name, timeout, op) = spec.into_parts();
            let bus = self.bus.clone();
            let root = self.root.clone();
            let task_name = Arc::clone(&name);
            let polled = Arc::new(AtomicBool::new(false));
            let mark = Arc::clone(&polled);
            let handle = set.spawn(async move {
                mark.store(true, Ordering::Release);
                run_one(task_name, op, timeout, &root, &bus).await
            });
            launched.insert(handle.id(), (name, polled));
        }
        tracing::debug!(tasks = launched.len(), "parallel run started");

        let mut results = ResultMap::with_capacity(launched.len());
        while let Some(joined) = set.join_next_with_id().await {
            let (name, outcome) = match joined {
                Ok((_id, entry)) => entry,
                Err(err) => {
                    // run_one catches panics, so this only happens if the runtime aborted it.
                    let Some((name, polled)) = launched.get(&err.id()) else {
                        continue;
                    };
                    tracing::warn!(task = %name, error = %err, "task aborted before reaching a terminal state");
                    let started_beat = polled.load(Ordering::Acquire);
                    abandoned(&self.bus, Arc::clone(name), started_beat, started.elapsed())
                }
            };
            if results.insert(Arc::clone(&name), outcome).is_some() {
                tracing::debug!(task = %name, "duplicate task name; later outcome replaces earlier");
            }
        }

        tracing::debug!(
            tasks = results.len(),
            succeeded = results.succeeded(),
            elapsed = ?started.elapsed(),
            "parallel run finished"
        );
        Ok(results)
    }

    /// Flushes heartbeats to subscribers and waits for their workers to exit.
    ///
    /// Heartbeats already published are delivered before this returns.
    pub async fn shutdown(self) {
        let Self { bus, listener, .. } = self;
        drop(bus);
        if let Err(err) = listener.await {
            tracing::warn!(error = %err, "heartbeat listener did not exit cleanly");
        }
    }
}

/// Outcome of a task the runtime aborted.
///
/// `run_one` publishes `Start` on its first poll and cannot be interrupted between its
/// terminal beat and its return, so only the missing beats are published here.
fn abandoned<T>(bus: &Bus, name: Arc<str>, started: bool, elapsed: Duration) -> (Arc<str>, Outcome<T>) {
    if !started {
        bus.publish(Heartbeat::start(Arc::clone(&name)));
    }
    let error = TaskError::Canceled;
    bus.publish(Heartbeat::error(Arc::clone(&name), elapsed, error.to_string()));
    (name, Outcome::new(Err(error), elapsed))
}

fn validate<T>(tasks: &[TaskSpec<T>]) -> Result<(), RunError> {
    match tasks.iter().find(|t| t.timeout() == Duration::ZERO) {
        Some(bad) => Err(RunError::InvalidTimeout {
            task: bad.name().to_owned(),
            timeout: bad.timeout(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;
    use crate::events::HeartbeatKind;
    use crate::subscribers::{SinkFn, Subscribe};

    #[derive(Default)]
    struct Recorder {
        beats: Mutex<Vec<Heartbeat>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, beat: &Heartbeat) {
            self.beats.lock().unwrap().push(beat.clone());
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploding;

    #[async_trait]
    impl Subscribe for Exploding {
        async fn on_event(&self, _beat: &Heartbeat) {
            panic!("sink failure");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    fn sleeper(name: &str, work: Duration, timeout: Duration, value: u32) -> TaskSpec<u32> {
        TaskSpec::new(name, timeout, move |_ctx| async move {
            time::sleep(work).await;
            Ok(value)
        })
    }

    fn failing(name: &str, msg: &'static str) -> TaskSpec<u32> {
        TaskSpec::new(name, Duration::from_secs(1), move |_ctx| async move {
            Err(TaskError::fail(msg))
        })
    }

    fn scenario() -> Vec<TaskSpec<u32>> {
        vec![
            sleeper("fast", Duration::from_millis(10), Duration::from_secs(1), 1),
            sleeper("slow", Duration::from_secs(2), Duration::from_millis(500), 2),
            failing("broken", "boom"),
        ]
    }

    fn assert_scenario(results: &ResultMap<u32>) {
        assert_eq!(results.len(), 3);
        assert_eq!(results.value("fast"), Some(&1));
        assert!(results.error("fast").is_none());

        let slow = results.error("slow").expect("slow must fail");
        assert!(slow.is_timeout());
        assert!(slow.to_string().contains("timeout"));
        assert!(results.value("slow").is_none());

        assert_eq!(results.error("broken").map(ToString::to_string).as_deref(), Some("boom"));
        assert!(results.value("broken").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fast_slow_broken_scenario() {
        let recorder = Arc::new(Recorder::default());
        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build();

        let results = sup.run_parallel(scenario()).await.unwrap();
        assert_scenario(&results);

        let slow = results.get("slow").unwrap();
        assert!(slow.elapsed >= Duration::from_millis(500));
        assert!(slow.elapsed < Duration::from_millis(600));

        sup.shutdown().await;

        let beats = recorder.beats.lock().unwrap().clone();
        assert_eq!(beats.len(), 6);
        for task in ["fast", "slow", "broken"] {
            let mine: Vec<&Heartbeat> = beats.iter().filter(|b| &*b.task == task).collect();
            assert_eq!(mine.len(), 2, "task {task}");
            let start = mine.iter().find(|b| b.kind == HeartbeatKind::Start).unwrap();
            let end = mine.iter().find(|b| b.kind.is_terminal()).unwrap();
            assert!(start.seq < end.seq, "task {task}: start must precede terminal");
        }
        let terminal_of = |task: &str| {
            beats
                .iter()
                .find(|b| &*b.task == task && b.is_terminal())
                .map(|b| b.kind)
        };
        assert_eq!(terminal_of("fast"), Some(HeartbeatKind::Done));
        assert_eq!(terminal_of("slow"), Some(HeartbeatKind::Error));
        assert_eq!(terminal_of("broken"), Some(HeartbeatKind::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn every_task_gets_an_entry() {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let tasks: Vec<TaskSpec<u32>> = (0..50)
            .map(|i| {
                let work = Duration::from_millis(u64::from(i % 7) * 100);
                if i % 5 == 0 {
                    failing(&format!("task-{i}"), "nope")
                } else {
                    sleeper(&format!("task-{i}"), work, Duration::from_millis(450), i)
                }
            })
            .collect();

        let results = sup.run_parallel(tasks).await.unwrap();
        assert_eq!(results.len(), 50);
        for i in 0..50u32 {
            let name = format!("task-{i}");
            let outcome = results.get(&name).unwrap();
            if i % 5 == 0 {
                assert_eq!(outcome.error(), Some(&TaskError::fail("nope")));
            } else if (i % 7) * 100 > 450 {
                assert!(outcome.error().unwrap().is_timeout(), "{name}");
            } else {
                assert_eq!(outcome.value(), Some(&i), "{name}");
            }
        }
        sup.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sinks_do_not_change_outcomes() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let erroring = SinkFn::arc("erroring", move |_beat: &Heartbeat| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("sink refused")
        });

        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_subscribers(vec![Arc::new(Exploding) as Arc<dyn Subscribe>, erroring])
            .build();

        let results = sup.run_parallel(scenario()).await.unwrap();
        assert_scenario(&results);

        sup.shutdown().await;
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn zero_timeout_fails_before_anything_starts() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);

        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let mut rx = sup.subscribe();

        let tasks = vec![
            TaskSpec::new("fine", Duration::from_secs(1), move |_ctx| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
            TaskSpec::new("bad", Duration::ZERO, |_ctx| async { Ok(()) }),
        ];

        let err = sup.run_parallel(tasks).await.unwrap_err();
        assert_eq!(
            err,
            RunError::InvalidTimeout {
                task: "bad".into(),
                timeout: Duration::ZERO
            }
        );
        tokio::task::yield_now().await;
        assert!(!started.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err());
        sup.shutdown().await;
    }

    #[tokio::test]
    async fn empty_task_list_returns_empty_map() {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let results = sup.run_parallel(Vec::<TaskSpec<()>>::new()).await.unwrap();
        assert!(results.is_empty());
        sup.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_names_keep_the_last_finisher() {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let tasks = vec![
            sleeper("dup", Duration::from_millis(20), Duration::from_secs(1), 2),
            sleeper("dup", Duration::from_millis(10), Duration::from_secs(1), 1),
        ];
        let results = sup.run_parallel(tasks).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.value("dup"), Some(&2));
        sup.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_runs_classify_identically() {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let first = sup.run_parallel(scenario()).await.unwrap();
        let second = sup.run_parallel(scenario()).await.unwrap();

        assert_eq!(first.names(), second.names());
        for name in first.names() {
            assert_eq!(first.get(name).unwrap().is_ok(), second.get(name).unwrap().is_ok());
        }
        sup.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn raw_receivers_see_partial_progress() {
        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let mut rx = sup.subscribe();

        let results = sup
            .run_parallel(vec![sleeper("only", Duration::from_millis(5), Duration::from_secs(1), 9)])
            .await
            .unwrap();
        assert_eq!(results.value("only"), Some(&9));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, HeartbeatKind::Start);
        assert_eq!(second.kind, HeartbeatKind::Done);
        sup.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_timeout_is_advisory_and_late_value_is_discarded() {
        let observed = Arc::new(AtomicBool::new(false));
        let observed_in_op = Arc::clone(&observed);

        let sup = Supervisor::builder(SupervisorConfig::default()).build();
        let started = std::time::Instant::now();
        let tasks = vec![TaskSpec::blocking(
            "stubborn",
            Duration::from_millis(50),
            move |ctx: CancellationToken| {
                while !ctx.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                observed_in_op.store(true, Ordering::SeqCst);
                Ok(42u32)
            },
        )];

        let results = sup.run_parallel(tasks).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(results.error("stubborn").unwrap().is_timeout());

        time::sleep(Duration::from_millis(100)).await;
        assert!(observed.load(Ordering::SeqCst));
        assert!(results.value("stubborn").is_none());
        sup.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_reaches_running_operations() {
        let sup = Arc::new(Supervisor::builder(SupervisorConfig::default()).build());
        let tasks = vec![TaskSpec::new(
            "cooperative",
            Duration::from_secs(60),
            |ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Err::<(), _>(TaskError::Canceled)
            },
        )];

        let canceller = Arc::clone(&sup);
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let results = sup.run_parallel(tasks).await.unwrap();
        let outcome = results.get("cooperative").unwrap();
        assert_eq!(outcome.error(), Some(&TaskError::Canceled));
        assert!(outcome.elapsed < Duration::from_secs(1));
    }

    struct Lagging {
        beats: Mutex<Vec<Heartbeat>>,
    }

    #[async_trait]
    impl Subscribe for Lagging {
        async fn on_event(&self, beat: &Heartbeat) {
            time::sleep(Duration::from_millis(1)).await;
            self.beats.lock().unwrap().push(beat.clone());
        }

        fn name(&self) -> &'static str {
            "lagging"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn large_fan_out_delivers_every_heartbeat() {
        const TASKS: u32 = 2000;

        let delivered = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&delivered);
        let counter = SinkFn::arc("counter", move |_beat: &Heartbeat| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        });
        let lagging = Arc::new(Lagging {
            beats: Mutex::new(Vec::new()),
        });

        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_subscribers(vec![counter, lagging.clone() as Arc<dyn Subscribe>])
            .build();

        let tasks: Vec<TaskSpec<u32>> = (0..TASKS)
            .map(|i| TaskSpec::new(format!("t{i}"), Duration::from_secs(1), move |_ctx| async move { Ok(i) }))
            .collect();

        let results = sup.run_parallel(tasks).await.unwrap();
        assert_eq!(results.len(), TASKS as usize);
        sup.shutdown().await;

        assert_eq!(delivered.load(Ordering::SeqCst), 2 * TASKS as usize);

        let beats = lagging.beats.lock().unwrap();
        assert_eq!(beats.len(), 2 * TASKS as usize);
        let mut per_task: HashMap<&str, Vec<HeartbeatKind>> = HashMap::new();
        for beat in beats.iter() {
            per_task.entry(&*beat.task).or_default().push(beat.kind);
        }
        assert_eq!(per_task.len(), TASKS as usize);
        for (task, kinds) in per_task {
            assert_eq!(kinds, vec![HeartbeatKind::Start, HeartbeatKind::Done], "task {task}");
        }
    }

    #[tokio::test]
    async fn aborted_before_first_poll_still_gets_a_pair() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let (name, outcome) = abandoned::<u32>(&bus, "never-ran".into(), false, Duration::ZERO);
        assert_eq!(&*name, "never-ran");
        assert_eq!(outcome.error(), Some(&TaskError::Canceled));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.kind, HeartbeatKind::Start);
        assert_eq!(second.kind, HeartbeatKind::Error);
        assert!(first.seq < second.seq);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn aborted_mid_flight_only_adds_the_terminal_beat() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let (_, outcome) = abandoned::<u32>(&bus, "half-way".into(), true, Duration::from_millis(3));
        assert_eq!(outcome.elapsed, Duration::from_millis(3));

        let only = rx.try_recv().unwrap();
        assert_eq!(only.kind, HeartbeatKind::Error);
        assert_eq!(only.error.as_deref(), Some(TaskError::Canceled.to_string().as_str()));
        assert!(rx.try_recv().is_err());
    }
}
