//! End-to-end runs through the public API on a real clock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gathervisor::{
    Heartbeat, HeartbeatKind, RunError, SinkFn, Subscribe, Supervisor, SupervisorConfig,
    TaskError, TaskSpec, Timeline,
};
use tokio_util::sync::CancellationToken;

fn scenario() -> Vec<TaskSpec<&'static str>> {
    vec![
        TaskSpec::new("fast", Duration::from_secs(1), |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok("ok")
        }),
        TaskSpec::new("slow", Duration::from_millis(300), |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok("too late")
        }),
        TaskSpec::new("broken", Duration::from_secs(1), |_ctx: CancellationToken| async {
            Err(TaskError::fail("boom"))
        }),
    ]
}

#[tokio::test]
async fn fast_slow_broken() {
    let timeline = Arc::new(Timeline::new());
    let printed = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = Arc::clone(&printed);
    let printer = SinkFn::arc("printer", move |beat: &Heartbeat| {
        sink_lines.lock().unwrap().push(format!("[heartbeat] {beat}"));
        Ok::<(), std::io::Error>(())
    });

    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_subscribers(vec![
            timeline.clone() as Arc<dyn Subscribe>,
            printer as Arc<dyn Subscribe>,
        ])
        .build();

    let started = Instant::now();
    let results = sup.run_parallel(scenario()).await.unwrap();
    let took = started.elapsed();
    sup.shutdown().await;

    // bounded by the slow task's timeout, not its 2s of work
    assert!(took >= Duration::from_millis(300));
    assert!(took < Duration::from_millis(1500), "run took {took:?}");

    assert_eq!(results.len(), 3);
    assert_eq!(results.value("fast"), Some(&"ok"));
    let slow = results.error("slow").unwrap();
    assert!(slow.is_timeout());
    assert!(slow.to_string().contains("timeout"));
    assert!(results.get("slow").unwrap().elapsed >= Duration::from_millis(300));
    assert_eq!(results.error("broken").unwrap().to_string(), "boom");

    let beats = timeline.snapshot();
    assert_eq!(beats.len(), 6);
    assert!(timeline.running().is_empty());
    for task in ["fast", "slow", "broken"] {
        let kinds: Vec<HeartbeatKind> = beats
            .iter()
            .filter(|b| &*b.task == task)
            .map(|b| b.kind)
            .collect();
        assert_eq!(kinds.len(), 2, "{task}");
        assert_eq!(kinds[0], HeartbeatKind::Start, "{task}");
    }
    let terminal = |task: &str| beats.iter().find(|b| &*b.task == task && b.is_terminal()).unwrap().kind;
    assert_eq!(terminal("fast"), HeartbeatKind::Done);
    assert_eq!(terminal("slow"), HeartbeatKind::Error);
    assert_eq!(terminal("broken"), HeartbeatKind::Error);

    assert_eq!(printed.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn zero_timeout_is_rejected_up_front() {
    let sup = Supervisor::builder(SupervisorConfig::default()).build();
    let mut rx = sup.subscribe();

    let mut tasks = scenario();
    tasks.push(TaskSpec::new("never", Duration::ZERO, |_ctx: CancellationToken| async {
        Ok("unreachable")
    }));

    let err = sup.run_parallel(tasks).await.unwrap_err();
    assert_eq!(
        err,
        RunError::InvalidTimeout {
            task: "never".into(),
            timeout: Duration::ZERO
        }
    );
    assert!(rx.try_recv().is_err());
    sup.shutdown().await;
}

#[tokio::test]
async fn blocking_tasks_run_off_the_async_threads() {
    let sup = Supervisor::builder(SupervisorConfig::default()).build();
    let tasks = vec![
        TaskSpec::blocking("sum", Duration::from_secs(5), |_ctx| {
            Ok::<_, TaskError>((1..=100u64).sum::<u64>())
        }),
        TaskSpec::blocking("panics", Duration::from_secs(5), |_ctx| -> Result<u64, TaskError> {
            panic!("bad input")
        }),
    ];

    let results = sup.run_parallel(tasks).await.unwrap();
    assert_eq!(results.value("sum"), Some(&5050));
    assert!(matches!(results.error("panics"), Some(TaskError::Panicked { .. })));
    sup.shutdown().await;
}
