//! # Timeline – record every heartbeat of a run
//!
//! Keeps an in-memory list of all heartbeats it receives, so a caller can inspect the
//! approximate timeline of a run after it returns (or while it is still going).
//!
//! ## Behavior
//! - Terminal beat without a prior start → tolerated, warn.
//! - Second start for a name → tolerated, warn (duplicate task names are legal).
//!
//! ## Internal scheme
//! ```text
//! on_event(beat):
//!   ├─ push(beat)
//!   └─ running: Start → insert(name), terminal → remove(name)
//!
//! snapshot() -> Vec<Heartbeat>  (sorted by seq)
//! running()  -> Vec<String>     (sorted names without a terminal beat yet)
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::events::Heartbeat;
use crate::subscribers::Subscribe;

#[derive(Default)]
struct Inner {
    beats: Vec<Heartbeat>,
    running: HashMap<String, usize>,
}

/// Records heartbeats and tracks which tasks are still running.
pub struct Timeline {
    inner: Mutex<Inner>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Returns all recorded heartbeats, sorted by sequence number.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Heartbeat> {
        let mut beats = self.lock().beats.clone();
        beats.sort_unstable_by_key(|b| b.seq);
        beats
    }

    /// Returns the (sorted) names of tasks that started but have not finished.
    #[must_use]
    pub fn running(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().running.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        let mut g = self.lock();
        g.beats.clear();
        g.running.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle_start(running: &mut HashMap<String, usize>, name: &str) {
        let count = running.entry(name.to_owned()).or_insert(0);
        *count += 1;
        if *count > 1 {
            tracing::warn!(task = name, "Timeline: duplicate start");
        }
    }

    fn handle_terminal(running: &mut HashMap<String, usize>, name: &str) {
        match running.get_mut(name) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                running.remove(name);
            }
            None => tracing::warn!(task = name, "Timeline: terminal beat without start"),
        }
    }
}

#[async_trait]
impl Subscribe for Timeline {
    async fn on_event(&self, beat: &Heartbeat) {
        let mut g = self.lock();
        if beat.is_terminal() {
            Self::handle_terminal(&mut g.running, &beat.task);
        } else {
            Self::handle_start(&mut g.running, &beat.task);
        }
        g.beats.push(beat.clone());
    }

    fn name(&self) -> &'static str {
        "Timeline"
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn tracks_running_tasks_and_orders_snapshot() {
        let timeline = Timeline::new();
        let a = Heartbeat::start("a");
        let b = Heartbeat::start("b");
        let a_done = Heartbeat::done("a", Duration::from_millis(4));

        // Deliver out of order; snapshot sorts by seq.
        timeline.on_event(&b).await;
        timeline.on_event(&a).await;
        assert_eq!(timeline.running(), vec!["a".to_string(), "b".to_string()]);

        timeline.on_event(&a_done).await;
        assert_eq!(timeline.running(), vec!["b".to_string()]);

        let seqs: Vec<u64> = timeline.snapshot().iter().map(|h| h.seq).collect();
        assert_eq!(seqs, vec![a.seq, b.seq, a_done.seq]);

        timeline.clear();
        assert!(timeline.snapshot().is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_need_two_terminal_beats() {
        let timeline = Timeline::new();
        timeline.on_event(&Heartbeat::start("dup")).await;
        timeline.on_event(&Heartbeat::start("dup")).await;
        timeline
            .on_event(&Heartbeat::error("dup", Duration::ZERO, "boom"))
            .await;
        assert_eq!(timeline.running(), vec!["dup".to_string()]);
        timeline
            .on_event(&Heartbeat::done("dup", Duration::ZERO))
            .await;
        assert!(timeline.running().is_empty());
    }
}
