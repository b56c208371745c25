//! # Non-blocking heartbeat fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes heartbeats to multiple subscribers
//! without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(beat)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │  (unbounded)         └──────► panic → logged, worker continues
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │  (unbounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!        (unbounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process beat N while B processes N+5
//! - **Lossless**: a heartbeat is only lost for a subscriber whose worker has exited
//! - **Non-blocking**: `emit()` returns immediately
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees beats in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::panic_message;
use crate::events::Heartbeat;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::UnboundedSender<Arc<Heartbeat>>,
}

/// Fan-out coordinator for multiple heartbeat subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Workers start immediately and process heartbeats until [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::unbounded_channel::<Arc<Heartbeat>>();

            let handle = tokio::spawn(async move {
                while let Some(beat) = rx.recv().await {
                    let fut = sub.on_event(beat.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::warn!(
                            subscriber = sub.name(),
                            task = %beat.task,
                            info = %panic_message(panic_err.as_ref()),
                            "subscriber panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// Fan-out one heartbeat to all subscribers (non-blocking).
    ///
    /// If a subscriber's worker is gone, the heartbeat is dropped for it.
    pub fn emit(&self, beat: &Heartbeat) {
        let beat = Arc::new(beat.clone());
        for channel in &self.channels {
            if channel.sender.send(Arc::clone(&beat)).is_err() {
                tracing::warn!(subscriber = channel.name, "subscriber dropped heartbeat: worker closed");
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    ///
    /// Heartbeats already queued are processed first.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _beat: &Heartbeat) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanicsOnStart;

    #[async_trait]
    impl Subscribe for PanicsOnStart {
        async fn on_event(&self, beat: &Heartbeat) {
            if !beat.is_terminal() {
                panic!("start beats are not welcome");
            }
        }
    }

    struct Sluggish(AtomicUsize);

    #[async_trait]
    impl Subscribe for Sluggish {
        async fn on_event(&self, _beat: &Heartbeat) {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber_despite_panics() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let set = SubscriberSet::new(vec![
            Arc::new(PanicsOnStart) as Arc<dyn Subscribe>,
            counter.clone() as Arc<dyn Subscribe>,
        ]);
        assert_eq!(set.len(), 2);

        set.emit(&Heartbeat::start("a"));
        set.emit(&Heartbeat::done("a", std::time::Duration::from_millis(1)));
        set.shutdown().await;

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_reach_slow_subscribers_in_full() {
        let slow = Arc::new(Sluggish(AtomicUsize::new(0)));
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let set = SubscriberSet::new(vec![
            slow.clone() as Arc<dyn Subscribe>,
            counter.clone() as Arc<dyn Subscribe>,
        ]);

        // Workers cannot run between these calls on a current-thread runtime.
        for _ in 0..5000 {
            set.emit(&Heartbeat::start("burst"));
        }
        set.shutdown().await;

        assert_eq!(slow.0.load(Ordering::SeqCst), 5000);
        assert_eq!(counter.0.load(Ordering::SeqCst), 5000);
    }

    #[tokio::test]
    async fn empty_set_is_a_no_op() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(&Heartbeat::start("nobody"));
        set.shutdown().await;
    }
}
