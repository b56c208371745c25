//! # Heartbeat bus.
//!
//! [`Bus`] carries heartbeats from every running task to two kinds of consumers:
//!
//! - the **dispatch queue**: an unbounded [`mpsc`] channel drained by the heartbeat
//!   listener, which feeds the subscriber set. Nothing published is lost on this path.
//! - **raw receivers**: a [`broadcast`] ring buffer behind `Supervisor::subscribe()`.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Consumers:
//!   run_one #1 ──┐                ┌─► dispatch (mpsc) ──► listener ──► SubscriberSet
//!   run_one #2 ──┼──────► Bus ────┤
//!   run_one #N ──┘                └─► broadcast ring ──► Supervisor::subscribe() receivers
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails the publisher.
//! - **Lossless dispatch**: the listener sees every heartbeat, in publish order.
//! - **Bounded raw receivers**: slow raw receivers get `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: raw receivers only see heartbeats published after they subscribe.
//! - The dispatch queue closes once every clone of the bus is dropped.

use tokio::sync::{broadcast, mpsc};

use super::heartbeat::Heartbeat;

/// Heartbeat channel shared by every task of a supervisor.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Cloneable**: cheap to clone (both senders are `Arc`-backed).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Heartbeat>,
    dispatch: Option<mpsc::UnboundedSender<Heartbeat>>,
}

impl Bus {
    /// Creates a bus without a dispatch queue (raw receivers only).
    ///
    /// The broadcast capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Heartbeat>(capacity.max(1));
        Self { tx, dispatch: None }
    }

    /// Creates a bus together with the receiving end of its dispatch queue.
    pub fn with_dispatch(capacity: usize) -> (Self, mpsc::UnboundedReceiver<Heartbeat>) {
        let (dispatch, rx) = mpsc::unbounded_channel();
        let mut bus = Self::new(capacity);
        bus.dispatch = Some(dispatch);
        (bus, rx)
    }

    /// Publishes a heartbeat to the dispatch queue and to all raw receivers.
    pub fn publish(&self, beat: Heartbeat) {
        if let Some(dispatch) = &self.dispatch {
            let _ = dispatch.send(beat.clone());
        }
        let _ = self.tx.send(beat);
    }

    /// Creates a raw receiver that will observe subsequent heartbeats.
    pub fn subscribe(&self) -> broadcast::Receiver<Heartbeat> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        bus.publish(Heartbeat::start("orphan"));
    }

    #[tokio::test]
    async fn receivers_see_later_beats_only() {
        let bus = Bus::new(8);
        bus.publish(Heartbeat::start("early"));

        let mut rx = bus.subscribe();
        bus.publish(Heartbeat::start("late"));

        let beat = rx.recv().await.unwrap();
        assert_eq!(&*beat.task, "late");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_keeps_everything_past_the_ring_size() {
        let (bus, mut dispatch) = Bus::with_dispatch(4);
        let mut raw = bus.subscribe();
        let clone = bus.clone();

        for i in 0..100 {
            clone.publish(Heartbeat::start(format!("t{i}")));
        }
        drop(clone);
        drop(bus);

        let mut seen = Vec::new();
        while let Some(beat) = dispatch.recv().await {
            seen.push(beat.task.to_string());
        }
        assert_eq!(seen.len(), 100);
        assert_eq!(seen[0], "t0");
        assert_eq!(seen[99], "t99");

        assert!(matches!(
            raw.recv().await,
            Err(broadcast::error::RecvError::Lagged(96))
        ));
    }
}
