use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::supervisor::Supervisor;
use crate::{
    core::SupervisorConfig,
    events::{Bus, Heartbeat},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a Supervisor with heartbeat subscribers.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets heartbeat subscribers.
    ///
    /// Subscribers receive every heartbeat through dedicated workers with their own queues.
    /// A slow, failing or panicking subscriber never affects task outcomes.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one heartbeat subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// Spawns the subscriber workers and the heartbeat listener, so this must be called
    /// from within a Tokio runtime.
    pub fn build(self) -> Supervisor {
        let (bus, dispatch) = Bus::with_dispatch(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers);
        let listener = spawn_listener(dispatch, subs);

        Supervisor::new_internal(self.cfg, bus, CancellationToken::new(), listener)
    }
}

/// Forwards heartbeats from the dispatch queue to the subscriber set until every bus
/// clone is gone, then drains and joins the subscriber workers.
fn spawn_listener(
    mut rx: mpsc::UnboundedReceiver<Heartbeat>,
    subs: SubscriberSet,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(beat) = rx.recv().await {
            subs.emit(&beat);
        }
        subs.shutdown().await;
    })
}
