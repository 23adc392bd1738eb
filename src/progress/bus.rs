use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
/// Push-style progress sink
///
/// Every published update is delivered to every subscriber, optionally
/// filtered to one run. Subscribers whose receiver was dropped are pruned
/// on the next publish.
use std::sync::Arc;

use super::{ProgressSink, ProgressUpdate, RunId};

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    /// `None` receives every run
    run_id: Option<RunId>,
    sender: Sender<ProgressUpdate>,
}

impl Subscriber {
    fn wants(&self, update: &ProgressUpdate) -> bool {
        self.run_id
            .as_ref()
            .map(|id| *id == update.run_id)
            .unwrap_or(true)
    }
}

/// Progress bus broadcasting run updates to subscribers
#[derive(Clone)]
pub struct ProgressBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<RwLock<usize>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(0)),
        }
    }

    /// Subscribe to updates from every run
    pub fn subscribe(&self) -> (Receiver<ProgressUpdate>, SubscriberId) {
        self.add_subscriber(None)
    }

    /// Subscribe to updates from one run only
    pub fn subscribe_run(&self, run_id: RunId) -> (Receiver<ProgressUpdate>, SubscriberId) {
        self.add_subscriber(Some(run_id))
    }

    fn add_subscriber(&self, run_id: Option<RunId>) -> (Receiver<ProgressUpdate>, SubscriberId) {
        let (tx, rx) = unbounded();

        let mut next_id = self.next_id.write();
        let id = SubscriberId(*next_id);
        *next_id += 1;
        drop(next_id);

        self.subscribers.write().push(Subscriber {
            id,
            run_id,
            sender: tx,
        });

        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Deliver `update` to every interested subscriber
    pub fn publish(&self, update: ProgressUpdate) {
        let mut disconnected = Vec::new();

        {
            let subscribers = self.subscribers.read();
            for subscriber in subscribers.iter().filter(|s| s.wants(&update)) {
                if let Err(TrySendError::Disconnected(_)) = subscriber.sender.try_send(update.clone()) {
                    disconnected.push(subscriber.id);
                }
            }
        }

        if !disconnected.is_empty() {
            tracing::debug!("Pruning {} disconnected progress subscribers", disconnected.len());
            self.subscribers
                .write()
                .retain(|s| !disconnected.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBus {
    fn report(&self, update: ProgressUpdate) {
        self.publish(update);
    }
}
