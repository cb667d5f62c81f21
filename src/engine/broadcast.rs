//! Broadcast "stop everything" channel.
//!
//! Every live sound subscribes on construction and is removed again when
//! its [`Subscription`] drops. Listeners are held weakly, so the channel
//! never keeps a sound alive and reaches sounds the registry knows nothing
//! about.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

/// Receiver of stop notifications.
pub trait StopListener: Send + Sync {
    /// Called once per published notification.
    fn on_stop(&self);
}

/// Observer list of live stop listeners.
#[derive(Default)]
pub struct StopBroadcaster {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Weak<dyn StopListener>)>>,
}

impl StopBroadcaster {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a listener until the returned guard drops.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(self: &Arc<Self>, listener: Weak<dyn StopListener>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push((id, listener));
        Subscription {
            id,
            channel: Arc::downgrade(self),
        }
    }

    /// Notifies every live listener and returns how many were reached.
    ///
    /// Listeners run after the subscriber lock is released, so they may
    /// subscribe or unsubscribe while handling the notification.
    pub fn publish(&self) -> usize {
        let listeners: Vec<Arc<dyn StopListener>> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|(_, weak)| weak.strong_count() > 0);
            subscribers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };

        for listener in &listeners {
            listener.on_stop();
        }
        debug!("Stop notification delivered to {} sounds", listeners.len());
        listeners.len()
    }

    /// Number of listeners that are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|(sid, _)| *sid != id);
    }
}

impl std::fmt::Debug for StopBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a listener subscribed; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: Weak<StopBroadcaster>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.unsubscribe(self.id);
        }
    }
}
