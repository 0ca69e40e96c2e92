use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use actix_web::web::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::message::Event;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving half of one registered connection.
#[derive(Debug)]
pub struct Subscriber {
    id: SubscriberId,
    receiver: mpsc::Receiver<Bytes>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next framed event, or `None` once the broadcaster dropped this
    /// subscriber.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receiver.recv().await
    }

    pub(crate) fn receiver_mut(&mut self) -> &mut mpsc::Receiver<Bytes> {
        &mut self.receiver
    }
}

struct Registry {
    next_id: u64,
    senders: HashMap<SubscriberId, mpsc::Sender<Bytes>>,
}

/// Fans published events out to every live subscriber.
///
/// Each subscriber gets a bounded queue. Publishing never waits on a
/// subscriber: one whose queue is full or closed is removed on the spot.
/// All registry mutations and the whole fan-out of a publish run under one
/// lock, so every subscriber observes the same publish order.
#[derive(Clone)]
pub struct EventBroadcaster {
    registry: Arc<Mutex<Registry>>,
    channel_capacity: usize,
}

impl EventBroadcaster {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                senders: HashMap::new(),
            })),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn subscribe(&self) -> Subscriber {
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        let mut registry = self.registry.lock();
        let id = SubscriberId(registry.next_id);
        registry.next_id += 1;
        registry.senders.insert(id, tx);
        let active = registry.senders.len();
        drop(registry);

        log::debug!("Subscriber {} registered ({} active)", id, active);
        Subscriber { id, receiver: rx }
    }

    /// Removes `id` from the registry. Unknown or already removed ids are
    /// ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut registry = self.registry.lock();
        if registry.senders.remove(&id).is_some() {
            log::debug!(
                "Subscriber {} unregistered ({} active)",
                id,
                registry.senders.len()
            );
        }
    }

    /// Serializes `data` once and queues it for every subscriber, returning
    /// how many received it.
    pub fn publish<T: Serialize>(&self, name: &str, data: &T) -> Result<usize> {
        let frame = Event::new(name, data).to_frame()?;

        let mut registry = self.registry.lock();
        let mut delivered = 0;
        registry.senders.retain(|id, sender| match sender.try_send(frame.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                log::debug!("Dropping subscriber {}: queue full", id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Dropping subscriber {}: connection closed", id);
                false
            }
        });
        let active = registry.senders.len();
        drop(registry);

        log::debug!(
            "Published '{}' to {} subscribers ({} active)",
            name,
            delivered,
            active
        );
        Ok(delivered)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().senders.len()
    }

    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.registry.lock().senders.contains_key(&id)
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
