// In-memory transport - Loopback middleware for tests and local pipelines
//
// Messages published through a Publisher are queued per subscription and
// handed out by Transport::take, exactly like a middleware that buffers
// samples until the node is spun.

use super::{RawImage, SubscriptionHandle, Transport, TransportError};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Bus {
    queues: HashMap<u64, (String, VecDeque<RawImage>)>,
    shut_down: bool,
}

/// Loopback transport
///
/// Single-threaded: publishers and the transport share one bus.
pub struct InMemoryTransport {
    bus: Rc<RefCell<Bus>>,
    next_id: u64,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self {
            bus: Rc::new(RefCell::new(Bus::default())),
            next_id: 1,
        }
    }

    /// Create a publisher for a topic
    ///
    /// The publisher stays valid after the transport is shut down, but
    /// messages sent from then on are dropped.
    pub fn publisher(&self, topic: &str) -> Publisher {
        Publisher {
            bus: Rc::clone(&self.bus),
            topic: topic.to_string(),
        }
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.bus.borrow().queues.len()
    }

    /// Whether shutdown has run
    pub fn is_shut_down(&self) -> bool {
        self.bus.borrow().shut_down
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for InMemoryTransport {
    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle, TransportError> {
        let mut bus = self.bus.borrow_mut();
        if bus.shut_down {
            return Err(TransportError::Shutdown);
        }

        let id = self.next_id;
        self.next_id += 1;
        bus.queues.insert(id, (topic.to_string(), VecDeque::new()));
        Ok(SubscriptionHandle::new(id, topic))
    }

    fn take(
        &mut self,
        handle: &SubscriptionHandle,
        _timeout: Duration,
    ) -> Result<Vec<RawImage>, TransportError> {
        let mut bus = self.bus.borrow_mut();
        if bus.shut_down {
            return Err(TransportError::Shutdown);
        }

        // Publishing is synchronous, so anything that will arrive is already queued
        let (_, queue) = bus
            .queues
            .get_mut(&handle.id())
            .ok_or(TransportError::UnknownSubscription(handle.id()))?;
        Ok(queue.drain(..).collect())
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), TransportError> {
        let mut bus = self.bus.borrow_mut();
        if bus.shut_down {
            return Err(TransportError::Shutdown);
        }

        bus.queues
            .remove(&handle.id())
            .map(|_| ())
            .ok_or(TransportError::UnknownSubscription(handle.id()))
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        let mut bus = self.bus.borrow_mut();
        bus.queues.clear();
        bus.shut_down = true;
        Ok(())
    }
}

/// Publishing side of an in-memory topic
#[derive(Clone)]
pub struct Publisher {
    bus: Rc<RefCell<Bus>>,
    topic: String,
}

impl Publisher {
    /// Publish a message to every subscription on the topic
    ///
    /// # Returns
    /// Number of subscriptions the message was queued for
    pub fn publish(&self, msg: RawImage) -> usize {
        let mut bus = self.bus.borrow_mut();
        if bus.shut_down {
            return 0;
        }

        let mut delivered = 0;
        for (topic, queue) in bus.queues.values_mut() {
            if *topic == self.topic {
                queue.push_back(msg.clone());
                delivered += 1;
            }
        }
        delivered
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
