// Common test utilities for session and subscriber integration tests
//
// RecordingTransport wraps the in-memory loopback and appends every
// lifecycle call to a shared journal, so tests can check teardown order
// after the transport has been moved into a session.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use topic_viewer::{InMemoryTransport, Publisher, RawImage, SubscriptionHandle, Transport, TransportError};

/// Lifecycle call seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Subscribe(String),
    Take,
    Unsubscribe(u64),
    Shutdown,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

/// Transport that records lifecycle calls
pub struct RecordingTransport {
    inner: InMemoryTransport,
    journal: Journal,
    fail_subscribe: bool,
}

impl RecordingTransport {
    pub fn new() -> (Self, Journal) {
        let journal = Journal::default();
        let transport = Self {
            inner: InMemoryTransport::new(),
            journal: Rc::clone(&journal),
            fail_subscribe: false,
        };
        (transport, journal)
    }

    /// Make every subscribe call fail
    pub fn failing_subscribe(mut self) -> Self {
        self.fail_subscribe = true;
        self
    }

    pub fn publisher(&self, topic: &str) -> Publisher {
        self.inner.publisher(topic)
    }
}

impl Transport for RecordingTransport {
    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle, TransportError> {
        self.journal.borrow_mut().push(Call::Subscribe(topic.to_string()));
        if self.fail_subscribe {
            return Err(TransportError::Dds("subscription refused".to_string()));
        }
        self.inner.subscribe(topic)
    }

    fn take(
        &mut self,
        handle: &SubscriptionHandle,
        timeout: Duration,
    ) -> Result<Vec<RawImage>, TransportError> {
        self.journal.borrow_mut().push(Call::Take);
        self.inner.take(handle, timeout)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), TransportError> {
        self.journal.borrow_mut().push(Call::Unsubscribe(handle.id()));
        self.inner.unsubscribe(handle)
    }

    fn shutdown(&mut self) -> Result<(), TransportError> {
        self.journal.borrow_mut().push(Call::Shutdown);
        self.inner.shutdown()
    }
}

/// Lifecycle calls only, without pump traffic
pub fn lifecycle_calls(journal: &Journal) -> Vec<Call> {
    journal
        .borrow()
        .iter()
        .filter(|call| **call != Call::Take)
        .cloned()
        .collect()
}

/// One-pixel BGR8 message
pub fn bgr_pixel(b: u8, g: u8, r: u8) -> RawImage {
    RawImage::packed(1, 1, "bgr8", 3, vec![b, g, r])
}

/// Message that fails conversion (data shorter than one pixel)
pub fn truncated_pixel() -> RawImage {
    RawImage::packed(1, 1, "bgr8", 3, vec![0, 0])
}
