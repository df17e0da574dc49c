// Image subscriber - Latest-frame holder for one image topic
//
// Every inbound message is converted to BGR8. The newest successful
// conversion replaces the stored frame; anything older is dropped, so a
// slow display simply skips frames.

use crate::frame::{to_bgr8, Frame};
use crate::middleware::{RawImage, SubscriptionHandle, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;

/// Storage for the most recent frame
///
/// Both the pump and the refresh run on the event loop thread, so a plain
/// owned slot is enough. Callers only go through `get`/`set`.
#[derive(Debug, Default)]
pub struct FrameSlot {
    frame: Option<Arc<Frame>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self { frame: None }
    }

    /// Current frame, or `None` if nothing has been stored yet
    pub fn get(&self) -> Option<Arc<Frame>> {
        self.frame.clone()
    }

    /// Replace the stored frame
    pub fn set(&mut self, frame: Frame) {
        self.frame = Some(Arc::new(frame));
    }
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriberStats {
    /// Messages handed to `on_message`
    pub received: u64,
    /// Messages converted and stored
    pub converted: u64,
    /// Messages that failed conversion
    pub rejected: u64,
}

/// Subscriber bound to one image topic
pub struct ImageSubscriber {
    handle: SubscriptionHandle,
    slot: FrameSlot,
    stats: SubscriberStats,
}

impl ImageSubscriber {
    /// Bind a subscription on the transport
    ///
    /// # Arguments
    /// * `transport` - Middleware runtime to subscribe through
    /// * `topic` - Image topic name (e.g. "/cones")
    ///
    /// # Returns
    /// The subscriber, or the transport error if the bind failed
    pub fn new(transport: &mut dyn Transport, topic: &str) -> Result<Self, TransportError> {
        let handle = transport.subscribe(topic)?;
        log::info!("Subscribed to image topic {}", handle);

        Ok(Self {
            handle,
            slot: FrameSlot::new(),
            stats: SubscriberStats::default(),
        })
    }

    /// Handle one inbound message
    ///
    /// Conversion failures are logged and absorbed; the stored frame is
    /// only replaced on success.
    ///
    /// # Returns
    /// `true` if the message replaced the stored frame
    pub fn on_message(&mut self, raw: &RawImage) -> bool {
        self.stats.received += 1;

        match to_bgr8(raw) {
            Ok(frame) => {
                log::trace!(
                    "Frame {}x{} from '{}'",
                    frame.width(),
                    frame.height(),
                    frame.frame_id()
                );
                self.slot.set(frame);
                self.stats.converted += 1;
                true
            }
            Err(err) => {
                log::error!("Failed to convert image: {}", err);
                self.stats.rejected += 1;
                false
            }
        }
    }

    /// Latest stored frame, `None` until the first successful conversion
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.slot.get()
    }

    /// Pump pending messages from the transport into `on_message`
    ///
    /// # Arguments
    /// * `transport` - Runtime the subscription lives on
    /// * `timeout` - Longest wait for a first message
    ///
    /// # Returns
    /// Number of messages delivered
    pub fn spin_once(
        &mut self,
        transport: &mut dyn Transport,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        let messages = transport.take(&self.handle, timeout)?;
        for raw in &messages {
            self.on_message(raw);
        }
        Ok(messages.len())
    }

    /// Tear down the subscription
    pub fn destroy(self, transport: &mut dyn Transport) -> Result<(), TransportError> {
        log::info!(
            "Unsubscribing {} ({} received, {} rejected)",
            self.handle,
            self.stats.received,
            self.stats.rejected
        );
        transport.unsubscribe(self.handle)
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    pub fn stats(&self) -> SubscriberStats {
        self.stats
    }
}
