// Middleware module - Transport runtime and image message types
//
// This module provides:
// - The raw image message as it travels over the middleware (sensor_msgs/Image)
// - The Transport trait the subscriber and driver are written against
// - An in-memory loopback transport
// - A DDS transport speaking the ROS 2 wire conventions (feature "dds")

#[cfg(feature = "dds")]
pub mod dds;
pub mod memory;

#[cfg(feature = "dds")]
pub use dds::DdsTransport;
pub use memory::{InMemoryTransport, Publisher};

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Message timestamp (seconds + nanoseconds since epoch)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stamp {
    pub sec: i32,
    pub nanosec: u32,
}

/// Message header: acquisition time and the optical frame the image belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub stamp: Stamp,
    pub frame_id: String,
}

/// Uncompressed image message
///
/// Mirrors `sensor_msgs/Image`. `step` is the full row length in bytes and
/// may include padding past `width * bytes_per_pixel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawImage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: String,
    pub is_bigendian: u8,
    pub step: u32,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Create a tightly packed image message
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `encoding` - Pixel encoding name (e.g. "bgr8")
    /// * `bytes_per_pixel` - Size of one pixel in bytes, used to derive `step`
    /// * `data` - Pixel bytes, row-major
    pub fn packed(
        width: u32,
        height: u32,
        encoding: &str,
        bytes_per_pixel: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            header: Header::default(),
            height,
            width,
            encoding: encoding.to_string(),
            is_bigendian: 0,
            step: width * bytes_per_pixel,
            data,
        }
    }

    /// Attach a header to the message
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }
}

/// Live binding between a topic name and the subscriber that consumes it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    topic: String,
}

impl SubscriptionHandle {
    pub fn new(id: u64, topic: impl Into<String>) -> Self {
        Self {
            id,
            topic: topic.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} on '{}'", self.id, self.topic)
    }
}

/// Errors raised by a middleware transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The DDS layer rejected an operation
    #[error("DDS error: {0}")]
    Dds(String),

    /// The handle does not belong to a live subscription
    #[error("unknown subscription #{0}")]
    UnknownSubscription(u64),

    /// The runtime has already been shut down
    #[error("transport has been shut down")]
    Shutdown,
}

/// Middleware client runtime
///
/// Message delivery is pull-based: the owner pumps the transport by calling
/// [`Transport::take`] from its own loop, so no callback ever runs on a
/// middleware thread.
pub trait Transport {
    /// Bind a subscription to an image topic
    fn subscribe(&mut self, topic: &str) -> Result<SubscriptionHandle, TransportError>;

    /// Take every message pending on a subscription
    ///
    /// Waits at most `timeout` for the first message when none is pending,
    /// so the call always returns promptly. Returns an empty vector when
    /// nothing arrived.
    fn take(
        &mut self,
        handle: &SubscriptionHandle,
        timeout: Duration,
    ) -> Result<Vec<RawImage>, TransportError>;

    /// Tear down a subscription
    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), TransportError>;

    /// Shut the runtime down; later calls are no-ops
    fn shutdown(&mut self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_step() {
        let msg = RawImage::packed(4, 2, "bgr8", 3, vec![0; 24]);
        assert_eq!(msg.step, 12);
        assert_eq!(msg.encoding, "bgr8");
        assert_eq!(msg.is_bigendian, 0);
    }

    #[test]
    fn test_handle_display() {
        let handle = SubscriptionHandle::new(3, "/cones");
        assert_eq!(handle.to_string(), "#3 on '/cones'");
        assert_eq!(handle.id(), 3);
        assert_eq!(handle.topic(), "/cones");
    }
}
