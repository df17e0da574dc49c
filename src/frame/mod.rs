// Frame module - Decoded image samples
//
// A Frame is what the subscriber keeps after converting a raw message:
// tightly packed BGR8 pixels plus the metadata needed to display them.

pub mod convert;
pub mod encoding;

pub use convert::{to_bgr8, ConversionError};
pub use encoding::Encoding;

use crate::middleware::Stamp;

/// Bytes per pixel of the target layout (bgr8)
pub const BGR8_CHANNELS: usize = 3;

/// One decoded image in BGR8 layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
    frame_id: String,
    stamp: Stamp,
}

impl Frame {
    /// Wrap packed BGR8 pixel data
    ///
    /// # Panics
    /// Panics if `data` is not exactly `width * height * 3` bytes
    pub fn from_bgr8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * BGR8_CHANNELS,
            "BGR8 frame data must be width × height × 3 bytes"
        );

        Self {
            width,
            height,
            data,
            frame_id: String::new(),
            stamp: Stamp::default(),
        }
    }

    /// Attach source metadata
    pub fn with_source(mut self, frame_id: impl Into<String>, stamp: Stamp) -> Self {
        self.frame_id = frame_id.into();
        self.stamp = stamp;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        BGR8_CHANNELS
    }

    /// Bytes per row
    pub fn step(&self) -> usize {
        self.width as usize * BGR8_CHANNELS
    }

    /// Raw BGR8 bytes, row-major, no padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the frame and return its pixel bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// BGR triple at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        let offset = y as usize * self.step() + x as usize * BGR8_CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }
}
