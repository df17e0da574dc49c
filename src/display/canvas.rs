// Canvas - The currently displayed picture and the refresh step that fills it
//
// Frames arrive in BGR order; the canvas holds RGB. A refresh either
// replaces the whole picture or leaves it untouched.

use crate::frame::Frame;
use image::RgbImage;

/// Picture shown in the window
#[derive(Debug, Default)]
pub struct Canvas {
    image: Option<RgbImage>,
    generation: u64,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the picture wholesale
    pub fn replace(&mut self, image: RgbImage) {
        self.image = Some(image);
        self.generation += 1;
    }

    /// Current picture, `None` until the first paint
    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    /// Number of pictures painted so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Picture dimensions
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(RgbImage::dimensions)
    }

    /// Write the picture as RGBA into `output`
    ///
    /// # Panics
    /// Panics if output is smaller than width × height × 4 bytes
    pub fn to_rgba(&self, output: &mut [u8]) {
        let Some(image) = &self.image else {
            return;
        };
        let (width, height) = image.dimensions();
        assert!(
            output.len() >= width as usize * height as usize * 4,
            "Output buffer too small for RGBA conversion"
        );

        for (dst, src) in output.chunks_exact_mut(4).zip(image.pixels()) {
            dst[0] = src[0]; // R
            dst[1] = src[1]; // G
            dst[2] = src[2]; // B
            dst[3] = 0xFF; // A
        }
    }
}

/// Swap a BGR frame into an RGB picture
///
/// # Returns
/// `None` if the frame's buffer does not cover its dimensions
pub fn bgr_to_rgb(frame: &Frame) -> Option<RgbImage> {
    let mut image = RgbImage::from_raw(frame.width(), frame.height(), frame.as_bytes().to_vec())?;
    image.pixels_mut().for_each(|px| px.0.swap(0, 2));
    Some(image)
}

/// Display state: the canvas and the refresh operation
#[derive(Debug, Default)]
pub struct Display {
    canvas: Canvas,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaint from the latest frame
    ///
    /// # Arguments
    /// * `latest` - Latest frame, or `None` if nothing has arrived yet
    ///
    /// # Returns
    /// `true` if the canvas was replaced
    pub fn refresh(&mut self, latest: Option<&Frame>) -> bool {
        let Some(frame) = latest else {
            return false;
        };

        match bgr_to_rgb(frame) {
            Some(image) => {
                self.canvas.replace(image);
                true
            }
            None => {
                log::error!(
                    "Frame buffer does not cover {}x{}, skipping refresh",
                    frame.width(),
                    frame.height()
                );
                false
            }
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_without_frame_is_noop() {
        let mut display = Display::new();
        for _ in 0..3 {
            assert!(!display.refresh(None));
        }
        assert!(display.canvas().image().is_none());
        assert_eq!(display.canvas().generation(), 0);
    }

    #[test]
    fn test_refresh_swaps_channels() {
        let frame = Frame::from_bgr8(2, 1, vec![10, 20, 30, 1, 2, 3]);
        let mut display = Display::new();

        assert!(display.refresh(Some(&frame)));

        let image = display.canvas().image().unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(0, 0).0, [30, 20, 10]);
        assert_eq!(image.get_pixel(1, 0).0, [3, 2, 1]);
    }

    #[test]
    fn test_refresh_replaces_previous() {
        let mut display = Display::new();
        display.refresh(Some(&Frame::from_bgr8(1, 1, vec![1, 1, 1])));
        display.refresh(Some(&Frame::from_bgr8(2, 2, vec![0; 12])));

        assert_eq!(display.canvas().dimensions(), Some((2, 2)));
        assert_eq!(display.canvas().generation(), 2);
    }

    #[test]
    fn test_no_frame_after_paint_keeps_picture() {
        let mut display = Display::new();
        display.refresh(Some(&Frame::from_bgr8(1, 1, vec![4, 5, 6])));
        display.refresh(None);

        assert_eq!(display.canvas().image().unwrap().get_pixel(0, 0).0, [6, 5, 4]);
        assert_eq!(display.canvas().generation(), 1);
    }

    #[test]
    fn test_to_rgba() {
        let mut canvas = Canvas::new();
        canvas.replace(RgbImage::from_raw(1, 1, vec![0x66, 0x77, 0x88]).unwrap());

        let mut rgba = vec![0u8; 4];
        canvas.to_rgba(&mut rgba);
        assert_eq!(rgba, vec![0x66, 0x77, 0x88, 0xFF]);
    }

    #[test]
    #[should_panic(expected = "Output buffer too small for RGBA conversion")]
    fn test_to_rgba_small_buffer() {
        let mut canvas = Canvas::new();
        canvas.replace(RgbImage::new(2, 2));
        canvas.to_rgba(&mut [0u8; 8]);
    }
}
