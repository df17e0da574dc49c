// Window module - Viewer window and its pixel surface
//
// The pixel buffer follows the size of the picture being shown; the
// surface follows the window. pixels scales the buffer into the surface
// and letterboxes when the aspect ratios differ.

use super::canvas::Canvas;
use crate::error::ViewerError;
use pixels::{Pixels, SurfaceTexture};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

/// Caption of the viewer window
pub const DEFAULT_TITLE: &str = "ROS2 Image Viewer";

/// Window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window caption
    pub title: String,
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
}

impl WindowConfig {
    /// Create a new window configuration with default values
    ///
    /// Default: "ROS2 Image Viewer", 640×480
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: 640,
            height: 480,
        }
    }

    /// Set the caption
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a picture fits in a GPU texture
///
/// # Arguments
/// * `width`, `height` - picture size in pixels
/// * `max_dimension` - the device's `max_texture_dimension_2d`
pub fn fits_texture(width: u32, height: u32, max_dimension: u32) -> bool {
    width > 0 && height > 0 && width <= max_dimension && height <= max_dimension
}

/// Window plus the pixel surface drawn into it
pub struct ViewerWindow {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_size: (u32, u32),
    max_texture_dimension: u32,
    /// Last picture size that could not be shown, so it is reported once
    rejected_size: Option<(u32, u32)>,
}

impl ViewerWindow {
    /// Create the window and its surface
    ///
    /// The pixel buffer starts at the window size and is cleared to black
    /// until the first picture arrives.
    pub fn create(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Self, ViewerError> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let window_size = window.inner_size();

        // Surface texture takes the Arc so the surface can be 'static
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        let pixels = Pixels::new(config.width, config.height, surface_texture)?;
        let max_texture_dimension = pixels.device().limits().max_texture_dimension_2d;

        log::info!(
            "Window '{}' created ({}x{}, max texture {})",
            config.title,
            window_size.width,
            window_size.height,
            max_texture_dimension
        );

        Ok(Self {
            window,
            pixels,
            buffer_size: (config.width, config.height),
            max_texture_dimension,
            rejected_size: None,
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Follow a window resize
    ///
    /// A zero-sized window (minimised) keeps the previous surface.
    pub fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), ViewerError> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(size.width, size.height)?;
        Ok(())
    }

    /// Paint the canvas and present it
    ///
    /// A picture the pixel buffer cannot take (larger than the GPU texture
    /// limit) is skipped with a warning and the previous buffer contents are
    /// presented again. Only surface/render failures are errors.
    pub fn paint(&mut self, canvas: &Canvas) -> Result<(), ViewerError> {
        match canvas.dimensions() {
            Some(size) if self.ensure_buffer(size) => {
                canvas.to_rgba(self.pixels.frame_mut());
            }
            Some(_) => {}
            None => self.pixels.frame_mut().fill(0),
        }

        self.pixels.render()?;
        Ok(())
    }

    /// Resize the pixel buffer to `size`; false if it cannot hold it
    fn ensure_buffer(&mut self, (width, height): (u32, u32)) -> bool {
        if (width, height) == self.buffer_size {
            return true;
        }

        let max = self.max_texture_dimension;
        if !fits_texture(width, height, max) {
            self.reject((width, height), format_args!("exceeds texture limit {}", max));
            return false;
        }

        if let Err(e) = self.pixels.resize_buffer(width, height) {
            self.reject((width, height), format_args!("{}", e));
            return false;
        }

        self.buffer_size = (width, height);
        self.rejected_size = None;
        log::debug!("Pixel buffer resized to {}x{}", width, height);
        true
    }

    fn reject(&mut self, size: (u32, u32), reason: std::fmt::Arguments<'_>) {
        if self.rejected_size != Some(size) {
            log::warn!(
                "Cannot display {}x{} picture ({}), keeping previous picture",
                size.0,
                size.1,
                reason
            );
            self.rejected_size = Some(size);
        }
    }
}
