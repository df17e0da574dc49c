// Display module - Canvas and viewer window
//
// This module provides:
// - The canvas holding the picture currently on screen
// - The refresh step that swaps a BGR frame into RGB
// - Window creation and painting using winit + pixels

pub mod canvas;
pub mod window;

pub use canvas::{bgr_to_rgb, Canvas, Display};
pub use window::{ViewerWindow, WindowConfig, DEFAULT_TITLE};
