// Fatal viewer errors
//
// Everything here ends the program. Per-message conversion failures never
// reach this type; the subscriber absorbs them.

use crate::config::ConfigError;
use crate::middleware::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("middleware error: {0}")]
    Transport(#[from] TransportError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("rendering error: {0}")]
    Render(#[from] pixels::Error),

    #[error("failed to resize pixel buffer: {0}")]
    Texture(#[from] pixels::TextureError),
}
