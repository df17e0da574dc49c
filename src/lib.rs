// ROS 2 Image Topic Viewer Library
// Subscribes to an image topic and shows the latest frame in a window

// Public modules
pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod middleware;
pub mod subscriber;
pub mod timer;
pub mod viewer;

// Re-export main types for convenience
pub use config::{ConfigError, TimerConfig, ViewerConfig};
pub use display::{Canvas, Display, ViewerWindow, WindowConfig};
pub use error::ViewerError;
pub use frame::{ConversionError, Encoding, Frame};
#[cfg(feature = "dds")]
pub use middleware::DdsTransport;
pub use middleware::{
    InMemoryTransport, Publisher, RawImage, SubscriptionHandle, Transport, TransportError,
};
pub use subscriber::{FrameSlot, ImageSubscriber, SubscriberStats};
pub use timer::IntervalTimer;
pub use viewer::{run_viewer, LifecycleState, Session, ViewerApp};
