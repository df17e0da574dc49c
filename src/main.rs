// ROS 2 Image Viewer - Main Entry Point
//
// Joins the DDS domain, subscribes to the configured image topic and shows
// the latest frame until the window is closed.

use env_logger::Env;
use topic_viewer::config::{ViewerConfig, CONFIG_FILE};
use topic_viewer::{run_viewer, DdsTransport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    log::info!("ROS2 Image Viewer (topic-viewer) v{}", env!("CARGO_PKG_VERSION"));

    let config = ViewerConfig::load_or_default(CONFIG_FILE);
    config.validate()?;

    // Middleware runtime first; run_viewer binds the subscriber and tears
    // both down after the window closes
    let transport = DdsTransport::new(config.domain_id).map_err(|e| {
        log::error!("Failed to initialise middleware: {}", e);
        e
    })?;

    if let Err(e) = run_viewer(config, Box::new(transport)) {
        log::error!("Viewer stopped: {}", e);
        return Err(e.into());
    }

    log::info!("Viewer window closed.");
    Ok(())
}
