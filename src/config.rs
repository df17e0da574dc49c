// Configuration - Topic, domain, timer and window settings
//
// Defaults reproduce the reference viewer: topic "/cones", a 10 ms pump
// and a 100 ms refresh. A TOML file may override any subset of fields; the
// viewer only reads it and never writes one.

use crate::display::WindowConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "viewer_config.toml";

/// Default image topic
pub const DEFAULT_TOPIC: &str = "/cones";

/// Largest domain id ROS 2 accepts
const MAX_DOMAIN_ID: i32 = 232;

/// Errors while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Pump and refresh timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// How often pending middleware messages are delivered (ms)
    pub pump_interval_ms: u64,

    /// Longest the pump waits for a first message (ms)
    pub pump_timeout_ms: u64,

    /// How often the display repaints from the latest frame (ms)
    pub refresh_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pump_interval_ms: 10,
            pump_timeout_ms: 1,
            refresh_interval_ms: 100,
        }
    }
}

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Image topic to subscribe to
    pub topic: String,

    /// DDS domain (ROS_DOMAIN_ID)
    pub domain_id: i32,

    /// Timer settings
    pub timers: TimerConfig,

    /// Window settings
    pub window: WindowConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            domain_id: 0,
            timers: TimerConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the DDS domain
    pub fn with_domain_id(mut self, domain_id: i32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Set the pump interval
    pub fn with_pump_interval(mut self, interval: Duration) -> Self {
        self.timers.pump_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the refresh interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.timers.refresh_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the window settings
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    pub fn pump_interval(&self) -> Duration {
        Duration::from_millis(self.timers.pump_interval_ms)
    }

    pub fn pump_timeout(&self) -> Duration {
        Duration::from_millis(self.timers.pump_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.timers.refresh_interval_ms)
    }

    /// Check values the viewer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("topic must not be empty".to_string()));
        }
        if !(0..=MAX_DOMAIN_ID).contains(&self.domain_id) {
            return Err(ConfigError::Invalid(format!(
                "domain_id {} is outside 0..={}",
                self.domain_id, MAX_DOMAIN_ID
            )));
        }
        if self.timers.pump_interval_ms == 0 || self.timers.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "timer intervals must be at least 1 ms".to_string(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from file, falling back to defaults
    ///
    /// A missing file is the normal case and is not reported above debug
    /// level. An unreadable or invalid file is reported as a warning.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(config) => {
                log::info!("Configuration loaded from '{}'", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at '{}', using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not load config ({}), using defaults", e);
                Self::default()
            }
        }
    }
}
