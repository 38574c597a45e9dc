use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logger::{LogLevel, NoopLogger, SharedLogger, TracingLogger, DEFAULT_TAG};
use crate::state::StartMode;

/// Root configuration for stores created through
/// [`StoreBuilder::config`](crate::state::StoreBuilder::config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Whether processors start on creation or wait for `start()`.
    #[serde(default)]
    pub start_mode: StartMode,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Debug logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disabled loggers discard every line (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lowest level written (default: debug).
    #[serde(default = "default_level")]
    pub level: LogLevel,
    /// Tag attached to every line (default: "Vector").
    #[serde(default = "default_tag")]
    pub tag: String,
}

fn default_enabled() -> bool {
    true
}

fn default_level() -> LogLevel {
    LogLevel::Debug
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl LoggingConfig {
    /// The logger these settings describe.
    pub fn build_logger(&self) -> SharedLogger {
        if !self.enabled {
            return Arc::new(NoopLogger);
        }
        Arc::new(TracingLogger::with_min_level(self.tag.clone(), self.level))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            level: default_level(),
            tag: default_tag(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            start_mode: StartMode::Eager,
            logging: LoggingConfig::default(),
        }
    }
}
