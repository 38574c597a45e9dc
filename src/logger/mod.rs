//! Logging seam for the state store.
//!
//! Every component receives an explicit [`Logger`] at construction instead of
//! consulting a process-wide switch. [`TracingLogger`] forwards to `tracing`,
//! [`NoopLogger`] discards everything and [`MemoryLogger`] captures lines so
//! tests can assert on them.

mod init;
mod memory;
mod tracing_logger;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use init::init_tracing;
pub use memory::{MemoryLogger, NoopLogger};
pub use tracing_logger::TracingLogger;

/// Tag used when no explicit tag is configured.
pub const DEFAULT_TAG: &str = "Vector";

/// Severity of a log line, ordered from most to least chatty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-job chatter (enqueue, dispatch, skip).
    Verbose,
    /// Lifecycle events (start, clear).
    Debug,
    /// Isolated failures that did not stop the store.
    Warn,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Verbose => write!(f, "verbose"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Warn => write!(f, "warn"),
        }
    }
}

/// Output sink for debug logs.
///
/// Implementations decide where lines go (tracing, memory, nowhere).
pub trait Logger: Send + Sync {
    /// A name tag associated with this logger for identification and filtering.
    fn tag(&self) -> &str;

    /// Whether a line at `level` would be written.
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }

    /// Write `message` at `level`.
    fn log(&self, level: LogLevel, message: &str);
}

/// Shared logger handle passed into holders, processors and stores.
pub type SharedLogger = Arc<dyn Logger>;

/// Lazy logging helpers: the message closure only runs when the level is enabled.
pub trait LoggerExt {
    fn logv(&self, message: impl FnOnce() -> String);
    fn logd(&self, message: impl FnOnce() -> String);
    fn logw(&self, message: impl FnOnce() -> String);
}

impl<L: Logger + ?Sized> LoggerExt for L {
    fn logv(&self, message: impl FnOnce() -> String) {
        log_lazy(self, LogLevel::Verbose, message);
    }

    fn logd(&self, message: impl FnOnce() -> String) {
        log_lazy(self, LogLevel::Debug, message);
    }

    fn logw(&self, message: impl FnOnce() -> String) {
        log_lazy(self, LogLevel::Warn, message);
    }
}

fn log_lazy<L: Logger + ?Sized>(logger: &L, level: LogLevel, message: impl FnOnce() -> String) {
    if logger.enabled(level) {
        logger.log(level, &message());
    }
}

/// The logger used when callers do not inject one.
pub fn default_logger() -> SharedLogger {
    Arc::new(TracingLogger::new(DEFAULT_TAG))
}
