use super::{LogLevel, Logger};

/// Forwards log lines to the `tracing` crate under the `vector_state` target.
///
/// `Verbose` maps to TRACE, `Debug` to DEBUG and `Warn` to WARN, so the
/// installed subscriber's filter applies on top of `min_level`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    tag: String,
    min_level: LogLevel,
}

impl TracingLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_min_level(tag, LogLevel::Verbose)
    }

    pub fn with_min_level(tag: impl Into<String>, min_level: LogLevel) -> Self {
        Self {
            tag: tag.into(),
            min_level,
        }
    }
}

impl Logger for TracingLogger {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn enabled(&self, level: LogLevel) -> bool {
        if level < self.min_level {
            return false;
        }
        match level {
            LogLevel::Verbose => tracing::enabled!(target: "vector_state", tracing::Level::TRACE),
            LogLevel::Debug => tracing::enabled!(target: "vector_state", tracing::Level::DEBUG),
            LogLevel::Warn => tracing::enabled!(target: "vector_state", tracing::Level::WARN),
        }
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Verbose => {
                tracing::trace!(target: "vector_state", tag = %self.tag, "{}", message)
            }
            LogLevel::Debug => {
                tracing::debug!(target: "vector_state", tag = %self.tag, "{}", message)
            }
            LogLevel::Warn => {
                tracing::warn!(target: "vector_state", tag = %self.tag, "{}", message)
            }
        }
    }
}
