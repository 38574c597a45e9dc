use parking_lot::Mutex;

use super::{LogLevel, Logger};

/// Logger that keeps every line in memory as `"{tag}: {message}"`.
pub struct MemoryLogger {
    tag: String,
    min_level: LogLevel,
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_min_level(tag, LogLevel::Verbose)
    }

    pub fn with_min_level(tag: impl Into<String>, min_level: LogLevel) -> Self {
        Self {
            tag: tag.into(),
            min_level,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of captured lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Logger for MemoryLogger {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn log(&self, _level: LogLevel, message: &str) {
        self.lines.lock().push(format!("{}: {}", self.tag, message));
    }
}

/// Logger that writes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn tag(&self) -> &str {
        ""
    }

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }

    fn log(&self, _level: LogLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LoggerExt;

    #[test]
    fn memory_logger_prefixes_tag() {
        let logger = MemoryLogger::new("StringLogger");
        logger.logd(|| "42".to_string());

        let lines = logger.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("StringLogger"));
        assert!(logger.contains("42"));
    }

    #[test]
    fn memory_logger_respects_min_level() {
        let logger = MemoryLogger::with_min_level("t", LogLevel::Debug);
        logger.logv(|| "dropped".to_string());
        logger.logw(|| "kept".to_string());
        assert_eq!(logger.lines(), vec!["t: kept".to_string()]);
    }

    #[test]
    fn noop_logger_is_never_enabled() {
        assert!(!NoopLogger.enabled(LogLevel::Warn));
    }
}
