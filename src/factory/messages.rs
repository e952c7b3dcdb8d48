//! Message sinks: where a running tool reports progress, warnings and errors.

use std::fmt;

/// Host-side message channel for one tool invocation
pub trait MessageSink {
    fn add_message(&mut self, message: &str);
    fn add_warning(&mut self, message: &str);
    fn add_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Sink that keeps every message in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<(Severity, String)>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(Severity, String)] {
        &self.entries
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.with_severity(Severity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MessageSink for MessageLog {
    fn add_message(&mut self, message: &str) {
        self.entries.push((Severity::Info, message.to_string()));
    }

    fn add_warning(&mut self, message: &str) {
        self.entries.push((Severity::Warning, message.to_string()));
    }

    fn add_error(&mut self, message: &str) {
        self.entries.push((Severity::Error, message.to_string()));
    }
}

/// Sink that forwards tool messages to the `log` facade
#[derive(Debug, Clone)]
pub struct LogSink {
    tool: String,
}

impl LogSink {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl MessageSink for LogSink {
    fn add_message(&mut self, message: &str) {
        log::info!("[{}] {}", self.tool, message);
    }

    fn add_warning(&mut self, message: &str) {
        log::warn!("[{}] {}", self.tool, message);
    }

    fn add_error(&mut self, message: &str) {
        log::error!("[{}] {}", self.tool, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_log_keeps_order() {
        let mut log = MessageLog::new();
        log.add_message("starting");
        log.add_warning("slow");
        log.add_error("failed");
        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.entries()[0], (Severity::Info, "starting".to_string()));
        assert_eq!(log.errors(), vec!["failed"]);
        assert_eq!(log.warnings(), vec!["slow"]);
    }

    #[test]
    fn test_message_log_through_trait_object() {
        let mut log = MessageLog::new();
        {
            let sink: &mut dyn MessageSink = &mut log;
            sink.add_error("boom");
        }
        assert!(!log.is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
