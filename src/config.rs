// config.rs
// Purpose: Logging configuration fixed at process start

use crate::errors::{LogError, LogResult};
use crate::pretty_printer::{PrettyPrinter, DEFAULT_DATE_FORMAT, DEFAULT_EVENT_FORMAT};
use crate::session_context::DEFAULT_QUEUE_CAPACITY;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "spud.blog";

/// Console threshold when none is configured: debug builds show debug output
pub fn default_console_severity() -> Severity {
    if cfg!(debug_assertions) {
        Severity::Debug
    } else {
        Severity::Error
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Binary log file, relative paths resolve against the working directory
    pub log_file: PathBuf,
    /// Per-writer queue capacity in bytes
    pub queue_capacity: usize,
    /// Minimum severity for the colorized console output
    pub console_severity: Severity,
    /// Producer-side gate applied before events are queued
    pub min_severity: Severity,
    pub event_format: String,
    pub date_format: String,
    pub color: bool,
    /// Cadence of the host's idle drain, in milliseconds
    pub idle_interval_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            console_severity: default_console_severity(),
            min_severity: Severity::Trace,
            event_format: DEFAULT_EVENT_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            color: true,
            idle_interval_ms: 16,
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> LogResult<()> {
        if self.log_file.as_os_str().is_empty() {
            return Err(LogError::config("log_file cannot be empty"));
        }
        if self.queue_capacity == 0 {
            return Err(LogError::config("queue_capacity must be greater than zero"));
        }
        self.printer().map(|_| ())
    }

    pub fn printer(&self) -> LogResult<PrettyPrinter> {
        PrettyPrinter::new(&self.event_format, &self.date_format)
    }

    /// Apply `-v` flags: one lowers the console threshold to debug, two to trace
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.console_severity = match verbosity {
            0 => self.console_severity,
            1 => self.console_severity.min(Severity::Debug),
            _ => Severity::Trace,
        };
        self
    }
}
