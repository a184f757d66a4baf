// severity.rs
// Purpose: Ordered event severities, their short tags and console colors

use crate::errors::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ANSI sequence that clears any color set by [`Severity::color`].
pub const COLOR_RESET: &str = "\x1b[0m";

/// Severity classifies a log event. Variants are declared in ascending order.
///
/// `NoLogs` is never attached to an event; used as a threshold it lets
/// nothing through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    NoLogs,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Four letter tag used by the `%S` format token
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Trace => "TRAC",
            Severity::Debug => "DEBG",
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "EROR",
            Severity::Critical => "CRIT",
            Severity::NoLogs => "NOLG",
        }
    }

    /// ANSI color prefix for console output
    pub fn color(self) -> &'static str {
        match self {
            Severity::Trace => "\x1b[38;5;7m",          // Gray
            Severity::Debug => "\x1b[36m",              // Cyan
            Severity::Info => "\x1b[32m",               // Green
            Severity::Warning => "\x1b[1;33m",          // Bold yellow
            Severity::Error => "\x1b[1;31m",            // Bold red
            Severity::Critical => "\x1b[1;37m\x1b[41m", // Bold white on red
            Severity::NoLogs => COLOR_RESET,
        }
    }

    /// Whether an event of this severity passes `threshold`
    pub fn passes(self, threshold: Severity) -> bool {
        self != Severity::NoLogs && self >= threshold
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Severity {
        match value {
            0 => Severity::Trace,
            1 => Severity::Debug,
            2 => Severity::Info,
            3 => Severity::Warning,
            4 => Severity::Error,
            5 => Severity::Critical,
            _ => Severity::NoLogs,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
            Severity::NoLogs => "no_logs",
        };
        f.write_str(name)
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "trac" => Ok(Severity::Trace),
            "debug" | "debg" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "eror" => Ok(Severity::Error),
            "critical" | "crit" => Ok(Severity::Critical),
            "no_logs" | "off" | "none" => Ok(Severity::NoLogs),
            other => Err(LogError::invalid_severity(other)),
        }
    }
}
