//! Log levels, job log configuration and line tags.

use serde::{Deserialize, Serialize};

/// Severity threshold, shared by the application log and job logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// How a job log file is written.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Records below this level are not written.
    pub level: LogLevel,
    /// Worker output lines replayed after a failure; 0 disables the replay.
    pub error_tail: usize,
    /// Prefix each record with `[HH:MM:SS]`.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            error_tail: 20,
            show_timestamps: true,
        }
    }
}

/// Marker put in front of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    /// `$ python main.py ...`
    Command,
    /// `=== Generate overlay ===`
    Phase,
    /// `[stderr] ...`
    Stderr,
    /// `[SUCCESS] ...`
    Success,
    /// `[ERROR] ...`
    Error,
    Plain,
}

impl LineTag {
    pub fn apply(self, message: &str) -> String {
        match self {
            LineTag::Command => format!("$ {message}"),
            LineTag::Phase => format!("=== {message} ==="),
            LineTag::Stderr => format!("[stderr] {message}"),
            LineTag::Success => format!("[SUCCESS] {message}"),
            LineTag::Error => format!("[ERROR] {message}"),
            LineTag::Plain => message.to_string(),
        }
    }
}
