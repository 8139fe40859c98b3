//! Bounded log shown in the UI console.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::logging::LineTag;

/// Severity of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Success,
    Error,
}

impl LogKind {
    fn tag(self) -> LineTag {
        match self {
            LogKind::Info => LineTag::Plain,
            LogKind::Success => LineTag::Success,
            LogKind::Error => LineTag::Error,
        }
    }
}

/// One console line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            message: message.into(),
        }
    }

    /// `[HH:MM:SS] [ERROR] message`
    pub fn render(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.kind.tag().apply(&self.message)
        )
    }
}

/// Keeps the most recent `max_lines` entries.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_lines: usize,
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_lines {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn capacity(&self) -> usize {
        self.max_lines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(2000)
    }
}
