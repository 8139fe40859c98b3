//! Logging infrastructure for Padel Overlay.
//!
//! This module provides:
//! - Application-wide `tracing` setup (stderr, optionally a rolling file)
//! - Per-job log files with a tail buffer for failure diagnosis
//!
//! # Example
//!
//! ```no_run
//! use overlay_core::jobs::{JobOutcome, OutputStream};
//! use overlay_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("job_1", "/path/to/logs", LogConfig::default()).unwrap();
//! logger.begin("Generate overlay", "python main.py --xml a.xml ...");
//! logger.worker_line("[1/10] Processing clip", OutputStream::Stdout);
//! logger.outcome(&JobOutcome::success("Video generated"));
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LineTag, LogConfig, LogLevel};

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix for the rolling application log.
const APP_LOG_PREFIX: &str = "padel-overlay.log";

/// Initialize global tracing subscriber for application-wide logging.
///
/// Respects the RUST_LOG environment variable and falls back to the
/// provided default level. Outputs to stderr.
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Initialize tracing to stderr plus a daily rolling file in `logs_dir`.
///
/// The returned guard must be held for the lifetime of the application,
/// otherwise buffered file output is lost. Falls back to stderr only
/// (returning `None`) when the logs directory cannot be created.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(logs_dir) {
        init_tracing(default_level);
        tracing::warn!("Cannot create logs folder {}: {}", logs_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(logs_dir, APP_LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level.to_tracing_level()).into())
        .from_env_lossy()
}
