//! Error types for the worker process adapter.

use std::io;

use thiserror::Error;

/// Failure to start or supervise the external worker.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The executable could not be found or spawned.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A piped stream was not available after spawning.
    #[error("worker {0} pipe unavailable")]
    MissingPipe(&'static str),

    /// Waiting for or killing the process failed.
    #[error("failed to wait for worker: {0}")]
    Wait(#[source] io::Error),
}

impl WorkerError {
    /// Create a launch error.
    pub fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }

    /// Whether the worker never started.
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::MissingPipe(_))
    }
}

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;
