//! Error types for the job controller.
//!
//! Launch and runtime failures of the worker are not errors here: they
//! resolve the job with a `JobOutcome::Failure`. Only requests that never
//! start a worker are rejected with a `ControllerError`.

use thiserror::Error;

use crate::jobs::ValidationError;

/// A job request the controller refused to start.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Required inputs are missing; no worker was started.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another job is still in flight.
    #[error("A video is already being generated")]
    Busy,
}

impl ControllerError {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;
