//! Job controller.
//!
//! Validates a [`JobRequest`](crate::jobs::JobRequest), starts the worker,
//! and forwards each output line as a [`ProgressEvent`](crate::jobs::ProgressEvent)
//! until the job resolves to a [`JobOutcome`](crate::jobs::JobOutcome).
//!
//! At most one job is in flight per controller. Events travel over an
//! unbounded channel, one per output line, so a slow consumer never
//! stalls the worker's pipes.
//!
//! # Example
//!
//! ```no_run
//! use overlay_core::jobs::JobRequest;
//! use overlay_core::orchestrator::{ControllerOptions, JobController};
//! use overlay_core::worker::WorkerCommand;
//!
//! # async fn demo() {
//! let controller = JobController::new(
//!     WorkerCommand::new("python").arg("main.py"),
//!     ControllerOptions::default(),
//! );
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let request = JobRequest::new("match.xml", "scores.xlsx", "/clips", None);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = rx.recv().await {
//!         println!("{:?}", event);
//!     }
//! });
//! let outcome = controller.run_job(request, tx).await.unwrap();
//! println!("{}", outcome.message());
//! # }
//! ```

mod controller;
mod errors;

pub use controller::{ControllerOptions, JobController, JobRun, JobUpdate};
pub use errors::{ControllerError, ControllerResult};
