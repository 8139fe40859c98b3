//! Worker process adapter.
//!
//! Spawns the external overlay generator with the four input paths and
//! exposes its stdout/stderr as line chunks plus a terminal exit status.
//! Only one worker should run at a time; that rule is enforced by the
//! job controller, not here.

mod command;
mod errors;
mod process;

pub use command::WorkerCommand;
pub use errors::{WorkerError, WorkerResult};
pub use process::{WorkerChunk, WorkerExit, WorkerProcess};
