//! UI state machine.
//!
//! Owns everything the main window shows: the four input paths, the
//! current [`Phase`], the progress display and the log console. The UI
//! feeds user gestures and job events in and renders the result; all
//! transitions live here so they can be tested without a window.

mod log;
mod machine;

pub use log::{LogBuffer, LogEntry, LogKind};
pub use machine::{AppState, Phase, ProgressDisplay, TransitionError};
