//! Overlay Core - Backend logic for Padel Overlay
//!
//! This crate contains all business logic with zero UI dependencies:
//! supervising the external overlay worker, turning its output into
//! progress events, and the state machine the desktop shell renders.
//! It can be used by the GUI application or a CLI tool.

pub mod config;
pub mod jobs;
pub mod logging;
pub mod orchestrator;
pub mod progress;
pub mod state;
pub mod update;
pub mod worker;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
