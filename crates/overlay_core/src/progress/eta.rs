//! Time-remaining estimate from observed progress.

use std::time::{Duration, Instant};

use super::parser::Fraction;

/// Extrapolates remaining time from the average time per completed unit.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    started: Instant,
}

impl ProgressTracker {
    /// Start tracking from `now`.
    pub fn new(started: Instant) -> Self {
        Self { started }
    }

    /// Remaining time given `fraction` observed at `now`.
    ///
    /// `None` before the first unit completes, once the work is done, or
    /// when the estimate does not fit a `Duration`.
    pub fn estimate(&self, fraction: Fraction, now: Instant) -> Option<Duration> {
        if fraction.current == 0 || fraction.current >= fraction.total {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let per_unit = elapsed.as_secs_f64() / fraction.current as f64;
        let remaining = per_unit * (fraction.total - fraction.current) as f64;
        Duration::try_from_secs_f64(remaining).ok()
    }
}

/// Format a duration as `42s` or `1m05s`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let mins = secs / 60;
    let secs = secs % 60;
    if mins > 0 {
        format!("{}m{:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
