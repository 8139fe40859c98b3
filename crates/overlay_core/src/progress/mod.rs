//! Progress parsing.
//!
//! Worker output is free text; any line containing `<int>/<int>` is read
//! as "current/total" work units. The percentage is a best-effort
//! estimate, not a guaranteed measure.

mod eta;
mod parser;

pub use eta::{format_remaining, ProgressTracker};
pub use parser::{parse, parse_fraction, Fraction};
