//! `current/total` extraction from free-form worker output.

use once_cell::sync::Lazy;
use regex::Regex;

static FRACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)/([0-9]+)").expect("valid fraction regex"));

/// Work units reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub current: u64,
    pub total: u64,
}

impl Fraction {
    /// `round(100 * current / total)`, clamped to 100.
    ///
    /// `None` when `total` is zero.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let percent = (self.current as f64 * 100.0 / self.total as f64).round();
        Some(percent.min(100.0) as u8)
    }
}

/// First `<int>/<int>` pair of ASCII digits in `chunk`.
///
/// Numbers too large for `u64` saturate at `u64::MAX`.
pub fn parse_fraction(chunk: &str) -> Option<Fraction> {
    let caps = FRACTION_RE.captures(chunk)?;
    Some(Fraction {
        current: saturating_parse(caps.get(1)?.as_str()),
        total: saturating_parse(caps.get(2)?.as_str()),
    })
}

/// `digits` holds only ASCII digits, so overflow is the only failure.
fn saturating_parse(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

/// Percentage for the first `<int>/<int>` pair in `chunk`, if any.
pub fn parse(chunk: &str) -> Option<u8> {
    parse_fraction(chunk)?.percent()
}
