//! Update checker.
//!
//! Queries the release registry once, compares the latest tag with the
//! running version and reports the result. Failures are returned, never
//! retried.

mod checker;
mod version;

pub use checker::{
    evaluate, latest_release_url, CheckError, Release, UpdateChecker, UpdateStatus, VersionInfo,
};
pub use version::{is_newer, normalize};
