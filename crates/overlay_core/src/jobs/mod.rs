//! Job data model shared by the controller, the state machine and the UI.

mod types;
mod validation;

pub use types::{
    video_folder_for, InputField, JobOutcome, JobRequest, OutputStream, ProgressEvent,
};
pub use validation::ValidationError;
