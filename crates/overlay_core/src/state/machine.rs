//! Application state and its transitions.
//!
//! `Idle -> Validating -> Running -> (Succeeded | Failed) -> Idle`.
//! `Running` is only ever entered from `Idle`.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::log::{LogBuffer, LogEntry, LogKind};
use crate::config::PathSettings;
use crate::jobs::{
    video_folder_for, InputField, JobOutcome, JobRequest, ProgressEvent, ValidationError,
};
use crate::progress::format_remaining;

/// Video names listed individually before the rest are summarized.
const LISTED_VIDEOS: usize = 5;

const BANNER: &str = "==================================================";

/// Where the application is in the generate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Running => "running",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A generate request the state machine refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot start a job while {0}")]
    NotIdle(Phase),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Progress bar and time-remaining label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDisplay {
    pub percent: u8,
    pub visible: bool,
    /// Formatted estimate, e.g. `1m05s`.
    pub remaining: Option<String>,
}

/// Everything the main window renders.
#[derive(Debug, Clone)]
pub struct AppState {
    draft: JobRequest,
    /// Text shown in the video row; differs from the folder for multi-selections.
    video_label: String,
    phase: Phase,
    progress: ProgressDisplay,
    log: LogBuffer,
}

impl AppState {
    pub fn new(max_log_lines: usize) -> Self {
        Self {
            draft: JobRequest::default(),
            video_label: String::new(),
            phase: Phase::Idle,
            progress: ProgressDisplay::default(),
            log: LogBuffer::new(max_log_lines),
        }
    }

    /// Restore the last used inputs.
    pub fn from_settings(paths: &PathSettings, max_log_lines: usize) -> Self {
        let mut state = Self::new(max_log_lines);
        state.draft.xml_path = PathBuf::from(&paths.xml_path);
        state.draft.excel_path = PathBuf::from(&paths.excel_path);
        state.draft.video_folder = PathBuf::from(&paths.video_folder);
        state.video_label = paths.video_folder.clone();
        state.set_output_text(&paths.output_path);
        state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> &ProgressDisplay {
        &self.progress
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn can_generate(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Validating | Phase::Running)
    }

    /// Inputs as currently entered, without validation.
    pub fn request_draft(&self) -> JobRequest {
        self.draft.clone()
    }

    /// Text for a path row.
    pub fn field_text(&self, field: InputField) -> String {
        match field {
            InputField::Xml => display(&self.draft.xml_path),
            InputField::Excel => display(&self.draft.excel_path),
            InputField::Videos => self.video_label.clone(),
            InputField::Output => self
                .draft
                .output_path
                .as_deref()
                .map(display)
                .unwrap_or_default(),
        }
    }

    /// Store a path picked in a dialog and confirm it in the log.
    pub fn select_path(&mut self, field: InputField, path: PathBuf) {
        let name = file_name(&path);
        match field {
            InputField::Xml => {
                self.log_info(format!("XML selected: {}", name));
                self.draft.xml_path = path;
            }
            InputField::Excel => {
                self.log_info(format!("Excel selected: {}", name));
                self.draft.excel_path = path;
            }
            InputField::Videos => {
                self.log_info(format!("Video folder selected: {}", path.display()));
                self.video_label = display(&path);
                self.draft.video_folder = path;
            }
            InputField::Output => {
                self.log_info(format!("Output: {}", name));
                self.draft.output_path = Some(path);
            }
        }
    }

    /// Use the folder of a multi-file video selection.
    pub fn select_videos(&mut self, files: &[PathBuf]) {
        let Some(folder) = video_folder_for(files) else {
            return;
        };

        if let [only] = files {
            self.video_label = display(only);
            self.log_info(format!("✓ 1 video file selected: {}", file_name(only)));
        } else {
            self.video_label = format!("{} files in {}", files.len(), folder.display());
            self.log_info(format!("✓ {} video files selected:", files.len()));
            for file in files.iter().take(LISTED_VIDEOS) {
                self.log_info(format!("    • {}", file_name(file)));
            }
            if files.len() > LISTED_VIDEOS {
                self.log_info(format!("    ... and {} more", files.len() - LISTED_VIDEOS));
            }
        }

        self.draft.video_folder = folder;
    }

    /// Typed edit of a path row. Not logged.
    pub fn edit_field(&mut self, field: InputField, text: &str) {
        match field {
            InputField::Xml => self.draft.xml_path = PathBuf::from(text),
            InputField::Excel => self.draft.excel_path = PathBuf::from(text),
            InputField::Videos => {
                self.draft.video_folder = PathBuf::from(text);
                self.video_label = text.to_string();
            }
            InputField::Output => self.set_output_text(text),
        }
    }

    /// Free-text output path; blank means the configured default.
    pub fn set_output_text(&mut self, text: &str) {
        self.draft.output_path = if text.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(text))
        };
    }

    /// Validate the inputs and enter `Running`.
    ///
    /// On validation failure the error is logged and the state is back to
    /// `Idle`; no job may be started.
    pub fn begin_generate(&mut self) -> Result<JobRequest, TransitionError> {
        if self.phase != Phase::Idle {
            return Err(TransitionError::NotIdle(self.phase));
        }

        self.phase = Phase::Validating;
        if let Err(e) = self.draft.validate() {
            self.log_error(e.to_string());
            self.phase = Phase::Idle;
            return Err(e.into());
        }

        self.phase = Phase::Running;
        self.progress = ProgressDisplay {
            percent: 0,
            visible: true,
            remaining: None,
        };

        self.log_info(BANNER);
        self.log_info("STARTING PROCESSING");
        self.log_info(BANNER);

        Ok(self.draft.clone())
    }

    /// Reflect a job event. Ignored outside `Running`.
    pub fn apply_event(&mut self, event: &ProgressEvent) {
        if self.phase != Phase::Running {
            return;
        }

        match event {
            ProgressEvent::LogLine { text, stream } => {
                if stream.is_error() {
                    self.log_error(text.clone());
                } else {
                    self.log_info(text.clone());
                }
            }
            ProgressEvent::PercentUpdate(percent) => {
                self.progress.percent = (*percent).min(100);
            }
            ProgressEvent::TimeRemaining(remaining) => {
                self.progress.remaining = Some(format_remaining(*remaining));
            }
        }
    }

    /// Record the job's outcome and return to `Idle`.
    ///
    /// Returns the terminal phase passed through (`Succeeded` or `Failed`).
    /// Outside `Running` the outcome is ignored and the current phase is
    /// returned.
    pub fn finish(&mut self, outcome: &JobOutcome) -> Phase {
        if self.phase != Phase::Running {
            tracing::debug!("Ignoring job outcome while {}", self.phase);
            return self.phase;
        }

        let terminal = match outcome {
            JobOutcome::Success { message } => {
                self.progress.percent = 100;
                self.log_info(BANNER);
                self.log_success(message.clone());
                self.log_info(BANNER);
                Phase::Succeeded
            }
            JobOutcome::Failure { message } => {
                self.log_info(BANNER);
                self.log_error(message.clone());
                self.log_info(BANNER);
                Phase::Failed
            }
        };

        tracing::debug!("Job finished: {}", terminal);

        self.progress.visible = false;
        self.progress.remaining = None;
        self.phase = Phase::Idle;
        terminal
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log.push(LogEntry::new(LogKind::Info, message));
    }

    pub fn log_success(&mut self, message: impl Into<String>) {
        self.log.push(LogEntry::new(LogKind::Success, message));
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log.push(LogEntry::new(LogKind::Error, message));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LogBuffer::default().capacity())
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| display(path))
}
