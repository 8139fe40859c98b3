//! Job request, outcome and progress event types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One of the four user-selected inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputField {
    /// Premiere Pro XML timeline export.
    Xml,
    /// Excel workbook holding the scores.
    Excel,
    /// Folder containing the source video files.
    Videos,
    /// Output video file.
    Output,
}

impl InputField {
    /// All fields in display order.
    pub const ALL: [InputField; 4] = [
        InputField::Xml,
        InputField::Excel,
        InputField::Videos,
        InputField::Output,
    ];

    /// Get display label for UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Xml => "XML",
            Self::Excel => "Excel",
            Self::Videos => "Videos",
            Self::Output => "Output",
        }
    }

    /// Whether a job may not start without this field.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Output)
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the worker needs for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Premiere Pro XML export.
    pub xml_path: PathBuf,
    /// Excel score sheet.
    pub excel_path: PathBuf,
    /// Folder holding the clips referenced by the XML.
    pub video_folder: PathBuf,
    /// Output video; the configured default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl JobRequest {
    /// Create a request with all four paths.
    pub fn new(
        xml_path: impl Into<PathBuf>,
        excel_path: impl Into<PathBuf>,
        video_folder: impl Into<PathBuf>,
        output_path: Option<PathBuf>,
    ) -> Self {
        Self {
            xml_path: xml_path.into(),
            excel_path: excel_path.into(),
            video_folder: video_folder.into(),
            output_path,
        }
    }

    /// Required fields that are still empty, in display order.
    pub fn missing_fields(&self) -> Vec<InputField> {
        let mut missing = Vec::new();
        if is_blank(&self.xml_path) {
            missing.push(InputField::Xml);
        }
        if is_blank(&self.excel_path) {
            missing.push(InputField::Excel);
        }
        if is_blank(&self.video_folder) {
            missing.push(InputField::Videos);
        }
        missing
    }

    /// Output path, falling back to `default` when unset or blank.
    pub fn resolved_output(&self, default: &Path) -> PathBuf {
        match &self.output_path {
            Some(path) if !is_blank(path) => path.clone(),
            _ => default.to_path_buf(),
        }
    }
}

pub(crate) fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    /// Worker exited with code 0.
    Success { message: String },
    /// Worker failed to launch, exited non-zero, or was terminated.
    Failure { message: String },
}

impl JobOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Failure { message } => message,
        }
    }
}

/// Which worker pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Stderr)
    }
}

/// Incremental update produced while a job runs. Display only, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Raw worker output line.
    LogLine { text: String, stream: OutputStream },
    /// Percentage derived from a `current/total` pattern.
    PercentUpdate(u8),
    /// Estimated time until the worker finishes.
    TimeRemaining(Duration),
}

impl ProgressEvent {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::LogLine {
            text: text.into(),
            stream: OutputStream::Stdout,
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self::LogLine {
            text: text.into(),
            stream: OutputStream::Stderr,
        }
    }
}

/// Folder used as the video source for a multi-file selection.
///
/// The worker takes a folder, while the user picks individual clips;
/// the parent of the first selected file wins.
pub fn video_folder_for(selection: &[PathBuf]) -> Option<PathBuf> {
    let first = selection.first()?;
    match first.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
        _ => Some(first.clone()),
    }
}
