//! Worker invocation builder.
//!
//! The worker contract is:
//! `<program> [leading args...] --xml <path> --excel <path> --videos <folder> --output <path>`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::jobs::JobRequest;

/// How to launch the external overlay worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    /// Executable (interpreter or standalone binary).
    pub program: PathBuf,
    /// Arguments placed before the input flags, e.g. the script path.
    pub leading_args: Vec<OsString>,
    /// Working directory; inherited when `None`.
    pub working_dir: Option<PathBuf>,
}

impl WorkerCommand {
    /// Create a command with no leading arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Full argument list for a request (leading args + one flag per input).
    pub fn arguments(&self, request: &JobRequest, default_output: &Path) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        let output = request.resolved_output(default_output);

        for (flag, value) in [
            ("--xml", request.xml_path.as_os_str()),
            ("--excel", request.excel_path.as_os_str()),
            ("--videos", request.video_folder.as_os_str()),
            ("--output", output.as_os_str()),
        ] {
            args.push(OsString::from(flag));
            args.push(value.to_os_string());
        }

        args
    }

    /// Printable command line for logs.
    pub fn display(&self, request: &JobRequest, default_output: &Path) -> String {
        std::iter::once(self.program.as_os_str().to_os_string())
            .chain(self.arguments(request, default_output))
            .map(|part| {
                let part = part.to_string_lossy().into_owned();
                if part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
