//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::jobs::JobRequest;
use crate::logging::{LogConfig, LogLevel};
use crate::worker::WorkerCommand;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// How the overlay worker is launched.
    #[serde(default)]
    pub worker: WorkerSettings,

    /// Default output and last-used inputs.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Release checking.
    #[serde(default)]
    pub update: UpdateSettings,
}

impl Settings {
    /// Current values of `section` as a TOML table.
    pub fn section_table(&self, section: ConfigSection) -> Result<toml::Table, toml::ser::Error> {
        let value = match section {
            ConfigSection::Worker => toml::Value::try_from(&self.worker)?,
            ConfigSection::Paths => toml::Value::try_from(&self.paths)?,
            ConfigSection::Logging => toml::Value::try_from(&self.logging)?,
            ConfigSection::Update => toml::Value::try_from(&self.update)?,
        };
        Ok(match value {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        })
    }
}

/// External worker invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Interpreter or standalone executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the input flags.
    #[serde(default = "default_worker_args")]
    pub args: Vec<String>,

    /// Working directory for the worker. Empty inherits ours.
    #[serde(default)]
    pub working_dir: String,
}

fn default_program() -> String {
    "python".to_string()
}

fn default_worker_args() -> Vec<String> {
    vec!["main.py".to_string()]
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_worker_args(),
            working_dir: String::new(),
        }
    }
}

impl WorkerSettings {
    /// Build the command used to spawn the worker.
    pub fn to_worker_command(&self) -> WorkerCommand {
        let mut command = WorkerCommand::new(&self.program);
        for arg in &self.args {
            command = command.arg(arg);
        }
        if !self.working_dir.trim().is_empty() {
            command = command.current_dir(&self.working_dir);
        }
        command
    }
}

/// Output default, logs folder and last-used selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output file used when the user leaves the field blank.
    #[serde(default = "default_output")]
    pub default_output: String,

    /// Folder for application and job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last used XML export.
    #[serde(default)]
    pub xml_path: String,

    /// Last used Excel workbook.
    #[serde(default)]
    pub excel_path: String,

    /// Last used video folder.
    #[serde(default)]
    pub video_folder: String,

    /// Last used output file.
    #[serde(default)]
    pub output_path: String,
}

fn default_output() -> String {
    "output_final.mp4".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            default_output: default_output(),
            logs_folder: default_logs_folder(),
            xml_path: String::new(),
            excel_path: String::new(),
            video_folder: String::new(),
            output_path: String::new(),
        }
    }
}

impl PathSettings {
    /// Remember the paths of a request for the next session.
    pub fn remember(&mut self, request: &JobRequest) {
        self.xml_path = request.xml_path.to_string_lossy().into_owned();
        self.excel_path = request.excel_path.to_string_lossy().into_owned();
        self.video_folder = request.video_folder.to_string_lossy().into_owned();
        self.output_path = request
            .output_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    pub fn default_output_path(&self) -> PathBuf {
        PathBuf::from(&self.default_output)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Application log level (overridden by RUST_LOG).
    #[serde(default)]
    pub level: LogLevel,

    /// Lines kept in the on-screen log console.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Write one log file per generation run.
    #[serde(default = "default_true")]
    pub write_job_logs: bool,

    /// Number of worker output lines kept for failure diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_lines() -> usize {
    2000
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            max_lines: default_max_lines(),
            write_job_logs: true,
            error_tail: default_error_tail(),
        }
    }
}

impl LoggingSettings {
    /// Per-job logger configuration.
    pub fn job_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            error_tail: self.error_tail,
            ..LogConfig::default()
        }
    }
}

/// Release checking against the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettings {
    /// `owner/name` of the repository publishing releases.
    #[serde(default = "default_repository")]
    pub repository: String,

    /// API root, without trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User agent sent with the request (GitHub rejects requests without one).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Check once when the application starts.
    #[serde(default = "default_true")]
    pub check_on_startup: bool,
}

fn default_repository() -> String {
    "Pierre-AdrienLefevre/auto-padel-tennis-overlay".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("padel-overlay/{}", crate::version())
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            check_on_startup: true,
        }
    }
}

impl UpdateSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Worker,
    Paths,
    Logging,
    Update,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Worker,
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Update,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Worker => "worker",
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Update => "update",
        }
    }

    /// Comment written above the table in a fresh config file.
    pub(crate) fn description(&self) -> &'static str {
        match self {
            ConfigSection::Worker => "Overlay worker invocation",
            ConfigSection::Paths => "Output default and last used inputs",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Update => "Release checking",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[worker]"));
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[logging]"));
        assert!(toml.contains("[update]"));
        assert!(toml.contains("output_final.mp4"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r#"
[paths]
xml_path = "/data/match.xml"

[update]
check_on_startup = false
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.paths.xml_path, "/data/match.xml");
        assert_eq!(settings.paths.default_output, "output_final.mp4");
        assert!(!settings.update.check_on_startup);
        assert_eq!(settings.update.timeout_secs, 5);
        assert_eq!(settings.worker.program, "python");
        assert_eq!(settings.logging.max_lines, 2000);
    }

    #[test]
    fn worker_settings_build_command() {
        let settings = WorkerSettings {
            program: "/opt/venv/bin/python".to_string(),
            args: vec!["-u".to_string(), "main.py".to_string()],
            working_dir: "/opt/overlay".to_string(),
        };
        let command = settings.to_worker_command();
        assert_eq!(command.program, PathBuf::from("/opt/venv/bin/python"));
        assert_eq!(
            command.leading_args,
            vec![OsString::from("-u"), OsString::from("main.py")]
        );
        assert_eq!(command.working_dir, Some(PathBuf::from("/opt/overlay")));
    }

    #[test]
    fn blank_working_dir_is_inherited() {
        let command = WorkerSettings::default().to_worker_command();
        assert_eq!(command.working_dir, None);
    }

    #[test]
    fn remember_stores_request_paths() {
        let mut paths = PathSettings::default();
        let request = JobRequest::new("a.xml", "b.xlsx", "/vids", None);
        paths.remember(&request);
        assert_eq!(paths.xml_path, "a.xml");
        assert_eq!(paths.video_folder, "/vids");
        assert_eq!(paths.output_path, "");
    }

    #[test]
    fn section_names_match_fields() {
        let names: Vec<_> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        assert_eq!(names, vec!["worker", "paths", "logging", "update"]);
    }

    #[test]
    fn job_log_config_follows_logging_section() {
        let logging = LoggingSettings {
            level: LogLevel::Debug,
            error_tail: 7,
            ..LoggingSettings::default()
        };
        let config = logging.job_log_config();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.error_tail, 7);
        assert!(config.show_timestamps);
    }

    #[test]
    fn section_table_lists_every_key() {
        let table = Settings::default()
            .section_table(ConfigSection::Logging)
            .unwrap();
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        for key in ["level", "max_lines", "write_job_logs", "error_tail"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}
