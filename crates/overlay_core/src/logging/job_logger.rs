//! Per-job log file.
//!
//! One file per generation run, holding the worker command line, every
//! line the worker printed and the outcome. The last worker lines are
//! kept in memory and replayed under a `[worker/tail]` header when the
//! job fails, so the cause sits next to the error.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LineTag, LogConfig, LogLevel};
use crate::jobs::{JobOutcome, OutputStream};

struct Sink {
    /// `None` once the outcome has been recorded.
    writer: Option<BufWriter<File>>,
    tail: VecDeque<String>,
}

/// Writes `<log_dir>/<job_name>.log`.
pub struct JobLogger {
    job_name: String,
    log_path: PathBuf,
    config: LogConfig,
    sink: Mutex<Sink>,
}

impl JobLogger {
    /// Create the log file, and `log_dir` if needed.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
    ) -> io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            job_name,
            log_path,
            sink: Mutex::new(Sink {
                writer: Some(BufWriter::new(file)),
                tail: VecDeque::with_capacity(config.error_tail),
            }),
            config,
        })
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Phase header followed by the full worker command line.
    pub fn begin(&self, phase: &str, command_line: &str) {
        let mut sink = self.sink.lock();
        self.record(&mut sink, LogLevel::Info, &LineTag::Phase.apply(phase));
        self.record(&mut sink, LogLevel::Info, &LineTag::Command.apply(command_line));
    }

    /// One line of worker output; stderr lines are tagged.
    pub fn worker_line(&self, line: &str, stream: OutputStream) {
        let mut sink = self.sink.lock();
        if self.config.error_tail > 0 {
            if sink.tail.len() == self.config.error_tail {
                sink.tail.pop_front();
            }
            sink.tail.push_back(line.to_string());
        }

        let (level, tag) = match stream {
            OutputStream::Stdout => (LogLevel::Info, LineTag::Plain),
            OutputStream::Stderr => (LogLevel::Warn, LineTag::Stderr),
        };
        self.record(&mut sink, level, &tag.apply(line));
    }

    /// Record how the job ended and close the file.
    ///
    /// Failures are followed by the tail of worker output. Later calls on
    /// this logger are no-ops.
    pub fn outcome(&self, outcome: &JobOutcome) {
        let mut sink = self.sink.lock();
        match outcome {
            JobOutcome::Success { message } => {
                self.record(&mut sink, LogLevel::Info, &LineTag::Success.apply(message));
            }
            JobOutcome::Failure { message } => {
                self.record(&mut sink, LogLevel::Error, &LineTag::Error.apply(message));
                if !sink.tail.is_empty() {
                    let tail: Vec<String> = sink.tail.iter().cloned().collect();
                    self.record(&mut sink, LogLevel::Error, "[worker/tail]");
                    for line in &tail {
                        self.record(&mut sink, LogLevel::Error, line);
                    }
                }
            }
        }

        if let Some(mut writer) = sink.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush {}: {}", self.log_path.display(), e);
            }
        }
    }

    /// Most recent worker lines, oldest first.
    pub fn tail(&self) -> Vec<String> {
        self.sink.lock().tail.iter().cloned().collect()
    }

    fn record(&self, sink: &mut Sink, level: LogLevel, line: &str) {
        if level < self.config.level {
            return;
        }
        let Some(writer) = sink.writer.as_mut() else {
            return;
        };
        let result = if self.config.show_timestamps {
            writeln!(writer, "[{}] {}", Local::now().format("%H:%M:%S"), line)
        } else {
            writeln!(writer, "{}", line)
        };
        if let Err(e) = result {
            tracing::debug!("Job log write failed: {}", e);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        if let Some(writer) = self.sink.get_mut().writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

/// Replace characters that are not allowed in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn plain(error_tail: usize) -> LogConfig {
        LogConfig {
            level: LogLevel::Info,
            error_tail,
            show_timestamps: false,
        }
    }

    #[test]
    fn creates_named_file() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("job_20260101", dir.path(), LogConfig::default()).unwrap();

        assert_eq!(logger.job_name(), "job_20260101");
        assert!(logger.log_path().exists());
        assert!(logger.log_path().ends_with("job_20260101.log"));
    }

    #[test]
    fn success_log_has_command_and_output() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("job", dir.path(), plain(5)).unwrap();

        logger.begin("Generate overlay", "python main.py --xml a.xml");
        logger.worker_line("[1/4] Processing clip", OutputStream::Stdout);
        logger.outcome(&JobOutcome::success("Video generated successfully: out.mp4"));

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert_eq!(
            content,
            "=== Generate overlay ===\n\
             $ python main.py --xml a.xml\n\
             [1/4] Processing clip\n\
             [SUCCESS] Video generated successfully: out.mp4\n"
        );
    }

    #[test]
    fn failure_replays_tail() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("job", dir.path(), plain(2)).unwrap();

        logger.worker_line("one", OutputStream::Stdout);
        logger.worker_line("two", OutputStream::Stdout);
        logger.worker_line("codec missing", OutputStream::Stderr);
        assert_eq!(logger.tail(), vec!["two", "codec missing"]);

        logger.outcome(&JobOutcome::failure("Error: codec missing"));

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[stderr] codec missing\n"));
        assert!(content.ends_with("[ERROR] Error: codec missing\n[worker/tail]\ntwo\ncodec missing\n"));
    }

    #[test]
    fn nothing_is_written_after_outcome() {
        let dir = tempdir().unwrap();
        let logger = JobLogger::new("job", dir.path(), plain(0)).unwrap();

        logger.outcome(&JobOutcome::success("done"));
        logger.worker_line("late", OutputStream::Stdout);
        drop(logger);

        let content = fs::read_to_string(dir.path().join("job.log")).unwrap();
        assert_eq!(content, "[SUCCESS] done\n");
    }

    #[test]
    fn level_threshold_hides_stdout() {
        let dir = tempdir().unwrap();
        let mut config = plain(0);
        config.level = LogLevel::Warn;
        let logger = JobLogger::new("job", dir.path(), config).unwrap();

        logger.worker_line("50/100", OutputStream::Stdout);
        logger.worker_line("warning: low disk", OutputStream::Stderr);
        logger.outcome(&JobOutcome::failure("Error: disk full"));

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(!content.contains("50/100"));
        assert!(content.contains("[stderr] warning: low disk"));
        assert!(content.contains("[ERROR] Error: disk full"));
    }

    #[test]
    fn sanitizes_job_names() {
        assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
    }
}
