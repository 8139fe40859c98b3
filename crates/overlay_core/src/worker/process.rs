//! Running worker process with line-oriented output streams.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use super::command::WorkerCommand;
use super::errors::{WorkerError, WorkerResult};
use crate::jobs::{JobRequest, OutputStream};

/// One line of worker output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerChunk {
    pub stream: OutputStream,
    pub text: String,
}

/// Terminal status of the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerExit {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl WorkerExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable description, e.g. `exit code 1`.
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

impl From<ExitStatus> for WorkerExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Line reader that tolerates invalid UTF-8 in worker output.
struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::with_capacity(256),
        }
    }

    /// Cancel safe: bytes read before a cancelled call stay in `buf` and
    /// are returned with the rest of the line.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let read = self.inner.read_until(b'\n', &mut self.buf).await?;
        if read == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let mut line = std::mem::take(&mut self.buf);
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

async fn read_from<R: AsyncRead + Unpin>(
    reader: &mut Option<LineReader<R>>,
) -> io::Result<Option<String>> {
    match reader {
        Some(reader) => reader.next_line().await,
        None => Ok(None),
    }
}

/// Handle to a spawned worker.
///
/// The child is spawned with `kill_on_drop`, so dropping the handle
/// (for example when the runtime shuts down) never leaves it orphaned.
pub struct WorkerProcess {
    child: Child,
    stdout: Option<LineReader<ChildStdout>>,
    stderr: Option<LineReader<ChildStderr>>,
}

impl WorkerProcess {
    /// Spawn the worker for `request`.
    ///
    /// Fails with [`WorkerError::Launch`] when the executable cannot be
    /// found or started.
    pub fn start(
        command: &WorkerCommand,
        request: &JobRequest,
        default_output: &Path,
    ) -> WorkerResult<Self> {
        let mut cmd = Command::new(&command.program);
        cmd.args(command.arguments(request, default_output))
            // Python workers otherwise block-buffer a piped stdout
            .env("PYTHONUNBUFFERED", "1")
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = command.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| WorkerError::launch(command.program.display().to_string(), e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or(WorkerError::MissingPipe("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(WorkerError::MissingPipe("stderr"))?;

        tracing::debug!("Worker spawned (pid {:?})", child.id());

        Ok(Self {
            child,
            stdout: Some(LineReader::new(stdout)),
            stderr: Some(LineReader::new(stderr)),
        })
    }

    /// OS process id, while the process is still running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next output line from whichever stream has data.
    ///
    /// Returns `None` once both stdout and stderr are closed.
    pub async fn next_chunk(&mut self) -> Option<WorkerChunk> {
        loop {
            if self.stdout.is_none() && self.stderr.is_none() {
                return None;
            }

            let (stream, line) = tokio::select! {
                line = read_from(&mut self.stdout), if self.stdout.is_some() => {
                    (OutputStream::Stdout, line)
                }
                line = read_from(&mut self.stderr), if self.stderr.is_some() => {
                    (OutputStream::Stderr, line)
                }
            };

            match line {
                Ok(Some(text)) => return Some(WorkerChunk { stream, text }),
                Ok(None) => self.close_stream(stream),
                Err(e) => {
                    tracing::warn!("Failed to read worker {:?}: {}", stream, e);
                    self.close_stream(stream);
                }
            }
        }
    }

    fn close_stream(&mut self, stream: OutputStream) {
        match stream {
            OutputStream::Stdout => self.stdout = None,
            OutputStream::Stderr => self.stderr = None,
        }
    }

    /// Wait for the worker to exit.
    pub async fn wait(&mut self) -> WorkerResult<WorkerExit> {
        self.child
            .wait()
            .await
            .map(WorkerExit::from)
            .map_err(WorkerError::Wait)
    }

    /// Forcibly terminate the worker and reap it.
    pub async fn kill(&mut self) -> WorkerResult<()> {
        self.stdout = None;
        self.stderr = None;
        self.child.kill().await.map_err(WorkerError::Wait)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn script(body: &str) -> WorkerCommand {
        WorkerCommand::new("sh").arg("-c").arg(body).arg("worker")
    }

    fn request() -> JobRequest {
        JobRequest::new("a.xml", "b.xlsx", "/vids", Some(PathBuf::from("out.mp4")))
    }

    async fn collect(process: &mut WorkerProcess) -> Vec<WorkerChunk> {
        let mut chunks = Vec::new();
        while let Some(chunk) = process.next_chunk().await {
            chunks.push(chunk);
        }
        chunks
    }

    #[tokio::test]
    async fn streams_stdout_lines_in_order() {
        let cmd = script("echo 10/100; echo 100/100");
        let mut process = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4")).unwrap();

        let chunks = collect(&mut process).await;
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["10/100", "100/100"]);
        assert!(chunks.iter().all(|c| c.stream == OutputStream::Stdout));

        let exit = process.wait().await.unwrap();
        assert!(exit.success());
    }

    #[tokio::test]
    async fn separates_stderr() {
        let cmd = script("echo codec missing >&2; exit 1");
        let mut process = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4")).unwrap();

        let chunks = collect(&mut process).await;
        assert_eq!(
            chunks,
            vec![WorkerChunk {
                stream: OutputStream::Stderr,
                text: "codec missing".to_string(),
            }]
        );

        let exit = process.wait().await.unwrap();
        assert_eq!(exit.code, Some(1));
        assert_eq!(exit.describe(), "exit code 1");
    }

    #[tokio::test]
    async fn passes_request_as_flags() {
        // $1.. are the arguments after the script name
        let cmd = script("echo \"$1 $2 $3 $4 $5 $6 $7 $8\"");
        let mut process = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4")).unwrap();

        let chunks = collect(&mut process).await;
        assert_eq!(
            chunks[0].text,
            "--xml a.xml --excel b.xlsx --videos /vids --output out.mp4"
        );
        process.wait().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let cmd = script("printf 'caf\\351 3/4\\n'");
        let mut process = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4")).unwrap();

        let chunks = collect(&mut process).await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.ends_with(" 3/4"));
        process.wait().await.unwrap();
    }

    #[tokio::test]
    async fn missing_executable_is_launch_error() {
        let cmd = WorkerCommand::new("/nonexistent/overlay-worker");
        let err = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4"))
            .err()
            .unwrap();
        assert!(err.is_launch());
        assert!(err.to_string().contains("/nonexistent/overlay-worker"));
    }

    #[tokio::test]
    async fn kill_terminates_running_worker() {
        let cmd = script("sleep 30");
        let mut process = WorkerProcess::start(&cmd, &request(), Path::new("o.mp4")).unwrap();
        assert!(process.id().is_some());

        process.kill().await.unwrap();
        let exit = process.wait().await.unwrap();
        assert!(!exit.success());
        assert_eq!(exit.code, None);
    }
}
