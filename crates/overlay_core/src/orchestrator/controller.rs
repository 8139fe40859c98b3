//! Job controller: runs one worker at a time and turns its output into
//! progress events.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use futures_util::future;
use futures_util::stream::{self, Stream, StreamExt};
use tokio::sync::{mpsc, watch};

use super::errors::{ControllerError, ControllerResult};
use crate::jobs::{JobOutcome, JobRequest, OutputStream, ProgressEvent};
use crate::logging::{JobLogger, LogConfig};
use crate::progress::{parse_fraction, ProgressTracker};
use crate::worker::{WorkerChunk, WorkerCommand, WorkerProcess};

/// Message of a job whose worker was killed at shutdown.
const TERMINATED_MESSAGE: &str = "Processing terminated: the application is closing";

/// Settings the controller applies to every job.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Output used when the request leaves it blank.
    pub default_output: PathBuf,
    /// Folder for per-job log files; `None` disables them.
    pub logs_dir: Option<PathBuf>,
    /// How job log files are written.
    pub job_log: LogConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_output: PathBuf::from("output_final.mp4"),
            logs_dir: None,
            job_log: LogConfig::default(),
        }
    }
}

/// What a running job reports to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    Event(ProgressEvent),
    /// Always the last item.
    Finished(JobOutcome),
}

/// Starts jobs and enforces the single-job rule.
///
/// Clones share the busy flag and the shutdown signal.
#[derive(Clone)]
pub struct JobController {
    command: Arc<WorkerCommand>,
    options: Arc<ControllerOptions>,
    busy: Arc<AtomicBool>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl JobController {
    pub fn new(command: WorkerCommand, options: ControllerOptions) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            command: Arc::new(command),
            options: Arc::new(options),
            busy: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn command(&self) -> &WorkerCommand {
        &self.command
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Whether a job is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate `request` and reserve the job slot.
    ///
    /// Nothing runs until the returned [`JobRun`] is driven.
    pub fn start(&self, request: JobRequest) -> ControllerResult<JobRun> {
        request.validate()?;
        let guard = BusyGuard::acquire(&self.busy).ok_or(ControllerError::Busy)?;
        Ok(JobRun {
            controller: self.clone(),
            request,
            guard,
        })
    }

    /// Run a job to completion, sending progress to `events`.
    ///
    /// Returns `Err` only when the job was never started. Launch and
    /// runtime failures resolve to [`JobOutcome::Failure`].
    pub async fn run_job(
        &self,
        request: JobRequest,
        events: mpsc::UnboundedSender<ProgressEvent>,
    ) -> ControllerResult<JobOutcome> {
        let run = self.start(request)?;
        Ok(run
            .execute(|event| {
                // Receiver gone means nobody is watching; keep going
                let _ = events.send(event);
            })
            .await)
    }

    /// Kill the worker of any in-flight job and refuse to spawn new ones.
    pub fn shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.shutdown.send_replace(true);
    }

    async fn execute<F>(&self, request: &JobRequest, emit: &F) -> JobOutcome
    where
        F: Fn(ProgressEvent) + Sync,
    {
        let default_output = &self.options.default_output;
        let output = request.resolved_output(default_output);
        let command_line = self.command.display(request, default_output);
        let logger = self.open_job_logger();

        tracing::info!("Starting worker: {}", command_line);
        if let Some(logger) = &logger {
            logger.begin("Generate overlay", &command_line);
        }

        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return finish(logger.as_ref(), JobOutcome::failure(TERMINATED_MESSAGE));
        }

        let mut process = match WorkerProcess::start(&self.command, request, default_output) {
            Ok(process) => process,
            Err(e) => {
                tracing::error!("Failed to launch worker: {}", e);
                let outcome = JobOutcome::failure(format!("Launch error: {}", e));
                return finish(logger.as_ref(), outcome);
            }
        };

        let tracker = ProgressTracker::new(Instant::now());
        let mut stderr = Vec::new();

        let drained = loop {
            tokio::select! {
                chunk = process.next_chunk() => match chunk {
                    Some(chunk) => {
                        forward(chunk, &tracker, &mut stderr, logger.as_ref(), emit);
                    }
                    None => break true,
                },
                _ = shutdown_requested(&mut shutdown) => break false,
            }
        };

        // Pipes may close before the worker exits
        let exited = if drained {
            tokio::select! {
                exit = process.wait() => Some(exit),
                _ = shutdown_requested(&mut shutdown) => None,
            }
        } else {
            None
        };

        let Some(exited) = exited else {
            tracing::warn!("Killing worker (pid {:?})", process.id());
            if let Err(e) = process.kill().await {
                tracing::warn!("Failed to kill worker: {}", e);
            }
            return finish(logger.as_ref(), JobOutcome::failure(TERMINATED_MESSAGE));
        };

        let outcome = match exited {
            Ok(exit) if exit.success() => {
                tracing::info!("Worker finished: {}", output.display());
                JobOutcome::success(format!(
                    "Video generated successfully: {}",
                    output.display()
                ))
            }
            Ok(exit) => {
                tracing::warn!("Worker failed with {}", exit.describe());
                let body = if stderr.is_empty() {
                    format!("worker failed with {}", exit.describe())
                } else {
                    stderr.join("\n")
                };
                JobOutcome::failure(format!("Error: {}", body))
            }
            Err(e) => {
                tracing::error!("{}", e);
                JobOutcome::failure(format!("Error: {}", e))
            }
        };

        finish(logger.as_ref(), outcome)
    }

    fn open_job_logger(&self) -> Option<JobLogger> {
        let dir = self.options.logs_dir.as_ref()?;
        let name = format!("job_{}", Local::now().format("%Y%m%d_%H%M%S_%3f"));
        match JobLogger::new(name, dir, self.options.job_log.clone()) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!(
                    "Job log disabled, cannot create it in {}: {}",
                    dir.display(),
                    e
                );
                None
            }
        }
    }
}

/// Emit events for one worker line.
///
/// Only stdout is scanned for progress.
fn forward<F>(
    chunk: WorkerChunk,
    tracker: &ProgressTracker,
    stderr: &mut Vec<String>,
    logger: Option<&JobLogger>,
    emit: &F,
) where
    F: Fn(ProgressEvent),
{
    if let Some(logger) = logger {
        logger.worker_line(&chunk.text, chunk.stream);
    }

    let fraction = match chunk.stream {
        OutputStream::Stdout => parse_fraction(&chunk.text),
        OutputStream::Stderr => {
            stderr.push(chunk.text.clone());
            None
        }
    };

    emit(ProgressEvent::LogLine {
        text: chunk.text,
        stream: chunk.stream,
    });

    if let Some(fraction) = fraction {
        if let Some(percent) = fraction.percent() {
            emit(ProgressEvent::PercentUpdate(percent));
        }
        if let Some(remaining) = tracker.estimate(fraction, Instant::now()) {
            emit(ProgressEvent::TimeRemaining(remaining));
        }
    }
}

fn finish(logger: Option<&JobLogger>, outcome: JobOutcome) -> JobOutcome {
    if let Some(logger) = logger {
        logger.outcome(&outcome);
    }
    outcome
}

/// Resolves once shutdown is signalled; pends forever if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        future::pending::<()>().await;
    }
}

/// Holds the busy flag for as long as a job lives.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A validated job holding the controller's single slot.
///
/// Dropping it without driving it releases the slot.
pub struct JobRun {
    controller: JobController,
    request: JobRequest,
    guard: BusyGuard,
}

impl JobRun {
    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    async fn execute<F>(self, emit: F) -> JobOutcome
    where
        F: Fn(ProgressEvent) + Sync,
    {
        let JobRun {
            controller,
            request,
            guard,
        } = self;
        let outcome = controller.execute(&request, &emit).await;
        drop(guard);
        outcome
    }

    /// Stream of events ending with [`JobUpdate::Finished`].
    ///
    /// The job runs while the stream is polled; dropping the stream kills
    /// the worker.
    pub fn into_updates(self) -> impl Stream<Item = JobUpdate> + Send + 'static {
        let (tx, rx) = mpsc::unbounded_channel();

        let driver = async move {
            let outcome = self
                .execute(|event| {
                    let _ = tx.send(JobUpdate::Event(event));
                })
                .await;
            let _ = tx.send(JobUpdate::Finished(outcome));
        };

        let updates = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|update| (update, rx))
        });

        stream::select(
            stream::once(driver).filter_map(|()| future::ready(None::<JobUpdate>)),
            updates,
        )
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::logging::init_test_tracing;
    use std::time::Duration;
    use tempfile::tempdir;

    fn script(body: &str) -> WorkerCommand {
        WorkerCommand::new("sh").arg("-c").arg(body).arg("worker")
    }

    fn controller(body: &str) -> JobController {
        init_test_tracing();
        JobController::new(script(body), ControllerOptions::default())
    }

    fn request() -> JobRequest {
        JobRequest::new("a.xml", "b.xlsx", "/vids", Some(PathBuf::from("out.mp4")))
    }

    async fn run(
        controller: &JobController,
        request: JobRequest,
    ) -> (JobOutcome, Vec<ProgressEvent>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = controller.run_job(request, tx).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (outcome, events)
    }

    fn percents(events: &[ProgressEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::PercentUpdate(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn successful_job_reports_progress() {
        let controller = controller("echo 10/100; echo 100/100; exit 0");
        let (outcome, events) = run(&controller, request()).await;

        assert_eq!(
            outcome,
            JobOutcome::success("Video generated successfully: out.mp4")
        );
        assert_eq!(percents(&events), vec![10, 100]);
        assert_eq!(events[0], ProgressEvent::stdout("10/100"));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn failing_job_carries_stderr() {
        let controller = controller("echo codec missing >&2; exit 1");
        let (outcome, events) = run(&controller, request()).await;

        assert!(!outcome.is_success());
        assert!(outcome.message().contains("codec missing"));
        assert_eq!(events, vec![ProgressEvent::stderr("codec missing")]);
    }

    #[tokio::test]
    async fn stderr_fractions_are_not_progress() {
        let controller = controller("echo 3/4 >&2");
        let (_, events) = run(&controller, request()).await;
        assert!(percents(&events).is_empty());
    }

    #[tokio::test]
    async fn silent_failure_reports_exit_code() {
        let controller = controller("exit 3");
        let (outcome, _) = run(&controller, request()).await;
        assert_eq!(outcome.message(), "Error: worker failed with exit code 3");
    }

    #[tokio::test]
    async fn missing_executable_is_launch_failure() {
        init_test_tracing();
        let controller = JobController::new(
            WorkerCommand::new("/nonexistent/overlay-worker"),
            ControllerOptions::default(),
        );
        let (outcome, events) = run(&controller, request()).await;

        assert!(outcome.message().starts_with("Launch error:"));
        assert!(events.is_empty());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn invalid_request_never_spawns() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let controller = controller(&format!("touch '{}'", marker.display()));

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = controller
            .run_job(JobRequest::new("a.xml", "", "/vids", None), tx)
            .await
            .unwrap_err();

        assert!(matches!(err, ControllerError::Validation(_)));
        assert!(!marker.exists());
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn second_job_is_rejected_while_busy() {
        let controller = controller("sleep 1; echo done");
        let first = controller.start(request()).unwrap();
        assert!(controller.is_busy());

        let err = controller.start(request()).err().unwrap();
        assert!(err.is_busy());

        let updates: Vec<JobUpdate> = first.into_updates().collect().await;
        assert_eq!(
            updates.last(),
            Some(&JobUpdate::Finished(JobOutcome::success(
                "Video generated successfully: out.mp4"
            )))
        );
        assert!(!controller.is_busy());
        assert!(controller.start(request()).is_ok());
    }

    #[tokio::test]
    async fn dropped_run_releases_slot() {
        let controller = controller("true");
        let run = controller.start(request()).unwrap();
        drop(run);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn updates_end_with_outcome() {
        let controller = controller("echo 1/2; echo 2/2");
        let updates: Vec<JobUpdate> = controller
            .start(request())
            .unwrap()
            .into_updates()
            .collect()
            .await;

        assert_eq!(
            updates.first(),
            Some(&JobUpdate::Event(ProgressEvent::stdout("1/2")))
        );
        assert!(matches!(updates.last(), Some(JobUpdate::Finished(o)) if o.is_success()));
        let finished = updates
            .iter()
            .filter(|u| matches!(u, JobUpdate::Finished(_)))
            .count();
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn shutdown_kills_running_worker() {
        let controller = controller("echo 1/10; sleep 30");
        let handle = controller.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let job = tokio::spawn(async move { handle.run_job(request(), tx).await });

        // Wait until the worker is producing output
        assert_eq!(rx.recv().await, Some(ProgressEvent::stdout("1/10")));
        controller.shutdown();

        let outcome = tokio::time::timeout(Duration::from_secs(5), job)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(outcome, JobOutcome::failure(TERMINATED_MESSAGE));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn shutdown_kills_worker_with_closed_pipes() {
        let controller = controller("echo 1/10; exec >/dev/null 2>&1; sleep 30");
        let handle = controller.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let job = tokio::spawn(async move { handle.run_job(request(), tx).await });

        assert_eq!(rx.recv().await, Some(ProgressEvent::stdout("1/10")));
        // Give the worker time to close its pipes before stopping it
        tokio::time::sleep(Duration::from_millis(200)).await;
        controller.shutdown();

        let outcome = tokio::time::timeout(Duration::from_secs(5), job)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(outcome, JobOutcome::failure(TERMINATED_MESSAGE));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn writes_job_log() {
        init_test_tracing();
        let dir = tempdir().unwrap();
        let options = ControllerOptions {
            logs_dir: Some(dir.path().to_path_buf()),
            ..ControllerOptions::default()
        };
        let controller = JobController::new(script("echo 5/10; echo boom >&2; exit 2"), options);
        let (outcome, _) = run(&controller, request()).await;
        assert!(!outcome.is_success());

        let log = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .find(|e| e.path().extension().is_some_and(|ext| ext == "log"))
            .unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("--xml a.xml"));
        assert!(content.contains("[stderr] boom"));
        assert!(content.contains("[ERROR] Error: boom"));
    }
}
