//! Generation handlers: starting a job, applying its updates, and shutdown.

use iced::Task;
use rfd::MessageLevel;

use overlay_core::jobs::JobOutcome;
use overlay_core::orchestrator::JobUpdate;
use overlay_core::state::{Phase, TransitionError};

use super::dialogs::show_message;
use crate::app::{App, Message};

impl App {
    /// Handle the Generate button.
    pub fn start_generate(&mut self) -> Task<Message> {
        let request = match self.state.begin_generate() {
            Ok(request) => request,
            Err(TransitionError::Validation(e)) => {
                tracing::debug!("Generate rejected: {}", e);
                return show_message(
                    MessageLevel::Warning,
                    "Missing files",
                    format!("Please select all required files!\n\n{}", e.checklist()),
                );
            }
            Err(e @ TransitionError::NotIdle(_)) => {
                tracing::debug!("{}", e);
                return Task::none();
            }
        };

        self.persist_paths();

        match self.controller.start(request) {
            Ok(run) => Task::run(run.into_updates(), Message::Job),
            Err(e) => {
                tracing::error!("Controller refused job: {}", e);
                let outcome = JobOutcome::failure(e.to_string());
                self.finish_job(outcome)
            }
        }
    }

    /// Handle one update from the running job.
    pub fn handle_job_update(&mut self, update: JobUpdate) -> Task<Message> {
        match update {
            JobUpdate::Event(event) => {
                self.state.apply_event(&event);
                Task::none()
            }
            JobUpdate::Finished(outcome) => self.finish_job(outcome),
        }
    }

    fn finish_job(&mut self, outcome: JobOutcome) -> Task<Message> {
        let terminal = self.state.finish(&outcome);

        if self.closing {
            tracing::info!("Job resolved, exiting");
            return iced::exit();
        }

        match terminal {
            Phase::Succeeded => show_message(
                MessageLevel::Info,
                "Success!",
                "The video was generated successfully!".to_string(),
            ),
            Phase::Failed => show_message(
                MessageLevel::Error,
                "Error",
                format!("An error occurred:\n{}", outcome.message()),
            ),
            _ => Task::none(),
        }
    }

    /// Handle the window close button.
    pub fn handle_close_requested(&mut self) -> Task<Message> {
        if self.closing {
            return Task::none();
        }
        self.closing = true;

        if self.controller.is_busy() {
            tracing::info!("Close requested while processing, stopping worker");
            self.state.log_info("Stopping the running job...");
            self.controller.shutdown();
            Task::none()
        } else {
            iced::exit()
        }
    }
}
