//! Main application module for Padel Overlay.
//!
//! Holds the iced application state and routes every [`Message`] to a
//! handler. Business rules live in `overlay_core::state`; this layer only
//! turns user gestures and job updates into state transitions and tasks.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use iced::{window, Element, Subscription, Task, Theme};

use overlay_core::config::ConfigManager;
use overlay_core::jobs::InputField;
use overlay_core::orchestrator::{JobController, JobUpdate};
use overlay_core::state::AppState;
use overlay_core::update::{UpdateChecker, UpdateStatus};

use crate::pages;

/// Initialization data for the App.
#[derive(Clone)]
pub struct AppInit {
    pub config: Arc<Mutex<ConfigManager>>,
    pub controller: JobController,
}

/// All possible messages the application can receive.
#[derive(Debug, Clone)]
pub enum Message {
    // Path rows
    PathEdited(InputField, String),
    Browse(InputField),
    PathPicked(InputField, Option<PathBuf>),
    VideosPicked(Vec<PathBuf>),

    // Processing
    Generate,
    Job(JobUpdate),

    // Updates
    CheckForUpdates,
    UpdateChecked(Result<UpdateStatus, String>),
    UpdateDialogClosed { download: bool, url: String },

    // Window
    CloseRequested(window::Id),
    DialogClosed,
}

/// Main application state.
pub struct App {
    pub config: Arc<Mutex<ConfigManager>>,
    pub controller: JobController,
    pub update_checker: Option<UpdateChecker>,
    pub state: AppState,
    /// Set once the window asked to close; the app exits when the job ends.
    pub closing: bool,
}

impl App {
    pub fn new(init: AppInit) -> (Self, Task<Message>) {
        let (state, update_settings) = {
            let cfg = lock(&init.config);
            let settings = cfg.settings();
            (
                AppState::from_settings(&settings.paths, settings.logging.max_lines),
                settings.update.clone(),
            )
        };

        let update_checker = match UpdateChecker::new(&update_settings) {
            Ok(checker) => Some(checker),
            Err(e) => {
                tracing::warn!("Update checks disabled: {}", e);
                None
            }
        };

        let mut app = Self {
            config: init.config,
            controller: init.controller,
            update_checker,
            state,
            closing: false,
        };
        app.state.log_info(format!(
            "Padel Overlay v{} ready.",
            overlay_core::version()
        ));

        let task = if update_settings.check_on_startup {
            app.check_for_updates()
        } else {
            Task::none()
        };

        (app, task)
    }

    pub fn title(&self) -> String {
        format!("Padel Overlay v{}", overlay_core::version())
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(Message::CloseRequested)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PathEdited(field, text) => {
                self.state.edit_field(field, &text);
                Task::none()
            }
            Message::Browse(field) => self.browse(field),
            Message::PathPicked(field, path) => {
                self.handle_path_picked(field, path);
                Task::none()
            }
            Message::VideosPicked(files) => {
                self.handle_videos_picked(files);
                Task::none()
            }

            Message::Generate => self.start_generate(),
            Message::Job(update) => self.handle_job_update(update),

            Message::CheckForUpdates => self.check_for_updates(),
            Message::UpdateChecked(result) => self.handle_update_checked(result),
            Message::UpdateDialogClosed { download, url } => {
                self.handle_update_dialog_closed(download, &url);
                Task::none()
            }

            Message::CloseRequested(_) => self.handle_close_requested(),
            Message::DialogClosed => Task::none(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        pages::main_window::view(self)
    }
}

/// Lock the shared config, recovering from a poisoned lock.
pub fn lock(config: &Mutex<ConfigManager>) -> MutexGuard<'_, ConfigManager> {
    config.lock().unwrap_or_else(PoisonError::into_inner)
}
