//! Padel Overlay - Main entry point
//!
//! This is the application entry point using iced. It handles:
//! - Configuration loading
//! - Application-level logging initialization
//! - Directory creation
//! - Application launch

use std::sync::{Arc, Mutex};

use iced::{window, Size};

use overlay_core::config::{default_config_path, ConfigManager};
use overlay_core::logging::init_tracing_with_file;
use overlay_core::orchestrator::{ControllerOptions, JobController};

mod app;
mod handlers;
mod pages;
mod theme;

use app::{App, AppInit};

fn main() -> anyhow::Result<()> {
    // Load configuration first (needed for logs directory path)
    let config_path = default_config_path();
    let mut config_manager = ConfigManager::new(&config_path);

    if let Err(e) = config_manager.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    let settings = config_manager.settings().clone();
    let logs_dir = config_manager.logs_folder();
    let _log_guard = init_tracing_with_file(settings.logging.level, &logs_dir);

    tracing::info!("Padel Overlay starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::info!("Core version: {}", overlay_core::version());

    if let Err(e) = config_manager.ensure_dirs_exist() {
        tracing::error!("Failed to create directories: {}", e);
    }

    let controller = JobController::new(
        settings.worker.to_worker_command(),
        ControllerOptions {
            default_output: settings.paths.default_output_path(),
            logs_dir: settings.logging.write_job_logs.then(|| logs_dir.clone()),
            job_log: settings.logging.job_log_config(),
        },
    );
    tracing::info!("Worker: {}", controller.command().program.display());

    let init = AppInit {
        config: Arc::new(Mutex::new(config_manager)),
        controller,
    };

    iced::application(move || App::new(init.clone()), App::update, App::view)
        .title(App::title)
        .subscription(App::subscription)
        .theme(App::theme)
        .window(window::Settings {
            size: Size::new(860.0, 720.0),
            min_size: Some(Size::new(640.0, 520.0)),
            // Closing waits for the running worker to be killed
            exit_on_close_request: false,
            ..Default::default()
        })
        .run()
        .map_err(|e| anyhow::anyhow!("Failed to run the application: {}", e))
}
