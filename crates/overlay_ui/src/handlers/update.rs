//! Update check handlers.

use iced::Task;

use overlay_core::update::UpdateStatus;

use super::dialogs::confirm;
use crate::app::{App, Message};

impl App {
    /// Start a release check in the background.
    pub fn check_for_updates(&mut self) -> Task<Message> {
        let Some(checker) = self.update_checker.clone() else {
            self.state.log_error("Update checks are unavailable");
            return Task::none();
        };

        self.state.log_info("Checking for updates...");
        let current = overlay_core::version().to_string();

        Task::perform(
            async move { checker.check(&current).await.map_err(|e| e.to_string()) },
            Message::UpdateChecked,
        )
    }

    /// Handle the result of a release check. Failures are only logged.
    pub fn handle_update_checked(&mut self, result: Result<UpdateStatus, String>) -> Task<Message> {
        match result {
            Ok(UpdateStatus::Available(info)) => {
                self.state
                    .log_success(format!("New version available: {}", info.latest_version));
                let url = info.release_url.clone();
                confirm(
                    "Update available",
                    format!(
                        "A new version ({latest}) is available!\n\n\
                         Current version: {current}\n\
                         New version: {latest}\n\n\
                         Do you want to download the update?",
                        latest = info.latest_version,
                        current = info.current_version,
                    ),
                )
                .map(move |download| Message::UpdateDialogClosed {
                    download,
                    url: url.clone(),
                })
            }
            Ok(UpdateStatus::UpToDate) => {
                self.state.log_info("Application is up to date!");
                Task::none()
            }
            Err(e) => {
                tracing::warn!("Update check failed: {}", e);
                self.state
                    .log_error(format!("Unable to check for updates: {}", e));
                Task::none()
            }
        }
    }

    /// Open the release page if the user accepted.
    pub fn handle_update_dialog_closed(&mut self, download: bool, url: &str) {
        if !download {
            return;
        }
        if let Err(e) = open::that(url) {
            tracing::warn!("Failed to open {}: {}", url, e);
            self.state
                .log_error(format!("Could not open the browser: {}", e));
        }
    }
}
