//! File browsing handlers.

use std::path::PathBuf;

use iced::Task;

use overlay_core::config::ConfigSection;
use overlay_core::jobs::InputField;

use crate::app::{lock, App, Message};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "MP4", "MOV"];

impl App {
    /// Open the dialog for a path row.
    pub fn browse(&self, field: InputField) -> Task<Message> {
        match field {
            InputField::Xml => pick_file(
                field,
                "Select the XML file",
                "XML Files",
                &["xml"],
            ),
            InputField::Excel => pick_file(
                field,
                "Select the Excel file",
                "Excel Files",
                &["xlsx", "xls"],
            ),
            InputField::Videos => Task::perform(
                async {
                    rfd::AsyncFileDialog::new()
                        .set_title("Select the video files")
                        .add_filter("Video Files", VIDEO_EXTENSIONS)
                        .add_filter("All Files", &["*"])
                        .pick_files()
                        .await
                        .map(|files| files.into_iter().map(|f| f.path().to_path_buf()).collect())
                        .unwrap_or_default()
                },
                Message::VideosPicked,
            ),
            InputField::Output => {
                let default_name = {
                    let cfg = lock(&self.config);
                    cfg.settings().paths.default_output.clone()
                };
                Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_title("Save the video as")
                            .set_file_name(default_name)
                            .add_filter("Video Files", &["mp4"])
                            .save_file()
                            .await
                            .map(|f| f.path().to_path_buf())
                    },
                    move |path| Message::PathPicked(field, path),
                )
            }
        }
    }

    /// Handle a path chosen in a dialog. Cancelled dialogs change nothing.
    pub fn handle_path_picked(&mut self, field: InputField, path: Option<PathBuf>) {
        if let Some(path) = path {
            self.state.select_path(field, path);
            self.persist_paths();
        }
    }

    /// Handle the multi-file video selection.
    pub fn handle_videos_picked(&mut self, files: Vec<PathBuf>) {
        if files.is_empty() {
            return;
        }
        self.state.select_videos(&files);
        self.persist_paths();
    }

    /// Remember the current inputs for the next session.
    pub fn persist_paths(&self) {
        let draft = self.state.request_draft();
        let mut cfg = lock(&self.config);
        cfg.settings_mut().paths.remember(&draft);
        if let Err(e) = cfg.update_section(ConfigSection::Paths) {
            tracing::warn!("Failed to save paths: {}", e);
        }
    }
}

fn pick_file(
    field: InputField,
    title: &'static str,
    filter_name: &'static str,
    extensions: &'static [&'static str],
) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncFileDialog::new()
                .set_title(title)
                .add_filter(filter_name, extensions)
                .pick_file()
                .await
                .map(|f| f.path().to_path_buf())
        },
        move |path| Message::PathPicked(field, path),
    )
}
