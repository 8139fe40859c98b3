//! Blocking message dialogs.

use iced::Task;
use rfd::{AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};

use crate::app::Message;

/// Show an OK dialog; resolves to [`Message::DialogClosed`].
pub fn show_message(level: MessageLevel, title: &str, description: String) -> Task<Message> {
    let dialog = AsyncMessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok);

    Task::perform(dialog.show(), |_| Message::DialogClosed)
}

/// Ask a yes/no question.
pub fn confirm(title: &str, description: String) -> Task<bool> {
    let dialog = AsyncMessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo);

    Task::perform(dialog.show(), |result| result == MessageDialogResult::Yes)
}
