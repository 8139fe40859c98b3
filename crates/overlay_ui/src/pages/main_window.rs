//! Main window view.
//!
//! Header, the four input rows, the generate button with its progress
//! display, the log console, and a footer with the version.

use iced::alignment::Vertical;
use iced::widget::{button, column, container, progress_bar, row, scrollable, text, text_input};
use iced::{Element, Font, Length};

use overlay_core::jobs::InputField;
use overlay_core::state::{LogEntry, LogKind};

use crate::app::{App, Message};
use crate::theme::{colors, font, spacing, LABEL_WIDTH};

/// Build the main window view.
pub fn view(app: &App) -> Element<'_, Message> {
    let content = column![
        header(),
        inputs_section(app),
        generate_section(app),
        log_section(app),
        footer(),
    ]
    .spacing(spacing::MD)
    .padding(spacing::LG);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn header<'a>() -> Element<'a, Message> {
    column![
        text("Padel Overlay Generator")
            .size(font::HEADER)
            .color(colors::PRIMARY),
        text("Automatic score overlays for padel match videos")
            .size(font::NORMAL)
            .color(colors::TEXT_SECONDARY),
    ]
    .spacing(spacing::XS)
    .into()
}

/// The four path rows.
fn inputs_section(app: &App) -> Element<'_, Message> {
    let enabled = app.state.can_generate();

    let rows = InputField::ALL
        .iter()
        .map(|field| path_row(app, *field, enabled));

    column![
        text("Input files").size(font::LG),
        column(rows).spacing(spacing::SM),
    ]
    .spacing(spacing::SM)
    .into()
}

fn path_row(app: &App, field: InputField, enabled: bool) -> Element<'_, Message> {
    let (label, placeholder) = match field {
        InputField::Xml => ("XML (Premiere Pro):", "Select the XML export..."),
        InputField::Excel => ("Excel (scores):", "Select the score sheet..."),
        InputField::Videos => ("Videos:", "Select the video files..."),
        InputField::Output => ("Output:", "output_final.mp4"),
    };

    let input = text_input(placeholder, &app.state.field_text(field))
        .on_input_maybe(enabled.then_some(move |s| Message::PathEdited(field, s)))
        .width(Length::Fill)
        .size(font::NORMAL);

    row![
        text(label).size(font::NORMAL).width(Length::Fixed(LABEL_WIDTH)),
        input,
        button(text("Browse").size(font::SM))
            .on_press_maybe(enabled.then_some(Message::Browse(field)))
            .padding([spacing::XS, spacing::SM]),
    ]
    .spacing(spacing::SM)
    .align_y(Vertical::Center)
    .into()
}

/// Generate button plus progress bar and time remaining while running.
fn generate_section(app: &App) -> Element<'_, Message> {
    let processing = app.state.is_processing();
    let label = if processing {
        "Generating..."
    } else {
        "Generate video"
    };

    let generate = button(text(label).size(font::LG))
        .on_press_maybe(app.state.can_generate().then_some(Message::Generate))
        .padding([spacing::SM, spacing::XL]);

    let mut section = column![container(generate).center_x(Length::Fill)].spacing(spacing::SM);

    let progress = app.state.progress();
    if progress.visible {
        let status = match &progress.remaining {
            Some(remaining) => format!("{}% • time remaining: ~{}", progress.percent, remaining),
            None => format!("{}% • starting...", progress.percent),
        };
        section = section
            .push(progress_bar(0.0..=100.0, f32::from(progress.percent)))
            .push(
                text(status)
                    .size(font::SM)
                    .color(colors::TEXT_SECONDARY),
            );
    }

    section.into()
}

/// Scrollable monospace log console.
fn log_section(app: &App) -> Element<'_, Message> {
    let lines = app.state.log().iter().map(log_line);

    let console = scrollable(
        container(column(lines).spacing(2.0))
            .padding(spacing::SM)
            .width(Length::Fill),
    )
    .anchor_bottom()
    .height(Length::Fill);

    column![
        text("Log").size(font::LG),
        container(console)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(container::bordered_box),
    ]
    .spacing(spacing::SM)
    .height(Length::Fill)
    .into()
}

fn log_line(entry: &LogEntry) -> Element<'_, Message> {
    let line = text(entry.render()).size(font::SM).font(Font::MONOSPACE);
    match entry.kind {
        LogKind::Info => line.into(),
        LogKind::Success => line.color(colors::SUCCESS).into(),
        LogKind::Error => line.color(colors::ERROR).into(),
    }
}

fn footer<'a>() -> Element<'a, Message> {
    row![
        text(format!("Version {}", overlay_core::version()))
            .size(font::SM)
            .color(colors::TEXT_SECONDARY)
            .width(Length::Fill),
        button(text("Check for updates").size(font::SM))
            .on_press(Message::CheckForUpdates)
            .padding([spacing::XS, spacing::SM]),
    ]
    .spacing(spacing::SM)
    .align_y(Vertical::Center)
    .into()
}
