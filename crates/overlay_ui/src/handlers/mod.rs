//! Handler methods for the App struct, grouped by concern.

mod browse;
mod dialogs;
mod processing;
mod update;
