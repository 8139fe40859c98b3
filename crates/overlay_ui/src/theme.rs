//! Theme configuration for Padel Overlay.
//!
//! Colors and sizes shared by the views; the base theme is iced's dark theme.

use iced::Color;

/// Application colors.
pub mod colors {
    use super::Color;

    /// Header accent
    pub const PRIMARY: Color = Color::from_rgb(0.30, 0.62, 0.95);

    /// Success log lines
    pub const SUCCESS: Color = Color::from_rgb(0.40, 0.80, 0.45);

    /// Error and stderr log lines
    pub const ERROR: Color = Color::from_rgb(0.95, 0.42, 0.42);

    /// Text secondary
    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.60, 0.60, 0.60);
}

/// Spacing constants.
pub mod spacing {
    /// Extra small spacing (4px)
    pub const XS: f32 = 4.0;
    /// Small spacing (8px)
    pub const SM: f32 = 8.0;
    /// Medium spacing (12px)
    pub const MD: f32 = 12.0;
    /// Large spacing (16px)
    pub const LG: f32 = 16.0;
    /// Extra large spacing (24px)
    pub const XL: f32 = 24.0;
}

/// Font sizes.
pub mod font {
    /// Small font size
    pub const SM: f32 = 11.0;
    /// Normal font size
    pub const NORMAL: f32 = 13.0;
    /// Large font size
    pub const LG: f32 = 16.0;
    /// Header font size
    pub const HEADER: f32 = 22.0;
}

/// Width of the label column in path rows.
pub const LABEL_WIDTH: f32 = 140.0;
