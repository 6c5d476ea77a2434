//! Layout constants and frame helpers for the mixer panel.

use egui::{Color32, CornerRadius, Stroke, Vec2};
use mixer_core::ConnectionState;

/// Width of one panel column.
pub const COLUMN_WIDTH: f32 = 96.0;
/// Height of meters and sliders.
pub const CONTROL_HEIGHT: f32 = 220.0;
/// Lamp size.
pub const LAMP_DIAMETER: f32 = 44.0;

/// Spacing between items.
pub const ITEM_SPACING: Vec2 = Vec2::new(6.0, 8.0);
/// Inner margin of cards.
pub const PANEL_PADDING: f32 = 8.0;

/// Corner radius of cards.
pub const CARD_ROUNDING: CornerRadius = CornerRadius::same(4);

/// Palette.
#[allow(missing_docs)]
pub mod colors {
    use super::*;

    pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);
    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);
    pub const WARNING: Color32 = Color32::from_rgb(234, 179, 8);

    pub const CONNECTED: Color32 = SUCCESS;
    pub const DISCONNECTED: Color32 = Color32::from_rgb(156, 163, 175);

    pub const LAMP_ON: Color32 = SUCCESS;
    pub const LAMP_OFF: Color32 = ERROR;

    pub const ACCENT: Color32 = Color32::from_rgb(99, 102, 241);
    pub const MUTED: Color32 = Color32::from_rgb(107, 114, 128);
    pub const BORDER: Color32 = Color32::from_rgb(55, 65, 81);
}

/// Indicator color and label for the status bar.
#[must_use]
pub fn connection_indicator(state: ConnectionState) -> (Color32, &'static str) {
    match state {
        ConnectionState::Unknown => (colors::WARNING, "Connecting"),
        ConnectionState::Connected => (colors::CONNECTED, "Connected"),
        ConnectionState::Disconnected => (colors::ERROR, "Disconnected"),
    }
}

/// Meter color for a fill ratio: green, then amber near the top, red at clip.
#[must_use]
pub fn meter_color(fill: f64) -> Color32 {
    if fill >= 0.9 {
        colors::ERROR
    } else if fill >= 0.7 {
        colors::WARNING
    } else {
        colors::SUCCESS
    }
}

/// Frame around one column.
pub fn card_frame(ui: &egui::Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .corner_radius(CARD_ROUNDING)
        .inner_margin(PANEL_PADDING)
        .stroke(Stroke::new(1.0, colors::BORDER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_colors() {
        assert_eq!(connection_indicator(ConnectionState::Connected).0, colors::CONNECTED);
        assert_eq!(connection_indicator(ConnectionState::Disconnected).1, "Disconnected");
        assert_ne!(
            connection_indicator(ConnectionState::Unknown).0,
            connection_indicator(ConnectionState::Connected).0
        );
    }

    #[test]
    fn test_meter_color_bands() {
        assert_eq!(meter_color(0.0), colors::SUCCESS);
        assert_eq!(meter_color(0.75), colors::WARNING);
        assert_eq!(meter_color(1.0), colors::ERROR);
    }

    #[test]
    fn test_lamp_colors_distinct() {
        assert_ne!(colors::LAMP_ON, colors::LAMP_OFF);
    }
}
