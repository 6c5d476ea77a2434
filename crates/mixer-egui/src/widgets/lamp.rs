//! Round status lamp.

use egui::{Align2, Color32, FontId, Response, Sense, Stroke, Ui, Vec2, Widget};
use mixer_core::widget::{LampState, LampWidget};

use crate::layout::{self, colors};

/// Fill color for a lamp state. A disconnected lamp looks off.
#[must_use]
pub fn lamp_fill(state: LampState) -> Color32 {
    match state {
        LampState::On => colors::LAMP_ON,
        LampState::Off | LampState::Disconnected => colors::LAMP_OFF,
    }
}

/// Lamp for [`LampWidget`], labelled with its on/off text.
pub struct Lamp<'a> {
    lamp: &'a LampWidget,
    diameter: f32,
}

impl<'a> Lamp<'a> {
    /// Lamp at the default diameter.
    pub fn new(lamp: &'a LampWidget) -> Self {
        Self {
            lamp,
            diameter: layout::LAMP_DIAMETER,
        }
    }
}

impl Widget for Lamp<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(self.diameter), Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let radius = self.diameter / 2.0 - 1.0;
            let outline = match self.lamp.state {
                LampState::Disconnected => colors::DISCONNECTED,
                _ => colors::BORDER,
            };
            painter.circle_filled(rect.center(), radius, lamp_fill(self.lamp.state));
            painter.circle_stroke(rect.center(), radius, Stroke::new(1.5, outline));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.lamp.text(),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_renders_off() {
        assert_eq!(lamp_fill(LampState::Disconnected), lamp_fill(LampState::Off));
        assert_ne!(lamp_fill(LampState::On), lamp_fill(LampState::Off));
    }
}
