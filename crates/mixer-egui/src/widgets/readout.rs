//! Numeric readout for the echo level.

use egui::{Response, RichText, Ui, Widget};
use mixer_core::widget::TimerWidget;

/// Boxed monospace readout for [`TimerWidget`].
pub struct Readout<'a> {
    timer: &'a TimerWidget,
}

impl<'a> Readout<'a> {
    /// Readout for one timer widget.
    pub fn new(timer: &'a TimerWidget) -> Self {
        Self { timer }
    }
}

impl Widget for Readout<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        egui::Frame::new()
            .fill(ui.visuals().extreme_bg_color)
            .corner_radius(4.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.timer.display).monospace().size(20.0));
            })
            .response
            .on_hover_text(self.timer.source.caption())
    }
}
