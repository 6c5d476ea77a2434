//! Vertical volume meter with a dBFS scale.

use egui::{pos2, Align2, FontId, Rect, Response, Sense, Stroke, StrokeKind, Ui, Vec2, Widget};
use mixer_core::widget::{meter_fill, MeterWidget, METER_FLOOR_DBFS};

use crate::layout::{self, colors};

const SCALE_WIDTH: f32 = 26.0;
const SCALE_STEP_DB: f64 = 10.0;

/// Scale marks from 0 dBFS down to the meter floor.
pub fn scale_ticks() -> impl Iterator<Item = f64> {
    let count = (-METER_FLOOR_DBFS / SCALE_STEP_DB).round() as u32;
    (0..=count).map(|i| 0.0 - SCALE_STEP_DB * f64::from(i))
}

/// Bar meter for [`MeterWidget`].
pub struct VolumeMeter<'a> {
    meter: &'a MeterWidget,
    width: f32,
    height: f32,
}

impl<'a> VolumeMeter<'a> {
    /// Meter at the default size.
    pub fn new(meter: &'a MeterWidget) -> Self {
        Self {
            meter,
            width: 56.0,
            height: layout::CONTROL_HEIGHT,
        }
    }

    /// Override the bar height.
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }
}

impl Widget for VolumeMeter<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) =
            ui.allocate_exact_size(Vec2::new(self.width, self.height), Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let bar = Rect::from_min_max(pos2(rect.min.x + SCALE_WIDTH, rect.min.y), rect.max);
            painter.rect_filled(bar, 2.0, ui.visuals().extreme_bg_color);

            let fill = self.meter.fill.clamp(0.0, 1.0) as f32;
            if fill > 0.0 {
                let top = bar.max.y - bar.height() * fill;
                painter.rect_filled(
                    Rect::from_min_max(pos2(bar.min.x, top), bar.max),
                    2.0,
                    layout::meter_color(self.meter.fill),
                );
            }

            for db in scale_ticks() {
                let y = bar.max.y - bar.height() * meter_fill(Some(db)) as f32;
                painter.line_segment(
                    [pos2(bar.min.x - 4.0, y), pos2(bar.min.x, y)],
                    Stroke::new(1.0, colors::MUTED),
                );
                painter.text(
                    pos2(bar.min.x - 6.0, y),
                    Align2::RIGHT_CENTER,
                    format!("{db:.0}"),
                    FontId::monospace(9.0),
                    colors::MUTED,
                );
            }

            painter.rect_stroke(bar, 2.0, Stroke::new(1.0, colors::BORDER), StrokeKind::Inside);
        }

        response.on_hover_text(self.meter.display.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_spans_floor_to_zero() {
        let ticks: Vec<f64> = scale_ticks().collect();
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&METER_FLOOR_DBFS));
        assert_eq!(ticks.len(), 6);
    }
}
