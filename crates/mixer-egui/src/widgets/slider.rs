//! Vertical parameter slider with a centre marker.
//!
//! The slider never writes to the panel model itself. It reports what the
//! user did as [`SliderEvent`]s:
//!
//! | Input | Events |
//! |-------|--------|
//! | drag start, focus gained | [`SliderEvent::BeginEdit`] |
//! | pointer moves while dragging | [`SliderEvent::Preview`] |
//! | drag stop, click, arrow key | [`SliderEvent::Commit`] |
//! | focus lost | [`SliderEvent::EndEdit`] |

use egui::{
    pos2, Align2, EventFilter, FontId, Key, PointerButton, Rect, Response, Sense, Stroke,
    StrokeKind, Ui, Vec2,
};
use mixer_core::widget::SliderWidget;

use crate::layout::{self, colors};

const TRACK_WIDTH: f32 = 6.0;
const HANDLE_HEIGHT: f32 = 10.0;

/// One user action on a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderEvent {
    /// Take edit ownership.
    BeginEdit,
    /// Show an in-progress value.
    Preview(f64),
    /// Settle on a value and publish it.
    Commit(f64),
    /// Release ownership without publishing.
    EndEdit,
}

/// Raw input flags for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    /// Drag began this frame.
    pub drag_started: bool,
    /// Pointer is dragging the handle.
    pub dragging: bool,
    /// Drag ended this frame.
    pub drag_stopped: bool,
    /// Press and release without a drag.
    pub clicked: bool,
    /// Value stepped from the keyboard.
    pub key_step: bool,
    /// Keyboard focus arrived this frame.
    pub gained_focus: bool,
    /// Keyboard focus left this frame.
    pub lost_focus: bool,
}

impl Interaction {
    /// Translate input flags into panel events, in application order.
    #[must_use]
    pub fn events(&self, value: f64) -> Vec<SliderEvent> {
        let mut events = Vec::new();
        if self.drag_started || self.gained_focus {
            events.push(SliderEvent::BeginEdit);
        }
        if self.drag_stopped || self.clicked || self.key_step {
            events.push(SliderEvent::Commit(value));
        } else if self.dragging {
            events.push(SliderEvent::Preview(value));
        }
        if self.lost_focus {
            events.push(SliderEvent::EndEdit);
        }
        events
    }
}

/// Response plus the panel events produced this frame.
pub struct SliderOutput {
    /// egui response of the track area.
    pub response: Response,
    /// Events to apply to the panel.
    pub events: Vec<SliderEvent>,
}

/// Vertical slider for one [`SliderWidget`].
pub struct VerticalSlider<'a> {
    slider: &'a SliderWidget,
    width: f32,
    height: f32,
}

impl<'a> VerticalSlider<'a> {
    /// Slider at the default size.
    pub fn new(slider: &'a SliderWidget) -> Self {
        Self {
            slider,
            width: 40.0,
            height: layout::CONTROL_HEIGHT,
        }
    }

    /// Override the track height.
    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    fn value_at(&self, track: Rect, y: f32) -> f64 {
        let domain = &self.slider.definition.domain;
        let range = domain.range();
        let t = f64::from(((track.max.y - y) / track.height()).clamp(0.0, 1.0));
        domain.quantize(range.start() + (range.end() - range.start()) * t)
    }

    fn y_at(track: Rect, fraction: f64) -> f32 {
        track.max.y - track.height() * fraction as f32
    }

    /// Paint the slider and collect this frame's events.
    pub fn show(self, ui: &mut Ui) -> SliderOutput {
        let (rect, mut response) =
            ui.allocate_exact_size(Vec2::new(self.width, self.height), Sense::click_and_drag());
        let track = rect.shrink2(Vec2::new(0.0, HANDLE_HEIGHT / 2.0));

        let domain = &self.slider.definition.domain;
        let mut value = self.slider.value;
        let mut input = Interaction {
            drag_started: response.drag_started_by(PointerButton::Primary),
            drag_stopped: response.drag_stopped_by(PointerButton::Primary),
            clicked: response.clicked(),
            gained_focus: response.gained_focus(),
            lost_focus: response.lost_focus(),
            ..Interaction::default()
        };

        if response.dragged_by(PointerButton::Primary) || input.clicked || input.drag_stopped {
            if let Some(pointer) = ui.ctx().pointer_interact_pos() {
                let dragged = self.value_at(track, pointer.y);
                input.dragging = response.dragged() && dragged != value;
                value = dragged;
            }
        }

        if response.has_focus() && !response.dragged() {
            // Keep arrow keys for stepping instead of focus navigation.
            ui.memory_mut(|m| {
                m.set_focus_lock_filter(
                    response.id,
                    EventFilter {
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        ..Default::default()
                    },
                );
            });
            let (up, down) = ui.input(|i| {
                (
                    i.key_pressed(Key::ArrowUp) || i.key_pressed(Key::ArrowRight),
                    i.key_pressed(Key::ArrowDown) || i.key_pressed(Key::ArrowLeft),
                )
            });
            let delta = match (up, down) {
                (true, false) => domain.step(),
                (false, true) => -domain.step(),
                _ => 0.0,
            };
            if delta != 0.0 {
                value = domain.quantize(value + delta);
                input.key_step = true;
            }
        }

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let x = rect.center().x;
            let rail = Rect::from_center_size(
                pos2(x, track.center().y),
                Vec2::new(TRACK_WIDTH, track.height()),
            );
            painter.rect_filled(rail, 3.0, ui.visuals().widgets.inactive.bg_fill);

            let handle_y = Self::y_at(track, domain.fraction(value));
            painter.rect_filled(
                Rect::from_min_max(pos2(rail.min.x, handle_y), rail.max),
                3.0,
                colors::ACCENT,
            );

            let center_y = Self::y_at(track, self.slider.definition.center_fraction());
            painter.line_segment(
                [pos2(rect.min.x + 2.0, center_y), pos2(rect.max.x - 2.0, center_y)],
                Stroke::new(1.0, colors::MUTED),
            );

            let handle = Rect::from_center_size(
                pos2(x, handle_y),
                Vec2::new(self.width - 8.0, HANDLE_HEIGHT),
            );
            let handle_fill = if response.hovered() || response.has_focus() {
                ui.visuals().widgets.hovered.bg_fill
            } else {
                ui.visuals().widgets.inactive.fg_stroke.color
            };
            painter.rect_filled(handle, 2.0, handle_fill);
            if self.slider.edit_owned {
                painter.rect_stroke(handle, 2.0, Stroke::new(1.5, colors::ACCENT), StrokeKind::Outside);
            }

            let range = domain.range();
            for (bound, y) in [(*range.end(), track.min.y), (*range.start(), track.max.y)] {
                painter.text(
                    pos2(rect.max.x, y),
                    Align2::LEFT_CENTER,
                    self.slider.definition.format_value(bound),
                    FontId::proportional(8.0),
                    colors::MUTED,
                );
            }
        }

        let events = input.events(value);
        if events
            .iter()
            .any(|e| matches!(e, SliderEvent::Preview(_) | SliderEvent::Commit(_)))
        {
            response.mark_changed();
            ui.ctx().request_repaint();
        }

        SliderOutput { response, events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_sequence() {
        let start = Interaction {
            drag_started: true,
            dragging: true,
            ..Default::default()
        };
        assert_eq!(
            start.events(-20.0),
            vec![SliderEvent::BeginEdit, SliderEvent::Preview(-20.0)]
        );

        let moving = Interaction {
            dragging: true,
            ..Default::default()
        };
        assert_eq!(moving.events(-19.0), vec![SliderEvent::Preview(-19.0)]);

        let stop = Interaction {
            drag_stopped: true,
            ..Default::default()
        };
        assert_eq!(stop.events(-19.0), vec![SliderEvent::Commit(-19.0)]);
    }

    #[test]
    fn test_click_commits_once() {
        let click = Interaction {
            clicked: true,
            ..Default::default()
        };
        assert_eq!(click.events(0.5), vec![SliderEvent::Commit(0.5)]);
    }

    #[test]
    fn test_focus_brackets_keyboard_edit() {
        let focus = Interaction {
            gained_focus: true,
            ..Default::default()
        };
        assert_eq!(focus.events(3.0), vec![SliderEvent::BeginEdit]);

        let key = Interaction {
            key_step: true,
            ..Default::default()
        };
        assert_eq!(key.events(4.0), vec![SliderEvent::Commit(4.0)]);

        let blur = Interaction {
            lost_focus: true,
            ..Default::default()
        };
        assert_eq!(blur.events(4.0), vec![SliderEvent::EndEdit]);
    }

    #[test]
    fn test_idle_frame_is_silent() {
        assert!(Interaction::default().events(1.0).is_empty());
    }
}
