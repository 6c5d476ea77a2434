//! Main application state and eframe integration.

use anyhow::{Context, Result};
use egui::RichText;
use mixer_client::{ActuatorClient, TelemetryClient};
use mixer_core::{ControlPanel, ControlWidget, PanelConfig, UpdateSink, WidgetId};
use std::time::{Duration, Instant};

use crate::actions::{ActionDispatcher, ActionReport, PanelAction};
use crate::layout::{self, colors};
use crate::poller::StatusPoller;
use crate::publisher::SpawnedPublisher;
use crate::widgets::{Lamp, Readout, SliderEvent, VerticalSlider, VolumeMeter};

/// Upper bound between repaints while idle, so poll results show promptly.
const IDLE_REPAINT: Duration = Duration::from_millis(100);

/// Apply slider events collected during a frame, in order.
///
/// Events for unknown widgets are logged and skipped.
pub fn apply_slider_events(
    panel: &mut ControlPanel,
    events: &[(WidgetId, SliderEvent)],
    sink: &dyn UpdateSink,
) {
    for &(id, event) in events {
        let result = match event {
            SliderEvent::BeginEdit => panel.begin_edit(id),
            SliderEvent::Preview(value) => panel.preview(id, value),
            SliderEvent::Commit(value) => panel.commit(id, value, sink).map(|_| ()),
            SliderEvent::EndEdit => panel.end_edit(id),
        };
        if let Err(e) = result {
            tracing::warn!(%id, ?event, error = %e, "slider event rejected");
        }
    }
}

/// Echo mixer control panel.
pub struct MixerApp {
    /// Tokio runtime for HTTP traffic
    runtime: tokio::runtime::Runtime,
    panel: ControlPanel,
    telemetry: TelemetryClient,
    poller: StatusPoller,
    publisher: SpawnedPublisher,
    actions: ActionDispatcher,
    last_report: Option<ActionReport>,
}

impl MixerApp {
    /// Build the panel from `config`.
    ///
    /// Performs one blocking status fetch, bounded by the request timeout, so
    /// the first frame already shows live values. A failed fetch is not fatal:
    /// sliders start at their centres and lamps show disconnected.
    pub fn new(config: &PanelConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        let telemetry = TelemetryClient::new(&config.telemetry.base_url, config.request_timeout())
            .context("Invalid telemetry base_url")?;
        let actuator = match ActuatorClient::new(&config.facade_url, config.request_timeout()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(url = %config.facade_url, error = %e, "actuator buttons disabled");
                None
            }
        };

        let initial = match runtime.block_on(telemetry.fetch_status()) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(url = %telemetry.base(), error = %e, "initial status fetch failed");
                None
            }
        };

        let mut panel = ControlPanel::build(config.layout, initial.as_ref());
        match initial {
            Some(snapshot) => {
                panel.apply_snapshot(snapshot);
            }
            None => panel.mark_disconnected(),
        }

        let publisher = SpawnedPublisher::new(telemetry.clone(), runtime.handle().clone());
        let actions = ActionDispatcher::new(telemetry.clone(), actuator);

        Ok(Self {
            runtime,
            panel,
            telemetry,
            poller: StatusPoller::new(config.poll_interval()),
            publisher,
            actions,
            last_report: None,
        })
    }

    /// Configure egui style with consistent spacing.
    pub fn install_style(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = layout::ITEM_SPACING;
        ctx.set_style(style);
    }

    /// Panel model.
    #[must_use]
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn render_toolbar(&self, ctx: &egui::Context) -> Option<PanelAction> {
        egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                let mut clicked = None;
                ui.horizontal(|ui| {
                    ui.heading("Echo Mixer");
                    ui.separator();
                    for action in PanelAction::ALL {
                        if ui.button(action.label()).clicked() {
                            clicked = Some(action);
                        }
                    }
                    if self.actions.pending() > 0 {
                        ui.spinner();
                    }
                    if let Some(report) = &self.last_report {
                        ui.separator();
                        let color = if report.is_ok() {
                            colors::SUCCESS
                        } else {
                            colors::ERROR
                        };
                        ui.colored_label(color, report.summary());
                    }
                });
                clicked
            })
            .inner
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let (color, label) = layout::connection_indicator(self.panel.connection());
                ui.colored_label(color, "●");
                ui.label(label);
                ui.separator();
                ui.label(self.telemetry.base().as_str());
                ui.separator();

                match self.poller.last_applied() {
                    Some(at) => ui.label(format!("Last poll {:.1}s ago", at.elapsed().as_secs_f64())),
                    None => ui.label("No poll yet"),
                };

                let editing = self.panel.edit_owned().len();
                if editing > 0 {
                    ui.separator();
                    ui.colored_label(colors::ACCENT, format!("Editing {editing}"));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("{:?} layout", self.panel.layout())).color(colors::MUTED),
                    );
                });
            });
        });
    }
}

/// Lay out one card per widget, left to right.
fn render_columns(ui: &mut egui::Ui, panel: &ControlPanel) -> Vec<(WidgetId, SliderEvent)> {
    let mut events = Vec::new();
    egui::ScrollArea::horizontal().show(ui, |ui| {
        ui.horizontal_top(|ui| {
            for widget in panel.widgets() {
                layout::card_frame(ui).show(ui, |ui| {
                    ui.set_width(layout::COLUMN_WIDTH);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(widget.label()).strong().size(11.0));
                        match widget {
                            ControlWidget::Meter(meter) => {
                                ui.add(VolumeMeter::new(meter));
                                ui.label(RichText::new(&meter.display).monospace());
                            }
                            ControlWidget::Slider(slider) => {
                                let output = VerticalSlider::new(slider).show(ui);
                                events.extend(output.events.into_iter().map(|e| (slider.id, e)));
                                ui.label(RichText::new(&slider.display).monospace());
                            }
                            ControlWidget::Lamp(lamp) => {
                                ui.add(Lamp::new(lamp));
                            }
                            ControlWidget::Timer(timer) => {
                                ui.add(Readout::new(timer));
                                ui.label(
                                    RichText::new(timer.source.caption())
                                        .small()
                                        .color(colors::MUTED),
                                );
                            }
                        }
                    });
                });
            }
        });
    });
    events
}

impl eframe::App for MixerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poller
            .poll_if_due(&mut self.panel, &self.telemetry, self.runtime.handle());
        for result in self.poller.drain(&mut self.panel) {
            tracing::trace!(?result, "poll applied");
        }
        if let Some(report) = self.actions.drain() {
            self.last_report = Some(report);
        }

        if let Some(action) = self.render_toolbar(ctx) {
            self.actions.dispatch(action, self.runtime.handle());
        }
        self.render_status_bar(ctx);

        let events = egui::CentralPanel::default()
            .show(ctx, |ui| render_columns(ui, &self.panel))
            .inner;
        apply_slider_events(&mut self.panel, &events, &self.publisher);

        ctx.request_repaint_after(self.poller.until_next(Instant::now()).min(IDLE_REPAINT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixer_core::{Layout, ParamId, RecordingSink};

    #[test]
    fn test_drag_publishes_once_on_release() {
        let mut panel = ControlPanel::build(Layout::Standard, None);
        let id = panel.slider_id(ParamId::Threshold).unwrap();
        let sink = RecordingSink::new();

        apply_slider_events(
            &mut panel,
            &[(id, SliderEvent::BeginEdit), (id, SliderEvent::Preview(-22.0))],
            &sink,
        );
        assert_eq!(panel.edit_owned(), vec![id]);
        assert!(sink.is_empty());

        apply_slider_events(&mut panel, &[(id, SliderEvent::Commit(-21.0))], &sink);
        assert!(panel.edit_owned().is_empty());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.updates()[0].value, -21.0);
    }

    #[test]
    fn test_focus_loss_releases_without_publish() {
        let mut panel = ControlPanel::build(Layout::Standard, None);
        let id = panel.slider_id(ParamId::EchoTaps).unwrap();
        let sink = RecordingSink::new();

        apply_slider_events(
            &mut panel,
            &[(id, SliderEvent::BeginEdit), (id, SliderEvent::EndEdit)],
            &sink,
        );
        assert!(panel.edit_owned().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_events_for_non_slider_are_skipped() {
        let mut panel = ControlPanel::build(Layout::Standard, None);
        let sink = RecordingSink::new();
        // Column 0 is the volume meter.
        apply_slider_events(&mut panel, &[(WidgetId(0), SliderEvent::Commit(1.0))], &sink);
        assert!(sink.is_empty());
    }
}
