//! Control panel model: renderer, edit ownership and poll reconciliation.
//!
//! [`ControlPanel`] is the single owner of every widget's live value. Two
//! writers touch it:
//!
//! - **User edits**: [`begin_edit`](ControlPanel::begin_edit),
//!   [`preview`](ControlPanel::preview), [`end_edit`](ControlPanel::end_edit)
//!   and [`commit`](ControlPanel::commit)
//! - **Status Poller**: [`begin_poll`](ControlPanel::begin_poll) hands out a
//!   generation number, [`apply_poll`](ControlPanel::apply_poll) reconciles the
//!   result unless a newer poll was already applied
//!
//! Both run on the UI thread, so no locking is involved.
//!
//! # Example
//!
//! ```
//! use mixer_core::catalog::{Layout, ParamId};
//! use mixer_core::panel::ControlPanel;
//! use mixer_core::publisher::RecordingSink;
//!
//! let mut panel = ControlPanel::build(Layout::Standard, None);
//! let id = panel.slider_id(ParamId::Threshold).unwrap();
//! let sink = RecordingSink::new();
//!
//! panel.begin_edit(id).unwrap();
//! panel.commit(id, -18.2, &sink).unwrap();
//! assert_eq!(sink.updates()[0].value, -18.0);
//! ```

use crate::catalog::{Catalog, ColumnKind, Layout, ParamId};
use crate::error::PanelError;
use crate::publisher::{ParameterUpdate, UpdateSink};
use crate::snapshot::StatusSnapshot;
use crate::widget::{ControlWidget, SliderWidget, WidgetId};

/// Connection state as seen by the last applied poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No poll applied yet.
    #[default]
    Unknown,
    /// Last applied poll returned a snapshot.
    Connected,
    /// Last applied poll failed.
    Disconnected,
}

/// Generation handed to one poll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket {
    /// Monotonically increasing poll number, starting at 1.
    pub generation: u64,
}

/// Result of one poll round trip.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Snapshot fetched.
    Snapshot(StatusSnapshot),
    /// Fetch failed; the message is only logged.
    Failed(String),
}

/// What [`ControlPanel::apply_poll`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// Snapshot reconciled; `changed` widgets had visible changes.
    Applied {
        /// Number of widgets whose visible state changed.
        changed: usize,
    },
    /// Older than the last applied poll; discarded.
    Stale,
    /// Fetch failure applied; lamps degraded.
    Degraded,
}

/// Renderer model for one panel.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    layout: Layout,
    catalog: Catalog,
    widgets: Vec<ControlWidget>,
    next_generation: u64,
    applied_generation: u64,
    connection: ConnectionState,
    last_snapshot: Option<StatusSnapshot>,
}

impl ControlPanel {
    /// Build one widget per layout column.
    ///
    /// # Arguments
    ///
    /// * `layout` - Column layout and parameter catalog to use
    /// * `initial` - First snapshot, if the initial fetch succeeded
    ///
    /// Sliders start at the snapshot's value, or at the parameter's centre
    /// when the snapshot is missing or lacks the field. Meter, lamps and timer
    /// start blank and are filled by the first poll.
    #[must_use]
    pub fn build(layout: Layout, initial: Option<&StatusSnapshot>) -> Self {
        let catalog = layout.catalog();
        let mut widgets = Vec::new();

        for (index, column) in layout.columns().into_iter().enumerate() {
            let id = WidgetId(index);
            let widget = match column.kind {
                ColumnKind::Meter => ControlWidget::meter(id, column.label),
                ColumnKind::Slider(param) => {
                    let Some(definition) = catalog.get(param).cloned() else {
                        tracing::warn!(%param, "column references a parameter outside the catalog");
                        continue;
                    };
                    let value = initial
                        .and_then(|s| s.param(param))
                        .unwrap_or(definition.center);
                    ControlWidget::slider(id, definition, value)
                }
                ColumnKind::Lamp(flag) => ControlWidget::lamp(id, column.label, flag),
                ColumnKind::Timer(source) => ControlWidget::timer(id, column.label, source),
            };
            widgets.push(widget);
        }

        tracing::debug!(?layout, widgets = widgets.len(), "control panel built");

        Self {
            layout,
            catalog,
            widgets,
            next_generation: 0,
            applied_generation: 0,
            connection: ConnectionState::Unknown,
            last_snapshot: None,
        }
    }

    /// Layout the panel was built from.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Catalog backing the sliders.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Widgets in column order.
    #[must_use]
    pub fn widgets(&self) -> &[ControlWidget] {
        &self.widgets
    }

    /// Widget by identity.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&ControlWidget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    /// Identity of the slider bound to `param`.
    #[must_use]
    pub fn slider_id(&self, param: ParamId) -> Option<WidgetId> {
        self.sliders()
            .find(|s| s.definition.id == param)
            .map(|s| s.id)
    }

    /// Slider bound to `param`.
    #[must_use]
    pub fn slider(&self, param: ParamId) -> Option<&SliderWidget> {
        self.sliders().find(|s| s.definition.id == param)
    }

    /// All sliders in column order.
    pub fn sliders(&self) -> impl Iterator<Item = &SliderWidget> {
        self.widgets.iter().filter_map(ControlWidget::as_slider)
    }

    /// Identities of sliders currently under edit.
    #[must_use]
    pub fn edit_owned(&self) -> Vec<WidgetId> {
        self.sliders().filter(|s| s.edit_owned).map(|s| s.id).collect()
    }

    /// Connection state from the last applied poll.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Last snapshot that was applied.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&StatusSnapshot> {
        self.last_snapshot.as_ref()
    }

    fn slider_mut(&mut self, id: WidgetId) -> Result<&mut SliderWidget, PanelError> {
        let widget = self
            .widgets
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or(PanelError::UnknownWidget(id))?;
        widget.as_slider_mut().ok_or(PanelError::NotASlider(id))
    }

    // ---- edit ownership ----

    /// Mark a slider as under direct user manipulation.
    pub fn begin_edit(&mut self, id: WidgetId) -> Result<(), PanelError> {
        let slider = self.slider_mut(id)?;
        if !slider.edit_owned {
            tracing::trace!(param = %slider.definition.id, "edit started");
        }
        slider.edit_owned = true;
        Ok(())
    }

    /// Show an in-progress value. Nothing is published.
    pub fn preview(&mut self, id: WidgetId, value: f64) -> Result<(), PanelError> {
        let slider = self.slider_mut(id)?;
        let value = slider.definition.domain.quantize(value);
        slider.set_value(value);
        Ok(())
    }

    /// Release ownership without publishing.
    pub fn end_edit(&mut self, id: WidgetId) -> Result<(), PanelError> {
        let slider = self.slider_mut(id)?;
        slider.edit_owned = false;
        Ok(())
    }

    /// Settle a slider on `value`, publish it, then release ownership.
    ///
    /// # Arguments
    ///
    /// * `id` - Slider being committed
    /// * `value` - Raw value from the input; snapped to the parameter's step
    /// * `sink` - Receives exactly one [`ParameterUpdate`]
    ///
    /// # Returns
    ///
    /// The quantized value that was published.
    pub fn commit(
        &mut self,
        id: WidgetId,
        value: f64,
        sink: &dyn UpdateSink,
    ) -> Result<f64, PanelError> {
        let slider = self.slider_mut(id)?;
        let value = slider.definition.domain.quantize(value);
        slider.set_value(value);

        let update = ParameterUpdate::new(&slider.definition, value);
        tracing::debug!(param = %update.param, value, endpoint = update.endpoint.path(), "commit");
        sink.publish(update);

        slider.edit_owned = false;
        Ok(value)
    }

    // ---- status poller ----

    /// Reserve the next poll generation.
    pub fn begin_poll(&mut self) -> PollTicket {
        self.next_generation += 1;
        PollTicket {
            generation: self.next_generation,
        }
    }

    /// Apply a poll result unless a newer one was already applied.
    pub fn apply_poll(&mut self, generation: u64, outcome: PollOutcome) -> ApplyResult {
        if generation < self.applied_generation {
            tracing::debug!(
                generation,
                applied = self.applied_generation,
                "discarding stale poll result"
            );
            return ApplyResult::Stale;
        }
        self.applied_generation = generation;

        match outcome {
            PollOutcome::Snapshot(snapshot) => {
                let changed = self.apply_snapshot(snapshot);
                ApplyResult::Applied { changed }
            }
            PollOutcome::Failed(reason) => {
                tracing::warn!(generation, %reason, "status poll failed");
                self.mark_disconnected();
                ApplyResult::Degraded
            }
        }
    }

    /// Reconcile every widget against `snapshot`.
    ///
    /// Returns how many widgets changed visibly.
    pub fn apply_snapshot(&mut self, snapshot: StatusSnapshot) -> usize {
        let changed = self
            .widgets
            .iter_mut()
            .map(|w| w.reconcile(&snapshot))
            .filter(|changed| *changed)
            .count();
        self.connection = ConnectionState::Connected;
        self.last_snapshot = Some(snapshot);
        changed
    }

    /// Force every lamp to its disconnected state; values stay untouched.
    pub fn mark_disconnected(&mut self) {
        for widget in &mut self.widgets {
            widget.mark_disconnected();
        }
        self.connection = ConnectionState::Disconnected;
    }
}
