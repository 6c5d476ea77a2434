//! Control widget model.
//!
//! One [`ControlWidget`] per panel column. Each variant owns its live value
//! and displayed text and knows how to reconcile itself against a
//! [`StatusSnapshot`]:
//!
//! - **Meter**: follows `last_dbfs` whenever the snapshot reports it
//! - **Slider**: follows its parameter unless `edit_owned` is set
//! - **Lamp**: follows a boolean status field; forced off when disconnected
//! - **Timer**: shows one of two echo fields depending on `active`
//!
//! Edit ownership lives on the slider itself, so a widget can never be owned
//! without existing.

use crate::catalog::{ParameterDefinition, StatusFlag, TimerSource};
use crate::snapshot::StatusSnapshot;
use std::fmt;

/// Lowest level the meter can show; everything below renders as empty.
pub const METER_FLOOR_DBFS: f64 = -50.0;

/// Identity of a widget inside its panel (column index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Vertical volume meter.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterWidget {
    /// Widget identity.
    pub id: WidgetId,
    /// Column caption.
    pub label: &'static str,
    /// Last finite level, `None` for silence.
    pub level_dbfs: Option<f64>,
    /// Fill ratio in `0.0..=1.0`.
    pub fill: f64,
    /// Text readout.
    pub display: String,
}

impl MeterWidget {
    fn new(id: WidgetId, label: &'static str) -> Self {
        Self {
            id,
            label,
            level_dbfs: None,
            fill: 0.0,
            display: "-∞ dBFS".to_string(),
        }
    }

    fn reconcile(&mut self, snapshot: &StatusSnapshot) -> bool {
        if !snapshot.level_reported {
            return false;
        }
        let level = snapshot.level_dbfs();
        let fill = meter_fill(level);
        let display = match level {
            Some(dbfs) => format!("{:.1} dBFS", dbfs),
            None => "-∞ dBFS".to_string(),
        };
        let changed = self.level_dbfs != level || self.display != display;
        self.level_dbfs = level;
        self.fill = fill;
        self.display = display;
        changed
    }
}

/// Fill ratio for a level measured against [`METER_FLOOR_DBFS`].
#[must_use]
pub fn meter_fill(level_dbfs: Option<f64>) -> f64 {
    match level_dbfs {
        Some(dbfs) if dbfs.is_finite() => {
            ((dbfs - METER_FLOOR_DBFS) / -METER_FLOOR_DBFS).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

/// Slider bound to one catalog parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderWidget {
    /// Widget identity.
    pub id: WidgetId,
    /// Bound parameter.
    pub definition: ParameterDefinition,
    /// Live value.
    pub value: f64,
    /// Formatted live value.
    pub display: String,
    /// Currently under direct user manipulation.
    pub edit_owned: bool,
}

impl SliderWidget {
    fn new(id: WidgetId, definition: ParameterDefinition, value: f64) -> Self {
        let display = definition.format_value(value);
        Self {
            id,
            definition,
            value,
            display,
            edit_owned: false,
        }
    }

    /// Set the live value and refresh the display text.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.display = self.definition.format_value(value);
    }

    fn reconcile(&mut self, snapshot: &StatusSnapshot) -> bool {
        if self.edit_owned {
            return false;
        }
        match snapshot.param(self.definition.id) {
            Some(remote) if remote != self.value => {
                self.set_value(remote);
                true
            }
            _ => false,
        }
    }
}

/// Visual state of a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampState {
    /// Flag set.
    On,
    /// Flag clear.
    Off,
    /// No telemetry; rendered as off.
    Disconnected,
}

/// Indicator bound to a boolean status field.
#[derive(Debug, Clone, PartialEq)]
pub struct LampWidget {
    /// Widget identity.
    pub id: WidgetId,
    /// Column caption.
    pub label: &'static str,
    /// Bound status field.
    pub flag: StatusFlag,
    /// Current visual state.
    pub state: LampState,
}

impl LampWidget {
    fn new(id: WidgetId, label: &'static str, flag: StatusFlag) -> Self {
        Self {
            id,
            label,
            flag,
            state: LampState::Off,
        }
    }

    /// Whether the lamp is lit.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state == LampState::On
    }

    /// Text shown inside the lamp.
    #[must_use]
    pub fn text(&self) -> &'static str {
        if self.is_on() {
            self.flag.on_label()
        } else {
            self.flag.off_label()
        }
    }

    fn reconcile(&mut self, snapshot: &StatusSnapshot) -> bool {
        let state = if snapshot.flag(self.flag) {
            LampState::On
        } else {
            LampState::Off
        };
        let changed = self.state != state;
        self.state = state;
        changed
    }

    fn mark_disconnected(&mut self) -> bool {
        let changed = self.state != LampState::Disconnected;
        self.state = LampState::Disconnected;
        changed
    }
}

/// Readout of an echo volume, switched by the echo `active` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerWidget {
    /// Widget identity.
    pub id: WidgetId,
    /// Column caption.
    pub label: &'static str,
    /// Field pair to display.
    pub source: TimerSource,
    /// Last shown value.
    pub value: Option<f64>,
    /// Text readout.
    pub display: String,
}

impl TimerWidget {
    fn new(id: WidgetId, label: &'static str, source: TimerSource) -> Self {
        Self {
            id,
            label,
            source,
            value: None,
            display: "0.00".to_string(),
        }
    }

    fn reconcile(&mut self, snapshot: &StatusSnapshot) -> bool {
        // Snapshots without an echo unit leave the readout alone.
        let Some(value) = snapshot.timer(self.source) else {
            return false;
        };
        let changed = self.value != Some(value);
        self.value = Some(value);
        self.display = format!("{:.2}", value);
        changed
    }
}

/// One panel widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlWidget {
    /// Volume meter.
    Meter(MeterWidget),
    /// Parameter slider.
    Slider(SliderWidget),
    /// Status lamp.
    Lamp(LampWidget),
    /// Timer-style readout.
    Timer(TimerWidget),
}

impl ControlWidget {
    /// Build a meter.
    #[must_use]
    pub fn meter(id: WidgetId, label: &'static str) -> Self {
        ControlWidget::Meter(MeterWidget::new(id, label))
    }

    /// Build a slider with an initial value.
    #[must_use]
    pub fn slider(id: WidgetId, definition: ParameterDefinition, value: f64) -> Self {
        ControlWidget::Slider(SliderWidget::new(id, definition, value))
    }

    /// Build a lamp, initially off.
    #[must_use]
    pub fn lamp(id: WidgetId, label: &'static str, flag: StatusFlag) -> Self {
        ControlWidget::Lamp(LampWidget::new(id, label, flag))
    }

    /// Build a timer readout showing `0.00`.
    #[must_use]
    pub fn timer(id: WidgetId, label: &'static str, source: TimerSource) -> Self {
        ControlWidget::Timer(TimerWidget::new(id, label, source))
    }

    /// Widget identity.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        match self {
            ControlWidget::Meter(w) => w.id,
            ControlWidget::Slider(w) => w.id,
            ControlWidget::Lamp(w) => w.id,
            ControlWidget::Timer(w) => w.id,
        }
    }

    /// Column caption.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ControlWidget::Meter(w) => w.label,
            ControlWidget::Slider(w) => w.definition.label,
            ControlWidget::Lamp(w) => w.label,
            ControlWidget::Timer(w) => w.label,
        }
    }

    /// Apply a snapshot. Returns `true` when visible state changed.
    pub fn reconcile(&mut self, snapshot: &StatusSnapshot) -> bool {
        match self {
            ControlWidget::Meter(w) => w.reconcile(snapshot),
            ControlWidget::Slider(w) => w.reconcile(snapshot),
            ControlWidget::Lamp(w) => w.reconcile(snapshot),
            ControlWidget::Timer(w) => w.reconcile(snapshot),
        }
    }

    /// Degrade after a failed poll. Only lamps react.
    pub fn mark_disconnected(&mut self) -> bool {
        match self {
            ControlWidget::Lamp(w) => w.mark_disconnected(),
            _ => false,
        }
    }

    /// Slider payload, if this is a slider.
    #[must_use]
    pub fn as_slider(&self) -> Option<&SliderWidget> {
        match self {
            ControlWidget::Slider(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable slider payload, if this is a slider.
    pub fn as_slider_mut(&mut self) -> Option<&mut SliderWidget> {
        match self {
            ControlWidget::Slider(w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ParamId;

    fn snapshot(threshold: f64, last_dbfs: Option<f64>) -> StatusSnapshot {
        StatusSnapshot {
            threshold_dbfs: threshold,
            lockout_sec: 2.0,
            mic_enabled: true,
            last_dbfs,
            level_reported: true,
            last_rms: None,
            updated: None,
            echo_params: None,
        }
    }

    #[test]
    fn test_meter_fill_against_floor() {
        assert_eq!(meter_fill(Some(-50.0)), 0.0);
        assert_eq!(meter_fill(Some(-25.0)), 0.5);
        assert_eq!(meter_fill(Some(0.0)), 1.0);
        assert_eq!(meter_fill(Some(-80.0)), 0.0);
        assert_eq!(meter_fill(Some(6.0)), 1.0);
        assert_eq!(meter_fill(None), 0.0);
    }

    #[test]
    fn test_meter_readout() {
        let mut meter = ControlWidget::meter(WidgetId(0), "VOLUME");
        assert!(meter.reconcile(&snapshot(-25.0, Some(-12.34))));
        match &meter {
            ControlWidget::Meter(m) => {
                assert_eq!(m.display, "-12.3 dBFS");
                assert!((m.fill - 0.7532).abs() < 1e-9);
            }
            other => panic!("unexpected widget {other:?}"),
        }
        meter.reconcile(&snapshot(-25.0, None));
        match &meter {
            ControlWidget::Meter(m) => assert_eq!(m.display, "-∞ dBFS"),
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn test_meter_keeps_level_when_field_missing() {
        let mut meter = ControlWidget::meter(WidgetId(0), "VOLUME");
        meter.reconcile(&snapshot(-25.0, Some(-12.34)));

        let mut partial = snapshot(-25.0, None);
        partial.level_reported = false;
        assert!(!meter.reconcile(&partial));
        match &meter {
            ControlWidget::Meter(m) => {
                assert_eq!(m.display, "-12.3 dBFS");
                assert_eq!(m.level_dbfs, Some(-12.34));
            }
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn test_owned_slider_ignores_snapshot() {
        let def = ParameterDefinition::builtin(ParamId::Threshold);
        let mut slider = ControlWidget::slider(WidgetId(1), def, -10.0);
        if let Some(s) = slider.as_slider_mut() {
            s.edit_owned = true;
        }
        assert!(!slider.reconcile(&snapshot(-40.0, None)));
        assert_eq!(slider.as_slider().map(|s| s.value), Some(-10.0));

        if let Some(s) = slider.as_slider_mut() {
            s.edit_owned = false;
        }
        assert!(slider.reconcile(&snapshot(-40.0, None)));
        assert_eq!(
            slider.as_slider().map(|s| s.display.as_str()),
            Some("-40.0 dBFS")
        );
    }

    #[test]
    fn test_lamp_disconnected_reads_off() {
        let mut lamp = ControlWidget::lamp(WidgetId(2), "MIC STATUS", StatusFlag::MicEnabled);
        lamp.reconcile(&snapshot(-25.0, None));
        assert!(lamp.mark_disconnected());
        match &lamp {
            ControlWidget::Lamp(l) => {
                assert_eq!(l.state, LampState::Disconnected);
                assert_eq!(l.text(), "OFF");
            }
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn test_timer_untouched_without_echo_unit() {
        let mut timer = ControlWidget::timer(WidgetId(3), "ECHO VOLUME", TimerSource::EnvelopeVolume);
        assert!(!timer.reconcile(&snapshot(-25.0, None)));
        match &timer {
            ControlWidget::Timer(t) => assert_eq!(t.display, "0.00"),
            other => panic!("unexpected widget {other:?}"),
        }
    }
}
