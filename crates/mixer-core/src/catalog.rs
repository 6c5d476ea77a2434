//! Static parameter catalog and column layouts.
//!
//! Every adjustable parameter of the remote audio controller is described once
//! here: its numeric domain, how it is shown, where it is persisted and the
//! reference ("centre") value used when no telemetry is available. The column
//! layouts describe which widgets the panel builds and in which order.
//!
//! The catalog is immutable after construction; everything downstream (panel,
//! publisher, poller) looks parameters up by [`ParamId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Identity of an adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Noise-gate trigger threshold in dBFS.
    Threshold,
    /// Lockout time after an echo, in seconds.
    Lockout,
    /// Delay between echo taps, in seconds.
    EchoDelay,
    /// Number of echo repetitions.
    EchoTaps,
    /// Feedback ratio mixed into later taps.
    EchoFeedback,
    /// Length of the captured audio frame, in seconds.
    EchoFrameDuration,
    /// Envelope volume of the first tap.
    EchoStartVol,
    /// Envelope volume of the last tap.
    EchoEndVol,
}

impl ParamId {
    /// All known parameters, in catalog order.
    pub const ALL: [ParamId; 8] = [
        ParamId::Threshold,
        ParamId::Lockout,
        ParamId::EchoFrameDuration,
        ParamId::EchoDelay,
        ParamId::EchoTaps,
        ParamId::EchoFeedback,
        ParamId::EchoStartVol,
        ParamId::EchoEndVol,
    ];

    /// Stable upper-case key, matching the controller's own config file keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamId::Threshold => "THRESHOLD_DBFS",
            ParamId::Lockout => "LOCKOUT_SEC",
            ParamId::EchoDelay => "ECHO_DELAY_SEC",
            ParamId::EchoTaps => "ECHO_TAPS",
            ParamId::EchoFeedback => "ECHO_FEEDBACK",
            ParamId::EchoFrameDuration => "FRAME_DURATION",
            ParamId::EchoStartVol => "ECHO_START_VOL",
            ParamId::EchoEndVol => "ECHO_END_VOL",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric domain of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Real-valued range quantized to `step`.
    Continuous {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
        /// Step quantum.
        step: f64,
    },
    /// Integer range with unit steps.
    Discrete {
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
}

impl Domain {
    /// Inclusive bounds as floats.
    #[must_use]
    pub fn range(&self) -> RangeInclusive<f64> {
        match *self {
            Domain::Continuous { min, max, .. } => min..=max,
            Domain::Discrete { min, max } => (min as f64)..=(max as f64),
        }
    }

    /// Step quantum (1 for discrete domains).
    #[must_use]
    pub fn step(&self) -> f64 {
        match *self {
            Domain::Continuous { step, .. } => step,
            Domain::Discrete { .. } => 1.0,
        }
    }

    /// Whether values are sent and shown as integers.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Domain::Discrete { .. })
    }

    /// Snap `value` onto the step grid and clamp it into range.
    ///
    /// The result is rounded to the step's decimal precision so that repeated
    /// quantization never accumulates `0.30000000000000004`-style residue.
    /// Non-finite input collapses to the lower bound.
    #[must_use]
    pub fn quantize(&self, value: f64) -> f64 {
        let range = self.range();
        let (min, max) = (*range.start(), *range.end());
        if !value.is_finite() {
            return min;
        }
        let step = self.step();
        let steps = ((value - min) / step).round();
        let snapped = (min + steps * step).clamp(min, max);
        round_to(snapped, step_decimals(step))
    }

    /// Relative position of `value` inside the range, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self, value: f64) -> f64 {
        let range = self.range();
        let span = range.end() - range.start();
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - range.start()) / span).clamp(0.0, 1.0)
    }
}

fn step_decimals(step: f64) -> i32 {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// How a parameter value is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// One decimal followed by `dBFS`; non-finite values render as `-∞ dBFS`.
    Decibels,
    /// Fixed decimals followed by ` s`.
    Seconds {
        /// Digits after the decimal point.
        decimals: usize,
    },
    /// Rounded whole number.
    Integer,
    /// Ratio shown as a rounded percentage.
    Percent,
    /// Plain fixed-point number.
    Fixed {
        /// Digits after the decimal point.
        decimals: usize,
    },
}

impl DisplayFormat {
    /// Render `value` for display.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        match *self {
            DisplayFormat::Decibels if !value.is_finite() => "-∞ dBFS".to_string(),
            DisplayFormat::Decibels => format!("{:.1} dBFS", value),
            DisplayFormat::Seconds { decimals } => format!("{:.*} s", decimals, value),
            DisplayFormat::Integer => format!("{}", value.round() as i64),
            DisplayFormat::Percent => format!("{}%", (value * 100.0).round() as i64),
            DisplayFormat::Fixed { decimals } => format!("{:.*}", decimals, value),
        }
    }
}

/// Remote endpoint that persists a group of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/threshold`
    Threshold,
    /// `POST /api/lockout`
    Lockout,
    /// `POST /api/echo_params`
    EchoParams,
}

impl Endpoint {
    /// Request path relative to the telemetry base URL.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Threshold => "/api/threshold",
            Endpoint::Lockout => "/api/lockout",
            Endpoint::EchoParams => "/api/echo_params",
        }
    }
}

/// Where a parameter is persisted: endpoint plus JSON field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Field key inside the update body and the status snapshot.
    pub field: &'static str,
}

/// Declarative description of one adjustable parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter identity.
    pub id: ParamId,
    /// Column caption.
    pub label: &'static str,
    /// Numeric domain.
    pub domain: Domain,
    /// Display rule.
    pub format: DisplayFormat,
    /// Persistence binding.
    pub binding: Binding,
    /// Reference value, also the fallback when no snapshot is available.
    pub center: f64,
}

impl ParameterDefinition {
    /// Look up the built-in definition for `id`.
    #[must_use]
    pub fn builtin(id: ParamId) -> Self {
        let echo = |field| Binding {
            endpoint: Endpoint::EchoParams,
            field,
        };
        match id {
            ParamId::Threshold => Self {
                id,
                label: "THRESHOLD",
                domain: Domain::Continuous {
                    min: -50.0,
                    max: 0.0,
                    step: 0.5,
                },
                format: DisplayFormat::Decibels,
                binding: Binding {
                    endpoint: Endpoint::Threshold,
                    field: "threshold_dbfs",
                },
                center: -25.0,
            },
            ParamId::Lockout => Self {
                id,
                label: "LOCKOUT",
                domain: Domain::Continuous {
                    min: 0.0,
                    max: 10.0,
                    step: 0.1,
                },
                format: DisplayFormat::Seconds { decimals: 1 },
                binding: Binding {
                    endpoint: Endpoint::Lockout,
                    field: "lockout_sec",
                },
                center: 2.0,
            },
            ParamId::EchoDelay => Self {
                id,
                label: "ECHO DELAY",
                domain: Domain::Continuous {
                    min: 0.0,
                    max: 1.0,
                    step: 0.01,
                },
                format: DisplayFormat::Seconds { decimals: 2 },
                binding: echo("delay_sec"),
                center: 0.25,
            },
            ParamId::EchoTaps => Self {
                id,
                label: "ECHO TAPS",
                domain: Domain::Discrete { min: 1, max: 8 },
                format: DisplayFormat::Integer,
                binding: echo("taps"),
                center: 3.0,
            },
            ParamId::EchoFeedback => Self {
                id,
                label: "ECHO FEEDBACK",
                domain: Domain::Continuous {
                    min: 0.0,
                    max: 1.0,
                    step: 0.01,
                },
                format: DisplayFormat::Percent,
                binding: echo("feedback"),
                center: 0.5,
            },
            ParamId::EchoFrameDuration => Self {
                id,
                label: "FRAME DURATION",
                domain: Domain::Continuous {
                    min: 0.5,
                    max: 5.0,
                    step: 0.1,
                },
                format: DisplayFormat::Seconds { decimals: 1 },
                binding: echo("frame_duration"),
                center: 1.5,
            },
            ParamId::EchoStartVol => Self {
                id,
                label: "START VOL",
                domain: Domain::Continuous {
                    min: 0.0,
                    max: 1.5,
                    step: 0.01,
                },
                format: DisplayFormat::Fixed { decimals: 2 },
                binding: echo("start_vol"),
                center: 1.0,
            },
            ParamId::EchoEndVol => Self {
                id,
                label: "END VOL",
                domain: Domain::Continuous {
                    min: 0.0,
                    max: 1.5,
                    step: 0.01,
                },
                format: DisplayFormat::Fixed { decimals: 2 },
                binding: echo("end_vol"),
                center: 0.3,
            },
        }
    }

    /// Format `value` with this parameter's display rule.
    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        self.format.format(value)
    }

    /// Position of the centre marker inside the slider track.
    #[must_use]
    pub fn center_fraction(&self) -> f64 {
        self.domain.fraction(self.center)
    }
}

/// Immutable table of parameter definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<ParameterDefinition>,
}

impl Catalog {
    /// Build a catalog from an explicit list of parameters.
    #[must_use]
    pub fn from_ids(ids: &[ParamId]) -> Self {
        Self {
            definitions: ids.iter().map(|id| ParameterDefinition::builtin(*id)).collect(),
        }
    }

    /// Parameters of the standard panel (no frame-duration control).
    #[must_use]
    pub fn standard() -> Self {
        Self::from_ids(&[
            ParamId::Threshold,
            ParamId::Lockout,
            ParamId::EchoDelay,
            ParamId::EchoTaps,
            ParamId::EchoFeedback,
            ParamId::EchoStartVol,
            ParamId::EchoEndVol,
        ])
    }

    /// Parameters of the extended panel, adding the frame duration.
    #[must_use]
    pub fn extended() -> Self {
        Self::from_ids(&ParamId::ALL)
    }

    /// Definition for `id`, if this catalog carries it.
    #[must_use]
    pub fn get(&self, id: ParamId) -> Option<&ParameterDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Iterate definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.definitions.iter()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Boolean status field shown by a lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    /// `mic_enabled`
    MicEnabled,
    /// `echo_params.active` (or `last_triggered`)
    EchoActive,
}

impl StatusFlag {
    /// Label shown while the flag is set.
    #[must_use]
    pub fn on_label(&self) -> &'static str {
        "ON"
    }

    /// Label shown while the flag is clear or unknown.
    #[must_use]
    pub fn off_label(&self) -> &'static str {
        "OFF"
    }
}

/// Pair of snapshot fields shown by a timer-style readout.
///
/// While the echo is active the "live" field is shown, otherwise the
/// resting end volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSource {
    /// `start_vol` while active, `end_vol` at rest.
    EnvelopeVolume,
    /// Instantaneous `level` while active, `end_vol` at rest.
    LiveLevel,
}

impl TimerSource {
    /// Caption rendered above the readout.
    #[must_use]
    pub fn caption(&self) -> &'static str {
        "Echo Level"
    }
}

/// Widget kind for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Volume meter driven by `last_dbfs`.
    Meter,
    /// Slider bound to a catalog parameter.
    Slider(ParamId),
    /// Lamp bound to a boolean status field.
    Lamp(StatusFlag),
    /// Readout selected by the echo `active` flag.
    Timer(TimerSource),
}

/// One column of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column caption.
    pub label: &'static str,
    /// Widget to build.
    pub kind: ColumnKind,
}

impl Column {
    const fn new(label: &'static str, kind: ColumnKind) -> Self {
        Self { label, kind }
    }

    fn slider(id: ParamId) -> Self {
        Self::new(ParameterDefinition::builtin(id).label, ColumnKind::Slider(id))
    }
}

/// Panel configuration: which parameters and readouts are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Seven sliders, envelope-volume readout.
    #[default]
    Standard,
    /// Adds frame duration and the live echo-level readout.
    Extended,
}

impl Layout {
    /// Catalog backing this layout.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        match self {
            Layout::Standard => Catalog::standard(),
            Layout::Extended => Catalog::extended(),
        }
    }

    /// Ordered columns for this layout.
    #[must_use]
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::new("VOLUME", ColumnKind::Meter),
            Column::slider(ParamId::Threshold),
            Column::new("MIC STATUS", ColumnKind::Lamp(StatusFlag::MicEnabled)),
            Column::slider(ParamId::Lockout),
        ];
        if *self == Layout::Extended {
            columns.push(Column::slider(ParamId::EchoFrameDuration));
        }
        columns.extend([
            Column::new("ECHO STATUS", ColumnKind::Lamp(StatusFlag::EchoActive)),
            Column::slider(ParamId::EchoDelay),
            Column::slider(ParamId::EchoTaps),
            Column::slider(ParamId::EchoFeedback),
        ]);
        let timer = match self {
            Layout::Standard => TimerSource::EnvelopeVolume,
            Layout::Extended => TimerSource::LiveLevel,
        };
        columns.extend([
            Column::new("ECHO VOLUME", ColumnKind::Timer(timer)),
            Column::slider(ParamId::EchoStartVol),
            Column::slider(ParamId::EchoEndVol),
        ]);
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_fidelity() {
        let threshold = ParameterDefinition::builtin(ParamId::Threshold);
        assert_eq!(threshold.format_value(-25.0), "-25.0 dBFS");

        let feedback = ParameterDefinition::builtin(ParamId::EchoFeedback);
        assert_eq!(feedback.format_value(0.5), "50%");

        let delay = ParameterDefinition::builtin(ParamId::EchoDelay);
        assert_eq!(delay.format_value(0.25), "0.25 s");
    }

    #[test]
    fn test_remaining_formats() {
        assert_eq!(ParameterDefinition::builtin(ParamId::Lockout).format_value(1.5), "1.5 s");
        assert_eq!(ParameterDefinition::builtin(ParamId::EchoTaps).format_value(3.0), "3");
        assert_eq!(ParameterDefinition::builtin(ParamId::EchoEndVol).format_value(0.3), "0.30");
        assert_eq!(DisplayFormat::Decibels.format(f64::NEG_INFINITY), "-∞ dBFS");
    }

    #[test]
    fn test_quantize_snaps_to_step() {
        let threshold = ParameterDefinition::builtin(ParamId::Threshold).domain;
        assert_eq!(threshold.quantize(-25.3), -25.5);
        assert_eq!(threshold.quantize(-60.0), -50.0);
        assert_eq!(threshold.quantize(3.0), 0.0);

        let lockout = ParameterDefinition::builtin(ParamId::Lockout).domain;
        assert_eq!(lockout.quantize(0.30000000000000004), 0.3);
        assert_eq!(lockout.quantize(f64::NAN), 0.0);

        let taps = ParameterDefinition::builtin(ParamId::EchoTaps).domain;
        assert_eq!(taps.quantize(4.4), 4.0);
        assert!(taps.is_integer());
    }

    #[test]
    fn test_center_fraction() {
        let threshold = ParameterDefinition::builtin(ParamId::Threshold);
        assert!((threshold.center_fraction() - 0.5).abs() < 1e-9);

        let taps = ParameterDefinition::builtin(ParamId::EchoTaps);
        assert!((taps.center_fraction() - 2.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_catalog_contents() {
        let standard = Catalog::standard();
        assert_eq!(standard.len(), 7);
        assert!(standard.get(ParamId::EchoFrameDuration).is_none());

        let extended = Catalog::extended();
        assert_eq!(extended.len(), 8);
        let frame = extended.get(ParamId::EchoFrameDuration).map(|d| d.binding);
        assert_eq!(
            frame,
            Some(Binding {
                endpoint: Endpoint::EchoParams,
                field: "frame_duration"
            })
        );
    }

    #[test]
    fn test_every_slider_column_is_in_its_catalog() {
        for layout in [Layout::Standard, Layout::Extended] {
            let catalog = layout.catalog();
            let sliders: Vec<ParamId> = layout
                .columns()
                .iter()
                .filter_map(|c| match c.kind {
                    ColumnKind::Slider(id) => Some(id),
                    _ => None,
                })
                .collect();
            assert_eq!(sliders.len(), catalog.len());
            for id in sliders {
                assert!(catalog.get(id).is_some(), "{id} missing from {layout:?}");
            }
        }
    }

    #[test]
    fn test_standard_column_order() {
        let labels: Vec<&str> = Layout::Standard.columns().iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "VOLUME",
                "THRESHOLD",
                "MIC STATUS",
                "LOCKOUT",
                "ECHO STATUS",
                "ECHO DELAY",
                "ECHO TAPS",
                "ECHO FEEDBACK",
                "ECHO VOLUME",
                "START VOL",
                "END VOL"
            ]
        );
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Threshold.path(), "/api/threshold");
        assert_eq!(Endpoint::Lockout.path(), "/api/lockout");
        assert_eq!(Endpoint::EchoParams.path(), "/api/echo_params");
    }
}
