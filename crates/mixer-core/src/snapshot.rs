//! Telemetry snapshot returned by `GET /api/status`.
//!
//! A snapshot is immutable and replaced wholesale on every poll. The audio
//! service reports silence as a bare `-Infinity` number token, which is not
//! valid JSON; [`StatusSnapshot::from_json`] rewrites such tokens to `null`
//! before decoding so silence ends up as `last_dbfs: None`.

use crate::catalog::{ParamId, StatusFlag, TimerSource};
use crate::error::PanelError;
use serde::{Deserialize, Serialize};

/// Echo sub-record of the status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoParams {
    /// Delay between taps (seconds).
    pub delay_sec: f64,
    /// Number of taps.
    pub taps: f64,
    /// Feedback ratio.
    pub feedback: f64,
    /// Envelope volume of the first tap.
    pub start_vol: f64,
    /// Envelope volume of the last tap.
    pub end_vol: f64,
    /// Captured frame length (seconds). Older services omit it.
    #[serde(default)]
    pub frame_duration: Option<f64>,
    /// Echo playback in progress.
    #[serde(default)]
    pub active: bool,
    /// Set by services that latch the last trigger instead of `active`.
    #[serde(default)]
    pub last_triggered: bool,
    /// Envelope level of the tap currently playing.
    #[serde(default)]
    pub level: Option<f64>,
}

/// Full point-in-time telemetry payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Gate threshold (dBFS).
    pub threshold_dbfs: f64,
    /// Lockout after an echo (seconds).
    pub lockout_sec: f64,
    /// Microphone currently listening.
    pub mic_enabled: bool,
    /// Level of the last captured frame; `None` means silence.
    #[serde(default)]
    pub last_dbfs: Option<f64>,
    /// The body carried a `last_dbfs` key at all, even if it was silence.
    #[serde(skip)]
    pub level_reported: bool,
    /// RMS of the last captured frame.
    #[serde(default)]
    pub last_rms: Option<f64>,
    /// Unix timestamp of the last level update.
    #[serde(default)]
    pub updated: Option<f64>,
    /// Echo configuration and state, absent on services without an echo unit.
    #[serde(default)]
    pub echo_params: Option<EchoParams>,
}

impl StatusSnapshot {
    /// Decode a status body, tolerating `-Infinity`, `Infinity` and `NaN`.
    pub fn from_json(text: &str) -> Result<Self, PanelError> {
        let sanitized = sanitize_non_finite(text);
        let value: serde_json::Value =
            serde_json::from_str(&sanitized).map_err(PanelError::Snapshot)?;
        let level_reported = value.get("last_dbfs").is_some();
        let mut snapshot: Self = serde_json::from_value(value).map_err(PanelError::Snapshot)?;
        snapshot.level_reported = level_reported;
        Ok(snapshot)
    }

    /// Current value of a catalog parameter, if the snapshot carries it.
    #[must_use]
    pub fn param(&self, id: ParamId) -> Option<f64> {
        match id {
            ParamId::Threshold => Some(self.threshold_dbfs),
            ParamId::Lockout => Some(self.lockout_sec),
            _ => {
                let echo = self.echo_params.as_ref()?;
                match id {
                    ParamId::EchoDelay => Some(echo.delay_sec),
                    ParamId::EchoTaps => Some(echo.taps),
                    ParamId::EchoFeedback => Some(echo.feedback),
                    ParamId::EchoFrameDuration => echo.frame_duration,
                    ParamId::EchoStartVol => Some(echo.start_vol),
                    ParamId::EchoEndVol => Some(echo.end_vol),
                    ParamId::Threshold | ParamId::Lockout => None,
                }
            }
        }
    }

    /// Boolean state shown by a lamp.
    #[must_use]
    pub fn flag(&self, flag: StatusFlag) -> bool {
        match flag {
            StatusFlag::MicEnabled => self.mic_enabled,
            StatusFlag::EchoActive => self
                .echo_params
                .as_ref()
                .is_some_and(|e| e.active || e.last_triggered),
        }
    }

    /// Value for a timer-style readout, selected by the echo `active` flag.
    #[must_use]
    pub fn timer(&self, source: TimerSource) -> Option<f64> {
        let echo = self.echo_params.as_ref()?;
        if !echo.active {
            return Some(echo.end_vol);
        }
        match source {
            TimerSource::EnvelopeVolume => Some(echo.start_vol),
            TimerSource::LiveLevel => Some(echo.level.unwrap_or(echo.start_vol)),
        }
    }

    /// Finite input level, or `None` for silence.
    #[must_use]
    pub fn level_dbfs(&self) -> Option<f64> {
        self.last_dbfs.filter(|v| v.is_finite())
    }
}

/// Replace bare non-finite number tokens with `null`, leaving strings intact.
fn sanitize_non_finite(text: &str) -> String {
    const TOKENS: [&str; 4] = ["-Infinity", "+Infinity", "Infinity", "NaN"];

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = r#"{
        "mic_enabled": true,
        "last_rms": 0.0,
        "last_dbfs": -Infinity,
        "updated": 1718000000.5,
        "threshold_dbfs": -25.0,
        "echo_params": {
            "delay_sec": 0.25, "taps": 3, "feedback": 0.5,
            "start_vol": 1.0, "end_vol": 0.3, "frame_duration": 1.5,
            "active": false, "level": 0.0
        },
        "lockout_sec": 2.0
    }"#;

    #[test]
    fn test_parses_service_status_with_negative_infinity() {
        let snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        assert_eq!(snapshot.last_dbfs, None);
        assert!(snapshot.level_reported);
        assert_eq!(snapshot.level_dbfs(), None);
        assert_eq!(snapshot.param(ParamId::EchoTaps), Some(3.0));
        assert_eq!(snapshot.param(ParamId::EchoFrameDuration), Some(1.5));
        assert!(snapshot.flag(StatusFlag::MicEnabled));
        assert!(!snapshot.flag(StatusFlag::EchoActive));
    }

    #[test]
    fn test_tokens_inside_strings_are_untouched() {
        let sanitized = sanitize_non_finite(r#"{"note": "NaN -Infinity \" NaN", "v": NaN}"#);
        assert_eq!(sanitized, r#"{"note": "NaN -Infinity \" NaN", "v": null}"#);
    }

    #[test]
    fn test_echo_params_optional() {
        let snapshot = StatusSnapshot::from_json(
            r#"{"threshold_dbfs": -30, "lockout_sec": 1, "mic_enabled": false, "last_dbfs": -40.5}"#,
        )
        .unwrap();
        assert_eq!(snapshot.param(ParamId::Threshold), Some(-30.0));
        assert_eq!(snapshot.param(ParamId::EchoDelay), None);
        assert_eq!(snapshot.timer(TimerSource::EnvelopeVolume), None);
        assert!(!snapshot.flag(StatusFlag::EchoActive));
        assert_eq!(snapshot.level_dbfs(), Some(-40.5));
    }

    #[test]
    fn test_missing_level_is_not_silence() {
        let snapshot = StatusSnapshot::from_json(
            r#"{"threshold_dbfs": -30, "lockout_sec": 1, "mic_enabled": true}"#,
        )
        .unwrap();
        assert!(!snapshot.level_reported);
        assert_eq!(snapshot.last_dbfs, None);

        let snapshot = StatusSnapshot::from_json(
            r#"{"threshold_dbfs": -30, "lockout_sec": 1, "mic_enabled": true, "last_dbfs": null}"#,
        )
        .unwrap();
        assert!(snapshot.level_reported);
    }

    #[test]
    fn test_timer_source_selection() {
        let mut snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        assert_eq!(snapshot.timer(TimerSource::EnvelopeVolume), Some(0.3));
        assert_eq!(snapshot.timer(TimerSource::LiveLevel), Some(0.3));

        if let Some(echo) = snapshot.echo_params.as_mut() {
            echo.active = true;
            echo.level = Some(0.65);
        }
        assert_eq!(snapshot.timer(TimerSource::EnvelopeVolume), Some(1.0));
        assert_eq!(snapshot.timer(TimerSource::LiveLevel), Some(0.65));
        assert!(snapshot.flag(StatusFlag::EchoActive));
    }

    #[test]
    fn test_last_triggered_lights_echo_lamp() {
        let mut snapshot = StatusSnapshot::from_json(STATUS).unwrap();
        if let Some(echo) = snapshot.echo_params.as_mut() {
            echo.last_triggered = true;
        }
        assert!(snapshot.flag(StatusFlag::EchoActive));
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(matches!(
            StatusSnapshot::from_json("<html>"),
            Err(PanelError::Snapshot(_))
        ));
    }
}
