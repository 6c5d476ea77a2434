//! Simulated audio monitor with an echo unit.
//!
//! Mirrors the behavior of the real service closely enough for the panel:
//! - Input level noise around [`NOISE_CENTER_DBFS`], silence while the mic is off
//! - A reading above the threshold triggers an echo, like a manual start
//! - Echo playback steps `level` through a linear envelope, one tap at a time
//! - The mic is disabled for the whole playback and re-enabled afterwards
//!
//! All timing goes through `tokio::time::sleep` and can be scaled down for tests.

use mixer_core::catalog::{ParamId, ParameterDefinition};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Centre of the simulated input level.
pub const NOISE_CENTER_DBFS: f64 = -35.0;

/// Peak deviation of the simulated input level.
pub const NOISE_SPAN_DB: f64 = 6.0;

/// Errors surfaced by the simulated device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// An echo is already playing.
    #[error("Mic is locked out")]
    LockedOut,
}

/// Persistent device parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    /// Gate threshold (dBFS)
    pub threshold_dbfs: f64,
    /// Lockout after an echo (seconds)
    pub lockout_sec: f64,
    /// Delay between taps (seconds)
    pub delay_sec: f64,
    /// Number of taps
    pub taps: u32,
    /// Feedback ratio
    pub feedback: f64,
    /// First tap volume
    pub start_vol: f64,
    /// Last tap volume
    pub end_vol: f64,
    /// Captured frame length (seconds)
    pub frame_duration: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        let center = |id| ParameterDefinition::builtin(id).center;
        Self {
            threshold_dbfs: center(ParamId::Threshold),
            lockout_sec: center(ParamId::Lockout),
            delay_sec: center(ParamId::EchoDelay),
            taps: center(ParamId::EchoTaps) as u32,
            feedback: center(ParamId::EchoFeedback),
            start_vol: center(ParamId::EchoStartVol),
            end_vol: center(ParamId::EchoEndVol),
            frame_duration: center(ParamId::EchoFrameDuration),
        }
    }
}

/// Partial echo update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EchoUpdate {
    /// New delay
    pub delay_sec: Option<f64>,
    /// New tap count
    pub taps: Option<u32>,
    /// New feedback
    pub feedback: Option<f64>,
    /// New first tap volume
    pub start_vol: Option<f64>,
    /// New last tap volume
    pub end_vol: Option<f64>,
    /// New frame length
    pub frame_duration: Option<f64>,
}

#[derive(Debug)]
struct DeviceState {
    params: Parameters,
    mic_enabled: bool,
    echo_active: bool,
    echo_level: f64,
    last_rms: f64,
    last_dbfs: f64,
    updated: f64,
    noise_center: f64,
    rng: StdRng,
}

/// Echo armed under the state lock, waiting for its playback task.
struct Playback {
    envelope: Vec<f64>,
    frame: f64,
    delay: f64,
    end_vol: f64,
}

/// Volume envelope across the echo taps, from `start` to `end` inclusive.
#[must_use]
pub fn echo_envelope(taps: u32, start: f64, end: f64) -> Vec<f64> {
    if taps <= 1 {
        return vec![start];
    }
    let last = taps - 1;
    (0..taps)
        .map(|i| match i {
            0 => start,
            i if i == last => end,
            i => start + (end - start) * f64::from(i) / f64::from(last),
        })
        .collect()
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Shared handle to the simulated device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    state: Arc<Mutex<DeviceState>>,
    time_scale: f64,
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MockDevice {
    /// Create a device with default parameters.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for the level noise; `None` seeds from the OS
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                params: Parameters::default(),
                mic_enabled: true,
                echo_active: false,
                echo_level: 0.0,
                last_rms: 0.0,
                last_dbfs: f64::NEG_INFINITY,
                updated: now_secs(),
                noise_center: NOISE_CENTER_DBFS,
                rng,
            })),
            time_scale: 1.0,
        }
    }

    /// Multiply every simulated delay by `scale` (e.g. `0.01` in tests).
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale.max(0.0);
        self
    }

    /// Centre the simulated input level on `dbfs` instead of [`NOISE_CENTER_DBFS`].
    #[must_use]
    pub fn with_noise_center(self, dbfs: f64) -> Self {
        self.state.lock().noise_center = dbfs;
        self
    }

    /// Current parameters.
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        self.state.lock().params.clone()
    }

    /// Whether the mic is listening.
    #[must_use]
    pub fn mic_enabled(&self) -> bool {
        self.state.lock().mic_enabled
    }

    /// Whether an echo is playing.
    #[must_use]
    pub fn echo_active(&self) -> bool {
        self.state.lock().echo_active
    }

    /// Set the gate threshold.
    pub fn set_threshold(&self, value: f64) {
        self.state.lock().params.threshold_dbfs = value;
        tracing::info!("Threshold updated: {:.1} dBFS", value);
    }

    /// Set the lockout time.
    pub fn set_lockout(&self, value: f64) {
        self.state.lock().params.lockout_sec = value;
        tracing::info!("Lockout updated: {:.1} sec", value);
    }

    /// Apply a partial echo update.
    pub fn update_echo(&self, update: &EchoUpdate) {
        let mut state = self.state.lock();
        let params = &mut state.params;
        if let Some(v) = update.delay_sec {
            params.delay_sec = v;
        }
        if let Some(v) = update.taps {
            params.taps = v;
        }
        if let Some(v) = update.feedback {
            params.feedback = v;
        }
        if let Some(v) = update.start_vol {
            params.start_vol = v;
        }
        if let Some(v) = update.end_vol {
            params.end_vol = v;
        }
        if let Some(v) = update.frame_duration {
            params.frame_duration = v;
        }
        tracing::info!(?update, "Echo params updated");
    }

    /// Take a new level reading: noise while listening, silence otherwise.
    fn sample_level(state: &mut DeviceState) {
        if state.mic_enabled {
            let dbfs = state.noise_center + state.rng.gen_range(-NOISE_SPAN_DB..NOISE_SPAN_DB);
            state.last_dbfs = dbfs;
            state.last_rms = 32768.0 * 10f64.powf(dbfs / 20.0);
        } else {
            state.last_dbfs = f64::NEG_INFINITY;
            state.last_rms = 0.0;
        }
        state.updated = now_secs();
    }

    /// Full status document, as served by `GET /api/status`.
    ///
    /// Silence is reported as `null`. A reading above the threshold starts an
    /// echo when a tokio runtime is available to play it back; the returned
    /// document already shows the mic disabled.
    pub fn status(&self) -> Value {
        let mut state = self.state.lock();
        Self::sample_level(&mut state);
        if state.mic_enabled
            && state.last_dbfs > state.params.threshold_dbfs
            && tokio::runtime::Handle::try_current().is_ok()
        {
            tracing::info!(
                "Threshold exceeded! dbfs={:.1}. Triggering echo...",
                state.last_dbfs
            );
            let playback = Self::arm_echo(&mut state);
            self.spawn_playback(playback);
        }
        let p = &state.params;
        json!({
            "mic_enabled": state.mic_enabled,
            "last_rms": state.last_rms,
            "last_dbfs": finite_or_null(state.last_dbfs),
            "updated": state.updated,
            "threshold_dbfs": p.threshold_dbfs,
            "echo_params": {
                "delay_sec": p.delay_sec,
                "taps": p.taps,
                "feedback": p.feedback,
                "start_vol": p.start_vol,
                "end_vol": p.end_vol,
                "frame_duration": p.frame_duration,
                "active": state.echo_active,
                "level": state.echo_level,
            },
            "lockout_sec": p.lockout_sec,
        })
    }

    /// Last level reading, as served by `GET /api/volume`.
    pub fn volume(&self) -> Value {
        let state = self.state.lock();
        json!({
            "rms": state.last_rms,
            "dbfs": finite_or_null(state.last_dbfs),
            "updated": state.updated,
        })
    }

    /// Start a simulated echo playback.
    ///
    /// Disables the mic, then steps the echo level through the envelope on a
    /// background task: the first tap lasts one frame, later taps one delay.
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// The envelope being played, or [`DeviceError::LockedOut`] if the mic
    /// is already disabled.
    pub fn start_echo(&self) -> Result<Vec<f64>, DeviceError> {
        let playback = {
            let mut state = self.state.lock();
            if !state.mic_enabled {
                return Err(DeviceError::LockedOut);
            }
            Self::arm_echo(&mut state)
        };
        let envelope = playback.envelope.clone();
        self.spawn_playback(playback);
        Ok(envelope)
    }

    /// Disable the mic and mark the echo active.
    fn arm_echo(state: &mut DeviceState) -> Playback {
        let p = &state.params;
        let playback = Playback {
            envelope: echo_envelope(p.taps, p.start_vol, p.end_vol),
            frame: p.frame_duration,
            delay: p.delay_sec,
            end_vol: p.end_vol,
        };
        state.mic_enabled = false;
        state.echo_active = true;
        state.echo_level = playback
            .envelope
            .first()
            .copied()
            .unwrap_or(playback.end_vol);
        playback
    }

    /// Step the echo level through the envelope, then re-enable the mic.
    fn spawn_playback(&self, playback: Playback) {
        tracing::info!(taps = playback.envelope.len(), "Echo triggered");
        let device = self.clone();
        tokio::spawn(async move {
            for (i, level) in playback.envelope.iter().enumerate() {
                device.state.lock().echo_level = *level;
                let hold = if i == 0 { playback.frame } else { playback.delay };
                tokio::time::sleep(device.scaled(hold)).await;
            }
            let mut state = device.state.lock();
            state.echo_level = playback.end_vol;
            state.echo_active = false;
            state.mic_enabled = true;
            tracing::info!("Mic re-enabled after echo playback");
        });
    }

    fn scaled(&self, seconds: f64) -> Duration {
        Duration::from_secs_f64((seconds * self.time_scale).max(0.0))
    }
}

fn finite_or_null(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        Value::Null
    }
}
