//! Simulated collaborators for the echo mixer.
//!
//! Lets the panel and the relay run end to end without audio hardware or a
//! microcontroller. All delays use `tokio::time::sleep`.
//!
//! # Available Mocks
//!
//! - [`MockDevice`] - Simulated audio monitor state with an echo unit
//! - [`MockMonitor`] - axum service exposing the device over the `/api/*` contract
//! - [`MockResponder`] - TCP responder answering `LED_ON` / `LED_OFF`
//!
//! # Behavior
//!
//! - Level readings: noise around -35 dBFS, silence while the mic is locked out
//! - A reading above `threshold_dbfs` triggers an echo on its own
//! - Echo playback: envelope from `start_vol` to `end_vol`, first tap held one
//!   frame, later taps one delay each
//! - Invalid POST values: HTTP 400 `Invalid value`; missing field: `Missing field`

pub mod device;
pub mod monitor;
pub mod responder;

pub use device::{echo_envelope, DeviceError, EchoUpdate, MockDevice, Parameters};
pub use monitor::MockMonitor;
pub use responder::{reply_for, MockResponder};
