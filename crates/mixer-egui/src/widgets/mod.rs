//! Painted widgets for the mixer columns.
//!
//! Each widget renders one [`mixer_core::ControlWidget`] variant. They only
//! read the panel model; slider input is reported back as [`SliderEvent`]s
//! and applied by the app after the frame's layout pass.

pub mod lamp;
pub mod meter;
pub mod readout;
pub mod slider;

pub use lamp::{lamp_fill, Lamp};
pub use meter::{scale_ticks, VolumeMeter};
pub use readout::Readout;
pub use slider::{Interaction, SliderEvent, SliderOutput, VerticalSlider};
