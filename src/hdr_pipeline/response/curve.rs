use crate::hdr_pipeline::common::types::CHANNELS;
use crate::hdr_pipeline::response::weight::INTENSITY_LEVELS;

/// Intensity whose log irradiance is pinned by the normalisation row.
pub const PINNED_INTENSITY: usize = 127;
/// Value `g(PINNED_INTENSITY)` is pinned to.
pub const PINNED_VALUE: f32 = 0.0;

/// Per-channel camera response: intensity to log relative irradiance
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    channels: [[f32; INTENSITY_LEVELS]; CHANNELS],
}

impl ResponseCurve {
    pub fn new(channels: [[f32; INTENSITY_LEVELS]; CHANNELS]) -> Self {
        Self { channels }
    }

    #[inline]
    pub fn log_irradiance(&self, channel: usize, z: u8) -> f32 {
        self.channels[channel][z as usize]
    }

    pub fn channel(&self, channel: usize) -> &[f32; INTENSITY_LEVELS] {
        &self.channels[channel]
    }

    /// Largest per-entry difference to another curve.
    pub fn max_abs_difference(&self, other: &ResponseCurve) -> f32 {
        self.channels
            .iter()
            .flatten()
            .zip(other.channels.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}
