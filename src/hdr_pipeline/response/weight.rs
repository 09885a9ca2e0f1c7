use std::fmt;
use std::str::FromStr;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::math::gaussian;

pub const INTENSITY_LEVELS: usize = 256;

/// Weighting applied to observed intensities; low weights de-emphasise
/// near-clipped samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightKind {
    /// Normal density centred at 128 with a spread of 128
    #[default]
    Gaussian,
    /// Constant 1/256
    Uniform,
}

impl WeightKind {
    pub fn name(&self) -> &'static str {
        match self {
            WeightKind::Gaussian => "gaussian",
            WeightKind::Uniform => "uniform",
        }
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeightKind {
    type Err = HdrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gaussian" => Ok(WeightKind::Gaussian),
            "uniform" => Ok(WeightKind::Uniform),
            _ => Err(HdrError::UnknownVariant {
                kind: "weight",
                name: name.to_string(),
            }),
        }
    }
}

/// `w(z)` tabulated for every 8-bit intensity
#[derive(Debug, Clone)]
pub struct WeightTable {
    weights: [f32; INTENSITY_LEVELS],
}

impl WeightTable {
    pub fn new(kind: WeightKind) -> Self {
        let mut weights = [0.0; INTENSITY_LEVELS];
        for (z, w) in weights.iter_mut().enumerate() {
            *w = match kind {
                WeightKind::Gaussian => gaussian(z as f32, 128.0, 128.0),
                WeightKind::Uniform => 1.0 / INTENSITY_LEVELS as f32,
            };
        }
        Self { weights }
    }

    #[inline]
    pub fn get(&self, z: u8) -> f32 {
        self.weights[z as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }
}
