//! Local photographic operator: a dodge-and-burn style surround picked per
//! pixel from a stack of Gaussian blurs.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::{RadianceMap, Rgb8Image};
use crate::hdr_pipeline::tone_map::filters::gaussian_blur;
use crate::hdr_pipeline::tone_map::mapper::{
    ToneMapper, ensure_not_empty, ensure_positive, recolor, scaled_luminance, world_luminance,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PhotographicLocal {
    pub alpha: f32,
    /// Sharpening exponent in the scale-selection denominator
    pub phi: f32,
    /// Scale-selection threshold
    pub epsilon: f32,
    /// Largest odd blur kernel
    pub max_kernel_size: usize,
    pub delta: f32,
}

impl Default for PhotographicLocal {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            phi: 8.0,
            epsilon: 0.05,
            max_kernel_size: 35,
            delta: 1e-6,
        }
    }
}

impl PhotographicLocal {
    /// Kernel sizes 1, 3, 5, ... up to `max_kernel_size`.
    pub fn kernel_sizes(&self) -> Vec<usize> {
        (1..=self.max_kernel_size).step_by(2).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.max_kernel_size == 0 || self.max_kernel_size % 2 == 0 {
            return Err(HdrError::InvalidInput(format!(
                "max kernel size must be a positive odd number, got {}",
                self.max_kernel_size
            )));
        }
        ensure_positive("alpha", self.alpha)?;
        ensure_positive("epsilon", self.epsilon)?;
        if !self.phi.is_finite() {
            return Err(HdrError::InvalidInput(format!(
                "phi must be finite, got {}",
                self.phi
            )));
        }
        Ok(())
    }

    /// Display luminance for every pixel.
    pub fn compress(&self, lw: &[f32], width: usize, height: usize) -> Result<Vec<f32>> {
        self.validate()?;
        let lm = scaled_luminance(lw, width, self.alpha, self.delta);

        let blurs: Vec<Vec<f32>> = self
            .kernel_sizes()
            .into_iter()
            .map(|ksize| gaussian_blur(&lm, width, height, ksize))
            .collect();
        debug!(scales = blurs.len(), "Built blur stack");

        let sharpening = 2.0f32.powf(self.phi) * self.alpha;
        let ld = lm
            .par_iter()
            .enumerate()
            .map(|(i, &l)| {
                let mut surround = l;
                for n in 0..blurs.len() - 1 {
                    let s = (2 * n + 1) as f32;
                    let center = blurs[n][i];
                    let v = (center - blurs[n + 1][i]).abs() / (sharpening / (s * s) + center);
                    if v < self.epsilon {
                        surround = center;
                        break;
                    }
                }
                l / (1.0 + surround)
            })
            .collect();
        Ok(ld)
    }
}

impl ToneMapper for PhotographicLocal {
    #[instrument(skip_all, fields(width = radiance.width(), height = radiance.height()))]
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        ensure_not_empty(radiance)?;
        let lw = world_luminance(radiance);
        let ld = self.compress(&lw, radiance.width(), radiance.height())?;
        recolor(radiance, &lw, &ld)
    }

    fn name(&self) -> &'static str {
        "photographic-local"
    }
}
