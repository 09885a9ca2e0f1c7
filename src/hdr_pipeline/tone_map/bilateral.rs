//! Contrast reduction in the log domain after Durand and Dorsey.
//!
//! Log luminance is split into a bilateral-filtered base layer and a detail
//! layer. Only the base is compressed, so edges and fine texture survive.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::common::math::min_max;
use crate::hdr_pipeline::common::types::{RadianceMap, Rgb8Image};
use crate::hdr_pipeline::tone_map::filters::bilateral_filter;
use crate::hdr_pipeline::tone_map::mapper::{
    ToneMapper, ensure_not_empty, ensure_positive, recolor, world_luminance,
};

/// Target contrast of the base layer, as a natural log.
const BASE_CONTRAST: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BilateralToneMapper {
    pub delta: f32,
    /// Filter window radius in pixels
    pub radius: usize,
    pub sigma_space: f32,
    pub sigma_range: f32,
}

impl Default for BilateralToneMapper {
    fn default() -> Self {
        Self {
            delta: 1e-6,
            radius: 5,
            sigma_space: 30.0,
            sigma_range: 30.0,
        }
    }
}

impl BilateralToneMapper {
    /// Display luminance for every pixel.
    pub fn compress(&self, lw: &[f32], width: usize, height: usize) -> Vec<f32> {
        let log_lum: Vec<f32> = lw.par_iter().map(|&v| (v + self.delta).ln()).collect();
        let base = bilateral_filter(
            &log_lum,
            width,
            height,
            self.radius,
            self.sigma_space,
            self.sigma_range,
        );

        let (low, high) = min_max(&base).unwrap_or((0.0, 0.0));
        let range = high - low;
        let compression = if range > 0.0 {
            BASE_CONTRAST.ln() / range
        } else {
            1.0
        };
        debug!(low, high, compression, "Bilateral base layer range");

        // exp(cf * base + detail) / exp(cf * max(base)), folded into one exponent
        log_lum
            .par_iter()
            .zip(base.par_iter())
            .map(|(&l, &b)| (compression * (b - high) + (l - b)).exp())
            .collect()
    }
}

impl ToneMapper for BilateralToneMapper {
    #[instrument(skip_all, fields(width = radiance.width(), height = radiance.height()))]
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        ensure_not_empty(radiance)?;
        ensure_positive("sigma_space", self.sigma_space)?;
        ensure_positive("sigma_range", self.sigma_range)?;
        let lw = world_luminance(radiance);
        let ld = self.compress(&lw, radiance.width(), radiance.height());
        recolor(radiance, &lw, &ld)
    }

    fn name(&self) -> &'static str {
        "bilateral"
    }
}
