//! Global photographic operator after Reinhard et al.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::common::types::{RadianceMap, Rgb8Image};
use crate::hdr_pipeline::tone_map::mapper::{
    ToneMapper, ensure_not_empty, ensure_positive, recolor, scaled_luminance, world_luminance,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PhotographicGlobal {
    /// Key value the log-average luminance is mapped to
    pub alpha: f32,
    pub delta: f32,
}

impl Default for PhotographicGlobal {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            delta: 1e-6,
        }
    }
}

impl PhotographicGlobal {
    /// Display luminance for every pixel.
    pub fn compress(&self, lw: &[f32], width: usize) -> Vec<f32> {
        let lm = scaled_luminance(lw, width, self.alpha, self.delta);
        let white = lm.iter().cloned().fold(0.0f32, f32::max);
        debug!(white, "Photographic global white point");
        if white <= 0.0 {
            return vec![0.0; lm.len()];
        }
        let white_sq = white * white;
        lm.par_iter()
            .map(|&l| l * (1.0 + l / white_sq) / (1.0 + l))
            .collect()
    }
}

impl ToneMapper for PhotographicGlobal {
    #[instrument(skip_all, fields(width = radiance.width(), height = radiance.height()))]
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        ensure_not_empty(radiance)?;
        ensure_positive("alpha", self.alpha)?;
        let lw = world_luminance(radiance);
        let ld = self.compress(&lw, radiance.width());
        recolor(radiance, &lw, &ld)
    }

    fn name(&self) -> &'static str {
        "photographic-global"
    }
}
