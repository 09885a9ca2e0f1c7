use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::math::{luminance_plane, ordered_sum};
use crate::hdr_pipeline::common::types::{CHANNELS, RadianceMap, Rgb8Image};
use crate::hdr_pipeline::tone_map::bilateral::BilateralToneMapper;
use crate::hdr_pipeline::tone_map::photographic_global::PhotographicGlobal;
use crate::hdr_pipeline::tone_map::photographic_local::PhotographicLocal;

/// Luminance at or below this is treated as black when recolouring.
pub const MIN_LUMINANCE: f32 = 1e-12;

/// Compresses a radiance map into a displayable 8-bit image.
pub trait ToneMapper {
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image>;

    fn name(&self) -> &'static str;
}

/// Tone mapping operators selectable by name
#[derive(Debug, Clone, PartialEq)]
pub enum ToneMapOperator {
    PhotographicGlobal(PhotographicGlobal),
    PhotographicLocal(PhotographicLocal),
    Bilateral(BilateralToneMapper),
}

impl ToneMapOperator {
    pub const DEFAULT_NAME: &'static str = "bilateral";

    /// Replaces the operator's parameters with those set in `params`.
    /// Fields the operator does not have are ignored.
    pub fn with_params(self, params: &ToneMapParams) -> Self {
        match self {
            ToneMapOperator::PhotographicGlobal(mut op) => {
                op.alpha = params.alpha.unwrap_or(op.alpha);
                ToneMapOperator::PhotographicGlobal(op)
            }
            ToneMapOperator::PhotographicLocal(mut op) => {
                op.alpha = params.alpha.unwrap_or(op.alpha);
                op.phi = params.phi.unwrap_or(op.phi);
                op.epsilon = params.epsilon.unwrap_or(op.epsilon);
                op.max_kernel_size = params.max_kernel_size.unwrap_or(op.max_kernel_size);
                ToneMapOperator::PhotographicLocal(op)
            }
            ToneMapOperator::Bilateral(mut op) => {
                op.radius = params.radius.unwrap_or(op.radius);
                op.sigma_space = params.sigma_space.unwrap_or(op.sigma_space);
                op.sigma_range = params.sigma_range.unwrap_or(op.sigma_range);
                ToneMapOperator::Bilateral(op)
            }
        }
    }
}

/// Optional operator parameters, unset fields keep the operator's value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToneMapParams {
    /// Key value (photographic operators)
    pub alpha: Option<f32>,
    pub phi: Option<f32>,
    pub epsilon: Option<f32>,
    pub max_kernel_size: Option<usize>,
    /// Filter radius (bilateral)
    pub radius: Option<usize>,
    pub sigma_space: Option<f32>,
    pub sigma_range: Option<f32>,
}

impl Default for ToneMapOperator {
    fn default() -> Self {
        ToneMapOperator::Bilateral(BilateralToneMapper::default())
    }
}

impl fmt::Display for ToneMapOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToneMapOperator {
    type Err = HdrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "photographic-global" => Ok(ToneMapOperator::PhotographicGlobal(
                PhotographicGlobal::default(),
            )),
            "photographic-local" => Ok(ToneMapOperator::PhotographicLocal(
                PhotographicLocal::default(),
            )),
            "bilateral" => Ok(ToneMapOperator::Bilateral(BilateralToneMapper::default())),
            _ => Err(HdrError::UnknownVariant {
                kind: "tone mapper",
                name: name.to_string(),
            }),
        }
    }
}

impl ToneMapper for ToneMapOperator {
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        match self {
            ToneMapOperator::PhotographicGlobal(op) => op.map(radiance),
            ToneMapOperator::PhotographicLocal(op) => op.map(radiance),
            ToneMapOperator::Bilateral(op) => op.map(radiance),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ToneMapOperator::PhotographicGlobal(op) => op.name(),
            ToneMapOperator::PhotographicLocal(op) => op.name(),
            ToneMapOperator::Bilateral(op) => op.name(),
        }
    }
}

pub(crate) fn ensure_not_empty(radiance: &RadianceMap) -> Result<()> {
    if radiance.width() == 0 || radiance.height() == 0 {
        return Err(HdrError::InvalidInput(format!(
            "cannot tone map an empty {}x{} radiance map",
            radiance.width(),
            radiance.height()
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(HdrError::InvalidInput(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// World luminance of every pixel.
pub(crate) fn world_luminance(radiance: &RadianceMap) -> Vec<f32> {
    luminance_plane(radiance.data())
}

/// Luminance scaled so its log-average lands on the key value `alpha`.
pub(crate) fn scaled_luminance(lw: &[f32], width: usize, alpha: f32, delta: f32) -> Vec<f32> {
    let n = lw.len().max(1) as f64;
    let log_sum = ordered_sum(lw, width, |v| (v as f64 + delta as f64).ln());
    let log_average = (log_sum / n).exp() as f32;
    let scale = alpha / log_average;
    lw.par_iter().map(|&v| scale * v).collect()
}

/// Rebuilds colour from compressed luminance `ld`, keeping each pixel's
/// channel ratios, and quantises to 8 bits.
pub(crate) fn recolor(radiance: &RadianceMap, lw: &[f32], ld: &[f32]) -> Result<Rgb8Image> {
    let data: Vec<u8> = radiance
        .data()
        .par_chunks(CHANNELS)
        .zip(lw.par_iter().zip(ld.par_iter()))
        .flat_map_iter(|(px, (&world, &display))| {
            let scale = if world > MIN_LUMINANCE && display.is_finite() {
                display / world
            } else {
                0.0
            };
            px.iter().map(move |&c| quantize(c * scale)).collect::<Vec<u8>>()
        })
        .collect();
    Rgb8Image::new(radiance.width(), radiance.height(), data)
}

/// `round(255 * v)` saturated to the 8-bit range; NaN maps to 0.
#[inline]
pub(crate) fn quantize(v: f32) -> u8 {
    let scaled = (v * 255.0).round();
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}
