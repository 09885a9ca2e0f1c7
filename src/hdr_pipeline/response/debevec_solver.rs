//! Camera response recovery after Debevec and Malik.
//!
//! For a set of sampled pixel locations the solver finds the log response
//! `g(z)` and the log irradiance `E_s` of each sample that best satisfy
//! `g(z) = E_s + ln(t)` across exposures, with a weighted second-derivative
//! penalty keeping `g` smooth where few samples land. The scale ambiguity is
//! removed by pinning `g(127)`.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::math::next_int;
use crate::hdr_pipeline::common::types::{CHANNELS, ExposureSet, RadianceMap, Rgb8Image};
use crate::hdr_pipeline::response::curve::{PINNED_INTENSITY, PINNED_VALUE, ResponseCurve};
use crate::hdr_pipeline::response::least_squares::solve_least_squares;
use crate::hdr_pipeline::response::solver::ResponseSolver;
use crate::hdr_pipeline::response::weight::{INTENSITY_LEVELS, WeightKind, WeightTable};

/// Interior intensities carrying a smoothness row: 1..=254.
const SMOOTHNESS_ROWS: usize = INTENSITY_LEVELS - 2;

#[derive(Debug, Clone, PartialEq)]
pub struct DebevecSolver {
    pub weight: WeightKind,
    /// Pixel locations sampled for the curve fit
    pub sample_count: usize,
    /// Smoothness strength
    pub lambda: f32,
}

impl Default for DebevecSolver {
    fn default() -> Self {
        Self {
            weight: WeightKind::Gaussian,
            sample_count: 50,
            lambda: 40.0,
        }
    }
}

impl DebevecSolver {
    /// Upper bound on `sample_count`; the dense system grows with samples times exposures.
    pub const MAX_SAMPLE_COUNT: usize = 1000;

    pub fn new(weight: WeightKind, sample_count: usize, lambda: f32) -> Self {
        Self {
            weight,
            sample_count,
            lambda,
        }
    }

    fn validate(&self, images: &[&Rgb8Image], shutter_speeds: &[f32]) -> Result<()> {
        if images.len() < ExposureSet::MIN_EXPOSURES {
            return Err(HdrError::InvalidInput(format!(
                "at least {} exposures are required, got {}",
                ExposureSet::MIN_EXPOSURES,
                images.len()
            )));
        }
        if images.len() != shutter_speeds.len() {
            return Err(HdrError::InvalidInput(format!(
                "{} exposures but {} shutter speeds",
                images.len(),
                shutter_speeds.len()
            )));
        }
        if let Some(speed) = shutter_speeds.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(HdrError::InvalidInput(format!(
                "shutter speeds must be positive, got {}",
                speed
            )));
        }
        if self.sample_count == 0 || self.sample_count > Self::MAX_SAMPLE_COUNT {
            return Err(HdrError::InvalidInput(format!(
                "sample count must be between 1 and {}, got {}",
                Self::MAX_SAMPLE_COUNT,
                self.sample_count
            )));
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(HdrError::InvalidInput(format!(
                "smoothness lambda must be finite and non-negative, got {}",
                self.lambda
            )));
        }

        let (width, height) = images[0].dimensions();
        if width == 0 || height == 0 {
            return Err(HdrError::InvalidInput(format!(
                "exposures must not be empty, got {}x{}",
                width, height
            )));
        }
        if images.iter().any(|image| image.dimensions() != (width, height)) {
            return Err(HdrError::InvalidInput(
                "exposures differ in dimensions".to_string(),
            ));
        }
        Ok(())
    }

    /// Uniformly random pixel coordinates `(x, y)`, shared by every exposure and channel.
    pub fn sample_points<R: Rng + ?Sized>(
        &self,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        (0..self.sample_count)
            .map(|_| {
                let x = next_int(rng, 0, width);
                let y = next_int(rng, 0, height);
                (x, y)
            })
            .collect()
    }

    fn solve_channel(
        &self,
        channel: usize,
        images: &[&Rgb8Image],
        shutter_speeds: &[f32],
        samples: &[(usize, usize)],
        weights: &WeightTable,
    ) -> Result<[f32; INTENSITY_LEVELS]> {
        let rows = samples.len() * images.len() + 1 + SMOOTHNESS_ROWS;
        let cols = INTENSITY_LEVELS + samples.len();
        let mut a = DMatrix::<f64>::zeros(rows, cols);
        let mut b = DVector::<f64>::zeros(rows);

        let mut line = 0;
        for (image, &speed) in images.iter().zip(shutter_speeds) {
            let ln_t = (speed as f64).ln();
            for (sample, &(x, y)) in samples.iter().enumerate() {
                let z = image.pixel(x, y)[channel];
                let w = weights.get(z) as f64;
                a[(line, z as usize)] = w;
                a[(line, INTENSITY_LEVELS + sample)] = -w;
                b[line] = w * ln_t;
                line += 1;
            }
        }

        a[(line, PINNED_INTENSITY)] = 1.0;
        b[line] = PINNED_VALUE as f64;
        line += 1;

        let lambda = self.lambda as f64;
        for i in 1..INTENSITY_LEVELS - 1 {
            let w = lambda * weights.as_slice()[i] as f64;
            a[(line, i - 1)] = w;
            a[(line, i)] = -2.0 * w;
            a[(line, i + 1)] = w;
            line += 1;
        }
        debug_assert_eq!(line, rows);

        let x = solve_least_squares(a, &b)?;

        let mut g = [0.0f32; INTENSITY_LEVELS];
        for (z, value) in g.iter_mut().enumerate() {
            *value = x[z] as f32;
        }
        if g.iter().any(|v| !v.is_finite()) {
            return Err(HdrError::NumericFailure(format!(
                "response curve for channel {} is not finite",
                channel
            )));
        }
        debug!(channel, g_min = g[0], g_max = g[INTENSITY_LEVELS - 1], "Solved response channel");
        Ok(g)
    }

    /// Recovers the per-channel response curve from sampled pixels.
    pub fn recover_curve<R: Rng + ?Sized>(
        &self,
        images: &[&Rgb8Image],
        shutter_speeds: &[f32],
        rng: &mut R,
    ) -> Result<ResponseCurve> {
        self.validate(images, shutter_speeds)?;

        let (width, height) = images[0].dimensions();
        let samples = self.sample_points(width, height, rng);
        let weights = WeightTable::new(self.weight);

        let solved: Vec<[f32; INTENSITY_LEVELS]> = (0..CHANNELS)
            .into_par_iter()
            .map(|channel| self.solve_channel(channel, images, shutter_speeds, &samples, &weights))
            .collect::<Result<_>>()?;

        Ok(ResponseCurve::new([solved[0], solved[1], solved[2]]))
    }

    /// Weighted average of per-exposure log irradiance estimates, exponentiated.
    ///
    /// A pixel whose weights sum to zero gets radiance 0.
    pub fn fuse(
        &self,
        images: &[&Rgb8Image],
        shutter_speeds: &[f32],
        curve: &ResponseCurve,
    ) -> Result<RadianceMap> {
        self.validate(images, shutter_speeds)?;

        let (width, height) = images[0].dimensions();
        let weights = WeightTable::new(self.weight);
        let ln_speeds: Vec<f64> = shutter_speeds.iter().map(|&t| (t as f64).ln()).collect();

        let row_len = width * CHANNELS;
        let mut data = vec![0.0f32; height * row_len];
        data.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let offset = y * row_len;
                for (i, out) in row.iter_mut().enumerate() {
                    let channel = i % CHANNELS;
                    let mut log_sum = 0.0f64;
                    let mut weight_sum = 0.0f64;
                    for (image, ln_t) in images.iter().zip(&ln_speeds) {
                        let z = image.data[offset + i];
                        let w = weights.get(z) as f64;
                        log_sum += w * (curve.log_irradiance(channel, z) as f64 - ln_t);
                        weight_sum += w;
                    }
                    let radiance = if weight_sum > 0.0 {
                        (log_sum / weight_sum).exp() as f32
                    } else {
                        0.0
                    };
                    *out = if radiance.is_finite() { radiance } else { 0.0 };
                }
            });

        RadianceMap::new(width, height, data)
    }

    pub fn solve_images<R: Rng + ?Sized>(
        &self,
        images: &[&Rgb8Image],
        shutter_speeds: &[f32],
        rng: &mut R,
    ) -> Result<RadianceMap> {
        info!(
            weight = %self.weight,
            samples = self.sample_count,
            lambda = self.lambda,
            "Reconstructing response curve using Debevec's method"
        );
        let curve = self.recover_curve(images, shutter_speeds, rng)?;
        let radiance = self.fuse(images, shutter_speeds, &curve)?;
        info!("Finished radiance map reconstruction");
        Ok(radiance)
    }
}

impl ResponseSolver for DebevecSolver {
    #[instrument(skip_all, fields(images = exposures.len()))]
    fn solve<R: Rng + ?Sized>(&self, exposures: &ExposureSet, rng: &mut R) -> Result<RadianceMap> {
        self.solve_images(&exposures.images(), &exposures.shutter_speeds(), rng)
    }
}
