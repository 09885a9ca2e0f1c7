//! Numeric helpers shared by the alignment, response recovery and tone mapping stages.

use rand::Rng;
use rayon::prelude::*;

use crate::hdr_pipeline::common::types::{CHANNELS, GrayImage, Rgb8Image};

/// 1 / sqrt(2 * pi)
pub const INV_SQRT_TWO_PI: f32 = 0.398_942_3;

/// BT.601 luma weights for R, G and B.
pub const LUMA_WEIGHTS: [f32; CHANNELS] = [0.299, 0.587, 0.114];

/// 2x3 affine matrix in row-major order: `[[1, 0, tx], [0, 1, ty]]` for a translation.
pub type AffineMatrix = [[f32; 3]; 2];

/// Normal probability density at `x`.
#[inline]
pub fn gaussian(x: f32, mean: f32, sigma: f32) -> f32 {
    let inv_sigma = 1.0 / sigma;
    let base = (x - mean) * inv_sigma;
    inv_sigma * INV_SQRT_TWO_PI * (-0.5 * base * base).exp()
}

/// Uniform integer in `[min, max)` drawn from the given generator.
#[inline]
pub fn next_int<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> usize {
    rng.random_range(min..max)
}

pub fn translation_matrix(tx: i32, ty: i32) -> AffineMatrix {
    [[1.0, 0.0, tx as f32], [0.0, 1.0, ty as f32]]
}

/// Applies an integer translation to an interleaved buffer.
///
/// Content moves so that `dst(x + tx, y + ty) = src(x, y)`; uncovered pixels
/// are filled with `T::default()`.
pub fn warp_translate<T>(
    src: &[T],
    width: usize,
    height: usize,
    channels: usize,
    matrix: &AffineMatrix,
) -> Vec<T>
where
    T: Copy + Default + Send + Sync,
{
    let tx = matrix[0][2].round() as isize;
    let ty = matrix[1][2].round() as isize;
    let mut dst = vec![T::default(); src.len()];
    if width == 0 || height == 0 {
        return dst;
    }

    let row_len = width * channels;
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as isize - ty;
            if sy < 0 || sy >= height as isize {
                return;
            }
            let src_row = &src[sy as usize * row_len..(sy as usize + 1) * row_len];
            for x in 0..width {
                let sx = x as isize - tx;
                if sx < 0 || sx >= width as isize {
                    continue;
                }
                let s = sx as usize * channels;
                row[x * channels..(x + 1) * channels].copy_from_slice(&src_row[s..s + channels]);
            }
        });
    dst
}

#[inline]
pub fn luminance(rgb: [f32; CHANNELS]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

pub fn to_gray(image: &Rgb8Image) -> GrayImage {
    let data = image
        .data
        .par_chunks(CHANNELS)
        .map(|px| {
            let y = luminance([px[0] as f32, px[1] as f32, px[2] as f32]);
            y.round().clamp(0.0, 255.0) as u8
        })
        .collect();
    GrayImage {
        width: image.width,
        height: image.height,
        data,
    }
}

/// Luminance of every pixel of an interleaved float RGB buffer.
pub fn luminance_plane(data: &[f32]) -> Vec<f32> {
    data.par_chunks(CHANNELS)
        .map(|px| luminance([px[0], px[1], px[2]]))
        .collect()
}

/// Sum of `f` over a plane, accumulated per row in parallel and combined in row order.
///
/// The combination order is fixed, so the result does not depend on scheduling.
pub fn ordered_sum<F>(plane: &[f32], width: usize, f: F) -> f64
where
    F: Fn(f32) -> f64 + Sync,
{
    if width == 0 {
        return 0.0;
    }
    let row_sums: Vec<f64> = plane
        .par_chunks(width)
        .map(|row| row.iter().map(|&v| f(v)).sum::<f64>())
        .collect();
    row_sums.into_iter().sum()
}

/// Minimum and maximum of a plane, `None` when empty.
pub fn min_max(plane: &[f32]) -> Option<(f32, f32)> {
    plane.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
