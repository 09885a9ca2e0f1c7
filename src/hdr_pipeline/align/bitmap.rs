//! Median threshold bitmaps and their resolution pyramid

use rayon::prelude::*;
use tracing::trace;

use crate::hdr_pipeline::common::math::{self, translation_matrix};
use crate::hdr_pipeline::common::types::{GrayImage, Rgb8Image};

const HISTOGRAM_BINS: usize = 256;

/// Binary single channel buffer, one byte (0 or 1) per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub bits: Vec<u8>,
}

impl Bitmap {
    /// Integer translation; pixels shifted in from outside are 0.
    pub fn translated(&self, dx: i32, dy: i32) -> Bitmap {
        if dx == 0 && dy == 0 {
            return self.clone();
        }
        Bitmap {
            width: self.width,
            height: self.height,
            bits: math::warp_translate(
                &self.bits,
                self.width,
                self.height,
                1,
                &translation_matrix(dx, dy),
            ),
        }
    }
}

/// Threshold and exclusion bitmaps of one pyramid level
#[derive(Debug, Clone)]
pub struct BitmapLevel {
    pub median: u8,
    pub threshold: Bitmap,
    pub exclusion: Bitmap,
}

impl BitmapLevel {
    pub fn from_gray(gray: &GrayImage, tolerance: u8) -> Self {
        let median = find_median(gray);
        let (threshold, exclusion): (Vec<u8>, Vec<u8>) = gray
            .data
            .par_iter()
            .map(|&p| {
                let above = (p > median) as u8;
                let outside = (p.abs_diff(median) > tolerance) as u8;
                (above, outside)
            })
            .unzip();

        Self {
            median,
            threshold: Bitmap {
                width: gray.width,
                height: gray.height,
                bits: threshold,
            },
            exclusion: Bitmap {
                width: gray.width,
                height: gray.height,
                bits: exclusion,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.threshold.width
    }

    pub fn height(&self) -> usize {
        self.threshold.height
    }

    /// Number of pixels where the bitmaps disagree after translating `other` by
    /// `(dx, dy)`, ignoring pixels either level excludes.
    pub fn disagreement(&self, other: &BitmapLevel, dx: i32, dy: i32) -> u64 {
        let threshold = other.threshold.translated(dx, dy);
        let exclusion = other.exclusion.translated(dx, dy);

        self.threshold
            .bits
            .par_iter()
            .zip(threshold.bits.par_iter())
            .zip(self.exclusion.bits.par_iter().zip(exclusion.bits.par_iter()))
            .map(|((&rt, &ct), (&re, &ce))| ((rt ^ ct) & re & ce) as u64)
            .sum()
    }
}

/// Pyramid of bitmap levels indexed finest (0) to coarsest.
#[derive(Debug, Clone)]
pub struct BitmapPyramid {
    levels: Vec<BitmapLevel>,
}

impl BitmapPyramid {
    /// Builds up to `max_levels` levels; stops early once halving would leave an
    /// empty image.
    pub fn build(image: &Rgb8Image, max_levels: usize, tolerance: u8) -> Self {
        let mut gray = math::to_gray(image);
        let mut levels = Vec::with_capacity(max_levels);

        for level in 0..max_levels {
            let bitmap_level = BitmapLevel::from_gray(&gray, tolerance);
            trace!(
                level,
                width = gray.width,
                height = gray.height,
                median = bitmap_level.median,
                "Built bitmap level"
            );
            levels.push(bitmap_level);

            if level + 1 < max_levels {
                if gray.width < 2 || gray.height < 2 {
                    break;
                }
                gray = downsample_half(&gray);
            }
        }

        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> &BitmapLevel {
        &self.levels[index]
    }

    pub fn levels(&self) -> &[BitmapLevel] {
        &self.levels
    }
}

/// Smallest intensity whose cumulative count reaches `ceil(pixel_count / 2)`.
pub fn median_from_histogram(histogram: &[u64; HISTOGRAM_BINS], pixel_count: u64) -> u8 {
    let middle = pixel_count.div_ceil(2);
    let mut cumulative = 0u64;
    for (intensity, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= middle {
            return intensity as u8;
        }
    }
    (HISTOGRAM_BINS - 1) as u8
}

pub fn find_median(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; HISTOGRAM_BINS];
    for &p in &gray.data {
        histogram[p as usize] += 1;
    }
    median_from_histogram(&histogram, gray.data.len() as u64)
}

/// Halves both dimensions, averaging each 2x2 block with rounding.
pub fn downsample_half(gray: &GrayImage) -> GrayImage {
    let width = gray.width / 2;
    let height = gray.height / 2;
    let mut data = vec![0u8; width * height];
    if width > 0 {
        data.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let top = &gray.data[2 * y * gray.width..];
                let bottom = &gray.data[(2 * y + 1) * gray.width..];
                for (x, out) in row.iter_mut().enumerate() {
                    let sum = top[2 * x] as u32
                        + top[2 * x + 1] as u32
                        + bottom[2 * x] as u32
                        + bottom[2 * x + 1] as u32;
                    *out = ((sum + 2) / 4) as u8;
                }
            });
    }
    GrayImage { width, height, data }
}
