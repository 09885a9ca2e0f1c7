//! Median threshold bitmap (MTB) alignment.
//!
//! Every frame is reduced to a pyramid of median threshold bitmaps. Offsets are
//! searched coarse to fine: at each level the running offset is doubled and the
//! nine neighbouring offsets are scored by counting disagreeing, non-excluded
//! bits against the reference frame. Only integer translations are recovered.

use tracing::{debug, info, instrument};

use crate::hdr_pipeline::align::aligner::ImageAligner;
use crate::hdr_pipeline::align::bitmap::BitmapPyramid;
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::math::{self, translation_matrix};
use crate::hdr_pipeline::common::types::{CHANNELS, ExposureSet, Rgb8Image};

/// Candidate steps in evaluation order; earlier entries win ties.
const STEP_X: [i32; 9] = [-1, 0, 1, -1, 0, 1, -1, 0, 1];
const STEP_Y: [i32; 9] = [1, 1, 1, 0, 0, 0, -1, -1, -1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MtbAligner {
    /// Number of pyramid levels, including full resolution
    pub levels: usize,
    /// Pixels within this distance of the median are ignored when comparing bitmaps
    pub exclusion_tolerance: u8,
}

impl Default for MtbAligner {
    fn default() -> Self {
        Self {
            levels: 5,
            exclusion_tolerance: 4,
        }
    }
}

impl MtbAligner {
    pub fn new(levels: usize, exclusion_tolerance: u8) -> Self {
        Self {
            levels: levels.max(1),
            exclusion_tolerance,
        }
    }

    pub fn reference_index(count: usize) -> usize {
        count / 2
    }

    fn validate(images: &[&Rgb8Image]) -> Result<()> {
        let first = images
            .first()
            .ok_or_else(|| HdrError::InvalidInput("no images to align".to_string()))?;
        for (index, image) in images.iter().enumerate() {
            if image.dimensions() != first.dimensions() {
                return Err(HdrError::InvalidInput(format!(
                    "image {} is {}x{}, expected {}x{}",
                    index, image.width, image.height, first.width, first.height
                )));
            }
        }
        Ok(())
    }

    /// Offset that best maps `candidate` onto `reference`.
    pub fn find_offset(&self, reference: &BitmapPyramid, candidate: &BitmapPyramid) -> Offset {
        let mut offset = Offset::ZERO;
        let levels = reference.len().min(candidate.len());

        for level in (0..levels).rev() {
            let ref_level = reference.level(level);
            let cand_level = candidate.level(level);

            offset.x *= 2;
            offset.y *= 2;

            let mut best_error = u64::MAX;
            let mut best = 0;
            for (idx, (dx, dy)) in STEP_X.iter().zip(STEP_Y.iter()).enumerate() {
                let error = ref_level.disagreement(cand_level, offset.x + dx, offset.y + dy);
                if error < best_error {
                    best_error = error;
                    best = idx;
                }
            }

            offset.x += STEP_X[best];
            offset.y += STEP_Y[best];
        }

        offset
    }

    /// Per-image offsets relative to the middle image (which is always zero).
    pub fn find_offsets(&self, images: &[&Rgb8Image]) -> Result<Vec<Offset>> {
        Self::validate(images)?;

        let middle = Self::reference_index(images.len());
        let reference = BitmapPyramid::build(images[middle], self.levels, self.exclusion_tolerance);

        let offsets = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                if index == middle {
                    return Offset::ZERO;
                }
                let pyramid = BitmapPyramid::build(image, self.levels, self.exclusion_tolerance);
                let offset = self.find_offset(&reference, &pyramid);
                debug!(
                    image = index + 1,
                    offset_x = offset.x,
                    offset_y = offset.y,
                    "Found alignment offset"
                );
                offset
            })
            .collect();

        Ok(offsets)
    }

    pub fn align_images(&self, images: &[&Rgb8Image]) -> Result<Vec<Rgb8Image>> {
        let offsets = self.find_offsets(images)?;

        Ok(images
            .iter()
            .zip(offsets)
            .map(|(image, offset)| {
                if offset == Offset::ZERO {
                    return (*image).clone();
                }
                Rgb8Image {
                    width: image.width,
                    height: image.height,
                    data: math::warp_translate(
                        &image.data,
                        image.width,
                        image.height,
                        CHANNELS,
                        &translation_matrix(offset.x, offset.y),
                    ),
                }
            })
            .collect())
    }
}

impl ImageAligner for MtbAligner {
    #[instrument(skip_all, fields(images = exposures.len()))]
    fn align(&self, exposures: &ExposureSet) -> Result<ExposureSet> {
        let middle = Self::reference_index(exposures.len());
        info!("Aligning images using MTB, image {} as reference", middle + 1);

        let aligned = self.align_images(&exposures.images())?;
        exposures.with_images(aligned)
    }
}
