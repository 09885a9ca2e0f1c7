//! Exposure loading from a directory of images and a shutter speed list.
//!
//! Images are taken in file name order and paired index-for-index with the
//! speeds listed in the shutter file.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, info, instrument};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::{ExposureSet, Rgb8Image};
use crate::hdr_pipeline::io::reader::ExposureReader;

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryExposureReader;

impl DirectoryExposureReader {
    /// Image files in `dir`, sorted by file name. Files with an unrecognised
    /// extension are skipped.
    pub fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| {
            HdrError::ResourceFailure(format!("{}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if ImageFormat::from_path(&path).is_err() {
                debug!(path = %path.display(), "Skipping non-image file");
                continue;
            }
            paths.push(path);
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Decodes one file to 8-bit RGB.
    pub fn read_image(&self, path: &Path) -> Result<Rgb8Image> {
        let decoded = image::open(path)
            .map_err(|e| HdrError::DecodeError(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        debug!(path = %path.display(), width, height, "Decoded exposure");
        Rgb8Image::new(width, height, decoded.into_raw())
    }

    pub fn read_shutter_speeds(&self, path: &Path) -> Result<Vec<f32>> {
        let text = fs::read_to_string(path).map_err(|e| {
            HdrError::ResourceFailure(format!("{}: {}", path.display(), e))
        })?;
        parse_shutter_speeds(&text)
    }
}

impl ExposureReader for DirectoryExposureReader {
    #[instrument(skip(self), fields(image_dir = %image_dir.display()))]
    fn read_exposures(&self, image_dir: &Path, shutter_file: &Path) -> Result<ExposureSet> {
        let paths = self.list_images(image_dir)?;
        let speeds = self.read_shutter_speeds(shutter_file)?;
        if paths.len() != speeds.len() {
            return Err(HdrError::InvalidInput(format!(
                "{} images in {} but {} shutter speeds in {}",
                paths.len(),
                image_dir.display(),
                speeds.len(),
                shutter_file.display()
            )));
        }

        let images = paths
            .iter()
            .map(|path| self.read_image(path))
            .collect::<Result<Vec<_>>>()?;
        info!(count = images.len(), "Loaded exposures");
        ExposureSet::from_parts(images, speeds)
    }
}

/// Parses one shutter speed per non-empty line, either a decimal (`0.004`) or
/// a fraction (`1/250`). Text after `#` is ignored.
pub fn parse_shutter_speeds(text: &str) -> Result<Vec<f32>> {
    let mut speeds = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let speed = parse_speed(content).ok_or_else(|| {
            HdrError::InvalidInput(format!(
                "line {}: '{}' is not a positive shutter speed",
                number + 1,
                content
            ))
        })?;
        speeds.push(speed);
    }
    Ok(speeds)
}

fn parse_speed(text: &str) -> Option<f32> {
    let value = match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            num / den
        }
        None => text.parse::<f64>().ok()?,
    };
    let value = value as f32;
    (value.is_finite() && value > 0.0).then_some(value)
}
