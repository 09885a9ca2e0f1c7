//! Image and exposure data types shared by every stage

use crate::hdr_pipeline::common::error::{HdrError, Result};

/// Number of interleaved colour channels in every image buffer.
pub const CHANNELS: usize = 3;

/// 8-bit RGB image, used for raw exposures and the tone-mapped result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgb8Image {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u8>,
}

impl Rgb8Image {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height * CHANNELS {
            return Err(HdrError::InvalidInput(format!(
                "buffer of {} bytes does not hold a {}x{} RGB image",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn black(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> [u8; CHANNELS],
    {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        let i = (y * self.width + x) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Single channel 8-bit image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Floating point scene radiance, relative rather than absolute.
///
/// Values are finite and non-negative. The buffer is only reachable through a
/// shared slice once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RadianceMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl RadianceMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height * CHANNELS {
            return Err(HdrError::InvalidInput(format!(
                "buffer of {} values does not hold a {}x{} radiance map",
                data.len(),
                width,
                height
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(HdrError::InvalidInput(format!(
                "radiance values must be finite and non-negative, found {}",
                bad
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; CHANNELS] {
        let i = (y * self.width + x) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// One captured frame together with its shutter speed in seconds
#[derive(Debug, Clone)]
pub struct Exposure {
    pub image: Rgb8Image,
    pub shutter_speed: f32,
}

impl Exposure {
    pub fn new(image: Rgb8Image, shutter_speed: f32) -> Self {
        Self { image, shutter_speed }
    }
}

/// Ordered bracketed sequence of a static scene.
///
/// Holds at least two exposures of identical dimensions, each with a finite,
/// strictly positive shutter speed.
#[derive(Debug, Clone)]
pub struct ExposureSet {
    exposures: Vec<Exposure>,
}

impl ExposureSet {
    pub const MIN_EXPOSURES: usize = 2;

    pub fn new(exposures: Vec<Exposure>) -> Result<Self> {
        if exposures.len() < Self::MIN_EXPOSURES {
            return Err(HdrError::InvalidInput(format!(
                "at least {} exposures are required, got {}",
                Self::MIN_EXPOSURES,
                exposures.len()
            )));
        }

        let (width, height) = exposures[0].image.dimensions();
        if width == 0 || height == 0 {
            return Err(HdrError::InvalidInput(format!(
                "exposures must not be empty, got {}x{}",
                width, height
            )));
        }

        for (index, exposure) in exposures.iter().enumerate() {
            if exposure.image.dimensions() != (width, height) {
                return Err(HdrError::InvalidInput(format!(
                    "exposure {} is {}x{}, expected {}x{}",
                    index, exposure.image.width, exposure.image.height, width, height
                )));
            }
            if !exposure.shutter_speed.is_finite() || exposure.shutter_speed <= 0.0 {
                return Err(HdrError::InvalidInput(format!(
                    "exposure {} has non-positive shutter speed {}",
                    index, exposure.shutter_speed
                )));
            }
        }

        Ok(Self { exposures })
    }

    pub fn from_parts(images: Vec<Rgb8Image>, shutter_speeds: Vec<f32>) -> Result<Self> {
        if images.len() != shutter_speeds.len() {
            return Err(HdrError::InvalidInput(format!(
                "{} images but {} shutter speeds",
                images.len(),
                shutter_speeds.len()
            )));
        }
        Self::new(
            images
                .into_iter()
                .zip(shutter_speeds)
                .map(|(image, speed)| Exposure::new(image, speed))
                .collect(),
        )
    }

    pub fn exposures(&self) -> &[Exposure] {
        &self.exposures
    }

    pub fn len(&self) -> usize {
        self.exposures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exposures.is_empty()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.exposures[0].image.dimensions()
    }

    pub fn images(&self) -> Vec<&Rgb8Image> {
        self.exposures.iter().map(|e| &e.image).collect()
    }

    pub fn shutter_speeds(&self) -> Vec<f32> {
        self.exposures.iter().map(|e| e.shutter_speed).collect()
    }

    /// Pairs new images with this set's shutter speeds, in order.
    pub fn with_images(&self, images: Vec<Rgb8Image>) -> Result<Self> {
        Self::from_parts(images, self.shutter_speeds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: usize, height: usize, value: u8) -> Rgb8Image {
        Rgb8Image::from_fn(width, height, |_, _| [value; CHANNELS])
    }

    #[test]
    fn test_exposure_set_requires_two_exposures() {
        let result = ExposureSet::new(vec![Exposure::new(flat(4, 4, 10), 1.0)]);
        assert!(matches!(result, Err(HdrError::InvalidInput(_))));
    }

    #[test]
    fn test_exposure_set_rejects_mismatched_dimensions() {
        let result = ExposureSet::new(vec![
            Exposure::new(flat(4, 4, 10), 1.0),
            Exposure::new(flat(4, 5, 10), 2.0),
        ]);
        assert!(matches!(result, Err(HdrError::InvalidInput(_))));
    }

    #[test]
    fn test_exposure_set_rejects_non_positive_shutter() {
        for speed in [0.0, -1.0, f32::NAN] {
            let result = ExposureSet::new(vec![
                Exposure::new(flat(4, 4, 10), 1.0),
                Exposure::new(flat(4, 4, 10), speed),
            ]);
            assert!(matches!(result, Err(HdrError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_from_parts_count_mismatch() {
        let result = ExposureSet::from_parts(vec![flat(2, 2, 0), flat(2, 2, 0)], vec![1.0]);
        assert!(matches!(result, Err(HdrError::InvalidInput(_))));
    }

    #[test]
    fn test_radiance_map_rejects_nan() {
        let result = RadianceMap::new(1, 1, vec![0.0, f32::NAN, 1.0]);
        assert!(result.is_err());
        let map = RadianceMap::new(1, 1, vec![0.0, 0.5, 1.0]).unwrap();
        assert_eq!(map.pixel(0, 0), [0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_rgb_image_buffer_size() {
        assert!(Rgb8Image::new(2, 2, vec![0; 11]).is_err());
        let image = Rgb8Image::new(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(image.pixel(1, 0), [4, 5, 6]);
    }
}
