//! Radiance RGBE (`.hdr`) export of reconstructed radiance maps.

use std::io::Write;

use image::Rgb;
use image::codecs::hdr::HdrEncoder;
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::{CHANNELS, RadianceMap};
use crate::hdr_pipeline::io::writer::RadianceWriter;

#[derive(Debug, Clone, Copy, Default)]
pub struct RadianceHdrWriter;

impl RadianceWriter for RadianceHdrWriter {
    fn write_radiance(&self, radiance: &RadianceMap, output: &mut dyn Write) -> Result<()> {
        let (width, height) = (radiance.width(), radiance.height());
        debug!("Encoding radiance map: {}x{}", width, height);

        let pixels: Vec<Rgb<f32>> = radiance
            .data()
            .chunks_exact(CHANNELS)
            .map(|px| Rgb([px[0], px[1], px[2]]))
            .collect();

        let mut buffer = Vec::new();
        HdrEncoder::new(&mut buffer)
            .encode(&pixels, width, height)
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}
