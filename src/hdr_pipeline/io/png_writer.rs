use std::io::Write;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::Rgb8Image;
use crate::hdr_pipeline::io::writer::LdrImageWriter;

#[derive(Debug, Clone, Copy, Default)]
pub struct PngImageWriter;

impl LdrImageWriter for PngImageWriter {
    fn write_image(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                &image.data,
                image.width as u32,
                image.height as u32,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        debug!("PNG encoding complete");
        Ok(())
    }
}
