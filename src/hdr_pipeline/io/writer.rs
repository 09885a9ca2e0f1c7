use std::io::Write;
use std::path::Path;

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::common::types::{RadianceMap, Rgb8Image};
use crate::hdr_pipeline::io::png_writer::PngImageWriter;
use crate::hdr_pipeline::io::tiff_writer::{TiffCompression, TiffImageWriter};

/// Encodes a tone-mapped 8-bit image.
pub trait LdrImageWriter {
    fn write_image(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()>;
}

/// Encodes a floating point radiance map.
pub trait RadianceWriter {
    fn write_radiance(&self, radiance: &RadianceMap, output: &mut dyn Write) -> Result<()>;
}

/// LDR encoders chosen by output file extension
#[derive(Debug, Clone, Copy)]
pub enum LdrWriterKind {
    Png(PngImageWriter),
    Tiff(TiffImageWriter),
}

impl LdrWriterKind {
    /// `.tif` and `.tiff` select TIFF with the given compression, anything else PNG.
    pub fn for_path(path: &Path, compression: TiffCompression) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("tif") | Some("tiff") => LdrWriterKind::Tiff(TiffImageWriter::new(compression)),
            _ => LdrWriterKind::Png(PngImageWriter),
        }
    }
}

impl LdrImageWriter for LdrWriterKind {
    fn write_image(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        match self {
            LdrWriterKind::Png(writer) => writer.write_image(image, output),
            LdrWriterKind::Tiff(writer) => writer.write_image(image, output),
        }
    }
}
