use std::fmt;
use std::io::{Cursor, Write};
use std::str::FromStr;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::Rgb8Image;
use crate::hdr_pipeline::io::writer::LdrImageWriter;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    Lzw,
    DeflateFast,
    /// Deflate at the balanced level
    #[default]
    DeflateBalanced,
    DeflateBest,
}

impl TiffCompression {
    pub const DEFAULT_NAME: &'static str = "deflate-balanced";

    pub fn name(self) -> &'static str {
        match self {
            TiffCompression::None => "none",
            TiffCompression::Lzw => "lzw",
            TiffCompression::DeflateFast => "deflate-fast",
            TiffCompression::DeflateBalanced => "deflate-balanced",
            TiffCompression::DeflateBest => "deflate-best",
        }
    }

    fn encoder_compression(self) -> Compression {
        match self {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        }
    }
}

impl fmt::Display for TiffCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TiffCompression {
    type Err = HdrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate-fast" => Ok(TiffCompression::DeflateFast),
            "deflate-balanced" | "deflate" => Ok(TiffCompression::DeflateBalanced),
            "deflate-best" => Ok(TiffCompression::DeflateBest),
            _ => Err(HdrError::UnknownVariant {
                kind: "TIFF compression",
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TiffImageWriter {
    pub compression: TiffCompression,
}

impl TiffImageWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self { compression }
    }
}

impl LdrImageWriter for TiffImageWriter {
    fn write_image(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        debug!(
            compression = ?self.compression,
            "Encoding TIFF image: {}x{}", image.width, image.height
        );

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| HdrError::EncodeError(e.to_string()))?
            .with_compression(self.compression.encoder_compression());

        encoder
            .write_image::<colortype::RGB8>(image.width as u32, image.height as u32, &image.data)
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        debug!("TIFF encoding complete");
        Ok(())
    }
}
