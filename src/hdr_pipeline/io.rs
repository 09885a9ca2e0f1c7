//! Image input and output module
//!
//! Reads exposure sequences from disk and encodes tone-mapped images (PNG,
//! TIFF) and radiance maps (Radiance `.hdr`).

mod directory_reader;
mod png_writer;
mod radiance_writer;
mod reader;
mod tiff_writer;
mod writer;


pub use directory_reader::{DirectoryExposureReader, parse_shutter_speeds};
pub use png_writer::PngImageWriter;
pub use radiance_writer::RadianceHdrWriter;
pub use reader::ExposureReader;
pub use tiff_writer::{TiffCompression, TiffImageWriter};
pub use writer::{LdrImageWriter, LdrWriterKind, RadianceWriter};
