//! Exposure alignment module
//!
//! Translational alignment of a bracketed sequence to its middle frame.

mod aligner;
pub mod bitmap;
mod mtb_aligner;


pub use aligner::{AlignerKind, ImageAligner};
pub use bitmap::{Bitmap, BitmapLevel, BitmapPyramid};
pub use mtb_aligner::{MtbAligner, Offset};
