use std::path::Path;

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::common::types::ExposureSet;

/// Loads a bracketed exposure sequence together with its shutter speeds.
pub trait ExposureReader {
    fn read_exposures(&self, image_dir: &Path, shutter_file: &Path) -> Result<ExposureSet>;
}
