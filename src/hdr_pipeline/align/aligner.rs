use std::fmt;
use std::str::FromStr;

use crate::hdr_pipeline::align::mtb_aligner::MtbAligner;
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::ExposureSet;

pub trait ImageAligner {
    fn align(&self, exposures: &ExposureSet) -> Result<ExposureSet>;
}

/// Alignment algorithms selectable by name
#[derive(Debug, Clone, PartialEq)]
pub enum AlignerKind {
    /// Median threshold bitmap pyramid search
    Mtb(MtbAligner),
}

impl AlignerKind {
    pub const DEFAULT_NAME: &'static str = "mtb";

    pub fn name(&self) -> &'static str {
        match self {
            AlignerKind::Mtb(_) => "mtb",
        }
    }
}

impl Default for AlignerKind {
    fn default() -> Self {
        AlignerKind::Mtb(MtbAligner::default())
    }
}

impl fmt::Display for AlignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlignerKind {
    type Err = HdrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mtb" => Ok(AlignerKind::Mtb(MtbAligner::default())),
            _ => Err(HdrError::UnknownVariant {
                kind: "aligner",
                name: name.to_string(),
            }),
        }
    }
}

impl ImageAligner for AlignerKind {
    fn align(&self, exposures: &ExposureSet) -> Result<ExposureSet> {
        match self {
            AlignerKind::Mtb(aligner) => aligner.align(exposures),
        }
    }
}
