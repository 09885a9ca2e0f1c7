//! HDR reconstruction pipeline module
//!
//! Rebuilds scene radiance from a bracketed exposure sequence and tone maps it,
//! with separate modules for alignment, response recovery, tone mapping, file
//! I/O and orchestration.

pub mod align;
pub mod common;
pub mod config;
pub mod io;
pub mod pipeline;
pub mod response;
pub mod tone_map;

pub use common::{ExposureSet, HdrError, PipelineTimings, RadianceMap, Result, Rgb8Image};

pub use align::{AlignerKind, ImageAligner, MtbAligner};

pub use response::{DebevecSolver, ResponseSolver, ResponseSolverKind, WeightKind};

pub use tone_map::{
    BilateralToneMapper, PhotographicGlobal, PhotographicLocal, ToneMapOperator, ToneMapParams,
    ToneMapper,
};

pub use config::{PipelineConfig, PipelineConfigBuilder, Resolved};

pub use io::{
    DirectoryExposureReader, ExposureReader, LdrImageWriter, PngImageWriter, RadianceHdrWriter,
    TiffCompression, TiffImageWriter,
};

pub use pipeline::HdrPipeline;
