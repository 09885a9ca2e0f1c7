//! Common utilities module
//!
//! Error type, image buffers, numeric helpers and stage timing shared across the pipeline.

pub mod error;
pub mod math;
pub mod timing;
pub mod types;

pub use error::{HdrError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{CHANNELS, Exposure, ExposureSet, GrayImage, RadianceMap, Rgb8Image};
