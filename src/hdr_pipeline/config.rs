//! Pipeline configuration module
//!
//! Holds the stage selection for a run and the name-based lookup used by the
//! command line.

pub mod selection;
pub mod types;


pub use selection::{
    Resolved, resolve_aligner, resolve_or_default, resolve_response_solver,
    resolve_tiff_compression, resolve_tone_mapper, resolve_weight,
};
pub use types::{PipelineConfig, PipelineConfigBuilder};
