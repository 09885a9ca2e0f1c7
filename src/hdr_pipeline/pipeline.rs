//! HDR pipeline module
//!
//! Composes alignment, radiance recovery and tone mapping over one exposure set.

mod hdr_solver;

#[cfg(test)]
mod tests;

pub use hdr_solver::HdrPipeline;
