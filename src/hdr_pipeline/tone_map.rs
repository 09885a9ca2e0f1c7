//! Tone mapping module
//!
//! Operators compress luminance and rebuild colour from the original channel
//! ratios, producing an 8-bit RGB image.

mod bilateral;
pub mod filters;
mod mapper;
mod photographic_global;
mod photographic_local;

#[cfg(test)]
mod tests;

pub use bilateral::BilateralToneMapper;
pub use mapper::{MIN_LUMINANCE, ToneMapOperator, ToneMapParams, ToneMapper};
pub use photographic_global::PhotographicGlobal;
pub use photographic_local::PhotographicLocal;
