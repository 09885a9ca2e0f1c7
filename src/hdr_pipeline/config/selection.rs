//! Lenient lookup of stage variants by name.
//!
//! Strict parsing is `str::parse`; these helpers instead substitute the
//! documented default for an unknown name and log a warning.

use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

use crate::hdr_pipeline::align::AlignerKind;
use crate::hdr_pipeline::common::error::HdrError;
use crate::hdr_pipeline::io::TiffCompression;
use crate::hdr_pipeline::response::{DebevecSolver, ResponseSolverKind, WeightKind};
use crate::hdr_pipeline::tone_map::ToneMapOperator;

/// A selected variant and whether the default replaced an unknown name
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub fell_back: bool,
}

impl<T> Resolved<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            fell_back: self.fell_back,
        }
    }
}

/// Parses `name`, or falls back to `T::default()` when it is not recognised.
pub fn resolve_or_default<T>(name: &str) -> Resolved<T>
where
    T: FromStr<Err = HdrError> + Default + Display,
{
    match name.parse::<T>() {
        Ok(value) => Resolved {
            value,
            fell_back: false,
        },
        Err(err) => {
            let value = T::default();
            warn!(requested = name, fallback = %value, "{}, using default", err);
            Resolved {
                value,
                fell_back: true,
            }
        }
    }
}

pub fn resolve_aligner(name: &str) -> Resolved<AlignerKind> {
    resolve_or_default(name)
}

pub fn resolve_weight(name: &str) -> Resolved<WeightKind> {
    resolve_or_default(name)
}

pub fn resolve_tone_mapper(name: &str) -> Resolved<ToneMapOperator> {
    resolve_or_default(name)
}

pub fn resolve_tiff_compression(name: &str) -> Resolved<TiffCompression> {
    resolve_or_default(name)
}

/// Resolves the solver by name and applies the Debevec parameters to it.
pub fn resolve_response_solver(
    name: &str,
    weight: WeightKind,
    sample_count: usize,
    lambda: f32,
) -> Resolved<ResponseSolverKind> {
    resolve_or_default::<ResponseSolverKind>(name).map(|kind| match kind {
        ResponseSolverKind::Debevec(_) => {
            ResponseSolverKind::Debevec(DebevecSolver::new(weight, sample_count, lambda))
        }
    })
}
