use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::{ExposureSet, RadianceMap};
use crate::hdr_pipeline::response::debevec_solver::DebevecSolver;

/// Recovers a radiance map from aligned exposures.
///
/// Randomised steps draw from the supplied generator only, so a seeded
/// generator makes the result reproducible.
pub trait ResponseSolver {
    fn solve<R: Rng + ?Sized>(&self, exposures: &ExposureSet, rng: &mut R) -> Result<RadianceMap>;
}

/// Response recovery algorithms selectable by name
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSolverKind {
    /// Weighted least squares with a smoothness prior
    Debevec(DebevecSolver),
}

impl ResponseSolverKind {
    pub const DEFAULT_NAME: &'static str = "debevec";

    pub fn name(&self) -> &'static str {
        match self {
            ResponseSolverKind::Debevec(_) => "debevec",
        }
    }
}

impl Default for ResponseSolverKind {
    fn default() -> Self {
        ResponseSolverKind::Debevec(DebevecSolver::default())
    }
}

impl fmt::Display for ResponseSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResponseSolverKind {
    type Err = HdrError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debevec" => Ok(ResponseSolverKind::Debevec(DebevecSolver::default())),
            _ => Err(HdrError::UnknownVariant {
                kind: "response solver",
                name: name.to_string(),
            }),
        }
    }
}

impl ResponseSolver for ResponseSolverKind {
    fn solve<R: Rng + ?Sized>(&self, exposures: &ExposureSet, rng: &mut R) -> Result<RadianceMap> {
        match self {
            ResponseSolverKind::Debevec(solver) => solver.solve(exposures, rng),
        }
    }
}
