//! Response curve recovery and radiance fusion module

pub mod curve;
mod debevec_solver;
pub mod least_squares;
mod solver;
pub mod weight;


pub use curve::ResponseCurve;
pub use debevec_solver::DebevecSolver;
pub use solver::{ResponseSolver, ResponseSolverKind};
pub use weight::{WeightKind, WeightTable};
