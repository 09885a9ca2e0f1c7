use nalgebra::{DMatrix, DVector};

use crate::hdr_pipeline::common::error::{HdrError, Result};

/// Minimum-norm least squares solution of `a * x = b` via an SVD pseudo-inverse.
///
/// Singular values below `eps * max(rows, cols) * sigma_max` are treated as zero,
/// so rank deficient systems still produce a solution.
pub fn solve_least_squares(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(HdrError::InvalidInput(format!(
            "system has {} rows but right-hand side has {}",
            a.nrows(),
            b.len()
        )));
    }

    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(HdrError::NumericFailure(
            "least squares system contains non-finite entries".to_string(),
        ));
    }

    let scale = a.nrows().max(a.ncols()) as f64;
    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.max();
    if !sigma_max.is_finite() {
        return Err(HdrError::NumericFailure(
            "singular value decomposition did not converge".to_string(),
        ));
    }
    let tolerance = f64::EPSILON * scale * sigma_max;

    let x = svd
        .solve(b, tolerance)
        .map_err(|e| HdrError::NumericFailure(e.to_string()))?;

    if x.iter().any(|v| !v.is_finite()) {
        return Err(HdrError::NumericFailure(
            "least squares solution is not finite".to_string(),
        ));
    }
    Ok(x)
}
