//! Forward-difference Jacobians for residual closures that have no analytic
//! derivative (every network residual).

use crate::error::SolverError;
use nalgebra::{DMatrix, DVector};

fn step_for(x: f64, epsilon: f64) -> f64 {
    epsilon * x.abs().max(1.0)
}

/// Column `j` is `(f(x + h e_j) - f(x)) / h` with `h = epsilon * max(1, |x_j|)`.
///
/// Costs `n + 1` residual evaluations; a residual whose length changes between
/// calls is a numeric error.
pub fn finite_difference_jacobian<F, E>(
    x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> Result<DMatrix<f64>, E>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>, E>,
    E: From<SolverError>,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let dx = step_for(x[j], epsilon);
        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;

        let f_perturbed = f(&x_perturbed)?;
        if f_perturbed.len() != m {
            return Err(SolverError::Numeric {
                what: format!("residual length changed from {m} to {}", f_perturbed.len()),
            }
            .into());
        }
        jac.set_column(j, &((f_perturbed - &f_x) / dx));
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    #[test]
    fn jacobian_linear() {
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };
        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();
        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_two_by_two() {
        // f = (x0 * x1, x0 + 3 x1)
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] * x[1], x[0] + 3.0 * x[1]]))
        };
        let x = DVector::from_vec(vec![2.0, 5.0]);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();
        assert!((jac[(0, 0)] - 5.0).abs() < 1e-5);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn changing_residual_length_is_an_error() {
        let mut calls = 0;
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            calls += 1;
            Ok(DVector::from_element(calls, x[0]))
        };
        let err = finite_difference_jacobian(&DVector::from_element(1, 1.0), f, 1e-7).unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }
}
