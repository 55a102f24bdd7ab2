//! Newton solver with backtracking line search and a lower bound on unknowns.

use crate::error::SolverError;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

/// Limits and tolerances for [`newton_solve`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewtonConfig {
    /// Jacobian evaluations before giving up
    pub max_iterations: usize,
    /// Converged once `|r| < max(abs_tol, rel_tol * |r0|)`
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Trial points with any unknown below this are rejected
    pub min_value: f64,
    /// Step shrink factor per rejected trial point
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-6,
            rel_tol: 1e-9,
            min_value: f64::NEG_INFINITY,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
        }
    }
}

/// A converged Newton iterate.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    /// Jacobian evaluations taken
    pub iterations: usize,
}

/// Newton solver with line search and a lower bound on every unknown.
///
/// A trial point whose residual evaluation fails is treated like one that does
/// not reduce the residual: the step is halved. Errors at the accepted iterate
/// propagate unchanged.
pub fn newton_solve<F, J, E>(
    x0: DVector<f64>,
    mut residual_fn: F,
    mut jacobian_fn: J,
    config: &NewtonConfig,
) -> Result<NewtonResult, E>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>, E>,
    J: FnMut(&DVector<f64>) -> Result<DMatrix<f64>, E>,
    E: From<SolverError>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let target = config.abs_tol.max(config.rel_tol * r_norm);

    for iter in 0..=config.max_iterations {
        if r_norm < target {
            debug!(iterations = iter, residual_norm = r_norm, "newton converged");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }
        if iter == config.max_iterations {
            break;
        }

        let jac = jacobian_fn(&x)?;
        if jac.nrows() != r.len() || jac.ncols() != x.len() {
            return Err(SolverError::Numeric {
                what: format!(
                    "Jacobian is {}x{}, expected {}x{}",
                    jac.nrows(),
                    jac.ncols(),
                    r.len(),
                    x.len()
                ),
            }
            .into());
        }

        let dx = jac.lu().solve(&(-&r)).ok_or_else(|| SolverError::Numeric {
            what: "singular Jacobian".to_string(),
        })?;

        let mut alpha = 1.0;
        let mut accepted: Option<(DVector<f64>, DVector<f64>, f64)> = None;
        for _ in 0..=config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            let in_bounds = x_new.iter().all(|v| *v >= config.min_value);
            if in_bounds {
                if let Ok(r_new) = residual_fn(&x_new) {
                    let r_new_norm = r_new.norm();
                    if r_new_norm.is_finite() && r_new_norm < r_norm {
                        accepted = Some((x_new, r_new, r_new_norm));
                        break;
                    }
                }
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            warn!(iteration = iter, residual_norm = r_norm, "newton line search stagnated");
            return Err(SolverError::ConvergenceFailed {
                what: format!(
                    "Line search stagnated at iteration {iter}, residual = {r_norm:.3e}"
                ),
            }
            .into());
        };

        debug!(iteration = iter, alpha, residual_norm = r_new_norm, "newton step");
        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, residual = {:.3e}",
            config.max_iterations, r_norm
        ),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;
    use crate::jacobian::finite_difference_jacobian;

    #[test]
    fn analytic_jacobian_square_root() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let result =
            newton_solve(DVector::from_element(1, 3.0), residual, jacobian, &NewtonConfig::default())
                .unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-6);
        assert!(result.iterations > 0 && result.residual_norm < 1e-6);
    }

    #[test]
    fn coupled_system_with_fd_jacobian() {
        // x0^2 + x1^2 = 25, x0 - x1 = 1  ->  (4, 3)
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                x[0] * x[0] + x[1] * x[1] - 25.0,
                x[0] - x[1] - 1.0,
            ]))
        };
        let config = NewtonConfig {
            min_value: 0.0,
            ..NewtonConfig::default()
        };
        let result = newton_solve(
            DVector::from_vec(vec![5.0, 1.0]),
            residual,
            |x: &DVector<f64>| finite_difference_jacobian(x, residual, 1e-7),
            &config,
        )
        .unwrap();
        assert!((result.x[0] - 4.0).abs() < 1e-6);
        assert!((result.x[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn failed_trial_points_are_backtracked() {
        // residual undefined below 1.0
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] < 1.0 {
                return Err(SolverError::Numeric { what: "domain".into() });
            }
            Ok(DVector::from_element(1, x[0].ln() - 0.1))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 1.0 / x[0]))
        };
        let result =
            newton_solve(DVector::from_element(1, 8.0), residual, jacobian, &NewtonConfig::default())
                .unwrap();
        assert!((result.x[0] - 0.1_f64.exp()).abs() < 1e-6);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        let residual = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 1.0))
        };
        let jacobian = |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::zeros(1, 1))
        };
        let err = newton_solve(DVector::from_element(1, 0.0), residual, jacobian, &NewtonConfig::default())
            .unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }
}
