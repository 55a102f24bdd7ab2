//! Derivative-free scalar Newton (secant) iteration.

use crate::bracket::RootResult;
use crate::error::SolverError;
use tracing::trace;

/// Secant iteration configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SecantConfig {
    pub max_iterations: usize,
    /// Step size at which the iteration counts as converged, relative to max(1, |x|)
    pub x_tol: f64,
    /// Absolute residual accepted as a root
    pub f_tol: f64,
    /// Largest step allowed per iteration, absolute
    pub max_step: f64,
}

impl Default for SecantConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            x_tol: 1e-12,
            f_tol: 1e-12,
            max_step: f64::INFINITY,
        }
    }
}

/// Secant iteration from two starting points.
///
/// No bracketing: convergence depends on the starting pair. Steps are clipped to
/// `max_step`. Fails with `IterationLimit` after `max_iterations` updates and with
/// `Numeric` when the secant slope vanishes or a residual is not finite.
pub fn secant<F, E>(mut f: F, x0: f64, x1: f64, config: &SecantConfig) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    let check = |v: f64, x: f64| -> Result<f64, E> {
        if v.is_finite() {
            Ok(v)
        } else {
            Err(SolverError::Numeric {
                what: format!("residual is {v} at x={x}"),
            }
            .into())
        }
    };

    let mut x_prev = x0;
    let mut f_prev = check(f(x0)?, x0)?;
    if f_prev.abs() <= config.f_tol {
        return Ok(RootResult {
            x: x0,
            residual: f_prev,
            iterations: 0,
        });
    }
    let mut x = x1;
    let mut fx = check(f(x1)?, x1)?;

    for iter in 1..=config.max_iterations {
        if fx.abs() <= config.f_tol {
            trace!(iterations = iter, x, residual = fx, "secant converged on residual");
            return Ok(RootResult {
                x,
                residual: fx,
                iterations: iter,
            });
        }

        let slope = (fx - f_prev) / (x - x_prev);
        if !slope.is_finite() || slope == 0.0 {
            return Err(SolverError::Numeric {
                what: format!("secant slope vanished at x={x}"),
            }
            .into());
        }

        let step = (-fx / slope).clamp(-config.max_step, config.max_step);
        x_prev = x;
        f_prev = fx;
        x += step;
        fx = check(f(x)?, x)?;

        if step.abs() <= config.x_tol * x.abs().max(1.0) {
            trace!(iterations = iter, x, residual = fx, "secant converged on step");
            return Ok(RootResult {
                x,
                residual: fx,
                iterations: iter,
            });
        }
    }

    Err(SolverError::IterationLimit {
        iterations: config.max_iterations,
        x,
        residual: fx,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    #[test]
    fn cube_root() {
        let root = secant(
            |x| -> SolverResult<f64> { Ok(x * x * x - 27.0) },
            2.0,
            2.5,
            &SecantConfig::default(),
        )
        .unwrap();
        assert!((root.x - 3.0).abs() < 1e-10);
    }

    #[test]
    fn step_clipping_still_converges() {
        let config = SecantConfig {
            max_step: 0.25,
            ..SecantConfig::default()
        };
        let root = secant(|x| -> SolverResult<f64> { Ok(x - 4.0) }, 0.0, 0.1, &config).unwrap();
        assert!((root.x - 4.0).abs() < 1e-10);
        assert!(root.iterations >= 15);
    }

    #[test]
    fn flat_function_is_reported() {
        let err = secant(
            |_| -> SolverResult<f64> { Ok(1.0) },
            0.0,
            1.0,
            &SecantConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let config = SecantConfig {
            max_iterations: 3,
            ..SecantConfig::default()
        };
        // no real root; iterates must not settle
        let err = secant(|x| -> SolverResult<f64> { Ok(x * x + 1.0) }, 0.5, 1.0, &config).unwrap_err();
        assert!(matches!(err, SolverError::IterationLimit { iterations: 3, .. }) || matches!(err, SolverError::Numeric { .. }));
    }
}
