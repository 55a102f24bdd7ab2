//! Bisection on a sign-changing bracket.

use crate::error::SolverError;
use tracing::trace;

/// Bisection configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BisectConfig {
    /// Maximum halvings before giving up
    pub max_iterations: usize,
    /// Half-width at which the bracket counts as converged, relative to max(1, |x|)
    pub x_tol: f64,
    /// Absolute residual accepted as a root
    pub f_tol: f64,
}

impl Default for BisectConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_tol: 1e-12,
            f_tol: 1e-12,
        }
    }
}

/// Converged scalar root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootResult {
    pub x: f64,
    pub residual: f64,
    pub iterations: usize,
}

fn finite<E: From<SolverError>>(v: f64, x: f64) -> Result<f64, E> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SolverError::Numeric {
            what: format!("residual is {v} at x={x}"),
        }
        .into())
    }
}

/// Find a root of `f` inside `[lo, hi]` by bisection.
///
/// Fails with `NoSignChange` when `f(lo)` and `f(hi)` share a sign and with
/// `IterationLimit` when `max_iterations` halvings do not reach tolerance.
pub fn bisect<F, E>(mut f: F, lo: f64, hi: f64, config: &BisectConfig) -> Result<RootResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
        return Err(SolverError::InvalidBracket { lo, hi }.into());
    }

    let mut a = lo;
    let mut b = hi;
    let mut f_a = finite(f(a)?, a)?;
    if f_a.abs() <= config.f_tol {
        return Ok(RootResult {
            x: a,
            residual: f_a,
            iterations: 0,
        });
    }
    let f_b = finite(f(b)?, b)?;
    if f_b.abs() <= config.f_tol {
        return Ok(RootResult {
            x: b,
            residual: f_b,
            iterations: 0,
        });
    }
    if f_a.signum() == f_b.signum() {
        return Err(SolverError::NoSignChange {
            lo,
            hi,
            f_lo: f_a,
            f_hi: f_b,
        }
        .into());
    }

    let mut mid = 0.5 * (a + b);
    let mut f_mid = f_a;
    for iter in 1..=config.max_iterations {
        mid = 0.5 * (a + b);
        f_mid = finite(f(mid)?, mid)?;

        let half_width = 0.5 * (b - a);
        if f_mid.abs() <= config.f_tol || half_width <= config.x_tol * mid.abs().max(1.0) {
            trace!(iterations = iter, x = mid, residual = f_mid, "bisection converged");
            return Ok(RootResult {
                x: mid,
                residual: f_mid,
                iterations: iter,
            });
        }

        if f_mid.signum() == f_a.signum() {
            a = mid;
            f_a = f_mid;
        } else {
            b = mid;
        }
    }

    Err(SolverError::IterationLimit {
        iterations: config.max_iterations,
        x: mid,
        residual: f_mid,
    }
    .into())
}
