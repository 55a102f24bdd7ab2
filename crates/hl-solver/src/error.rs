//! Error types for root finding.

use hl_core::error::HlError;
use thiserror::Error;

/// Errors raised by the bounded root finders.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("No sign change in bracket [{lo}, {hi}]: f(lo)={f_lo:.6e}, f(hi)={f_hi:.6e}")]
    NoSignChange {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    #[error("Iteration limit {iterations} reached at x={x:.9e} (residual {residual:.3e})")]
    IterationLimit {
        iterations: usize,
        x: f64,
        residual: f64,
    },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Invalid bracket [{lo}, {hi}]")]
    InvalidBracket { lo: f64, hi: f64 },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// True for the failures a caller reports as non-convergence.
    pub fn is_convergence(&self) -> bool {
        matches!(
            self,
            SolverError::NoSignChange { .. }
                | SolverError::IterationLimit { .. }
                | SolverError::ConvergenceFailed { .. }
        )
    }
}

impl From<SolverError> for HlError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::NoSignChange { .. }
            | SolverError::IterationLimit { .. }
            | SolverError::ConvergenceFailed { .. } => HlError::Invariant {
                what: "root find did not converge",
            },
            SolverError::InvalidBracket { .. } => HlError::InvalidArg { what: "bracket" },
            SolverError::Numeric { .. } => HlError::InvalidArg { what: "numeric" },
        }
    }
}
