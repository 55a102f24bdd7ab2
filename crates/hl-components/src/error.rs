//! Error types for stage operations.

use hl_core::error::HlError;
use hl_fluids::FluidError;
use hl_graph::SignalKind;
use hl_solver::SolverError;
use thiserror::Error;

/// Errors that can occur while a stage transforms its inputs.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown solve mode '{mode}' (expected \"MN\" or \"area\")")]
    InvalidMode { mode: String },

    #[error("Split flow W1={w1} kg/s is outside [0, {w_in}] kg/s")]
    NegativeFlow { w1: f64, w_in: f64 },

    #[error("Inbound flow has no static state: {what}")]
    MissingStatics { what: &'static str },

    #[error("Port '{port}' expected a {expected} signal, got {found}")]
    UnexpectedSignal {
        port: &'static str,
        expected: SignalKind,
        found: SignalKind,
    },

    #[error("{what} did not converge: {source}")]
    Convergence {
        what: &'static str,
        #[source]
        source: SolverError,
    },

    #[error("Fluid model error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    /// True when the failure is a root find that ran out of bracket or iterations.
    pub fn is_convergence(&self) -> bool {
        match self {
            ComponentError::Convergence { .. } => true,
            ComponentError::Solver(e) => e.is_convergence(),
            ComponentError::Fluid(FluidError::ConvergenceFailed { .. }) => true,
            _ => false,
        }
    }

    /// Label a bare solver failure with the sub-solve that produced it.
    pub(crate) fn in_solve(self, what: &'static str) -> Self {
        match self {
            ComponentError::Solver(source) if source.is_convergence() => {
                ComponentError::Convergence { what, source }
            }
            other => other,
        }
    }
}

impl From<ComponentError> for HlError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::NonPhysical { what } => HlError::Invariant { what },
            ComponentError::InvalidArg { what } => HlError::InvalidArg { what },
            ComponentError::InvalidMode { .. } => HlError::InvalidArg { what: "solve mode" },
            ComponentError::NegativeFlow { .. } => HlError::InvalidArg { what: "split flow" },
            ComponentError::MissingStatics { what } => HlError::Invariant { what },
            ComponentError::UnexpectedSignal { port, .. } => HlError::InvalidArg { what: port },
            ComponentError::Convergence { what, .. } => HlError::Invariant { what },
            ComponentError::Fluid(e) => e.into(),
            ComponentError::Solver(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NegativeFlow { w1: 0.44, w_in: 0.4 };
        let msg = err.to_string();
        assert!(msg.contains("0.44"));
        assert!(msg.contains("0.4"));

        let err = ComponentError::InvalidMode {
            mode: "Mach".into(),
        };
        assert!(err.to_string().contains("'Mach'"));
    }

    #[test]
    fn solver_failures_get_labelled() {
        let err: ComponentError = SolverError::NoSignChange {
            lo: 1e-4,
            hi: 1.0,
            f_lo: 3.0,
            f_hi: 0.2,
        }
        .into();
        let labelled = err.in_solve("area match");
        assert!(matches!(
            labelled,
            ComponentError::Convergence {
                what: "area match",
                ..
            }
        ));
        assert!(labelled.is_convergence());

        let numeric: ComponentError = SolverError::Numeric { what: "nan".into() }.into();
        assert!(matches!(numeric.in_solve("x"), ComponentError::Solver(_)));
    }

    #[test]
    fn error_conversion() {
        let err: HlError = ComponentError::InvalidArg { what: "test" }.into();
        assert!(matches!(err, HlError::InvalidArg { what: "test" }));
    }
}
