//! Error types for network assembly, evaluation and driving.

use hl_components::ComponentError;
use hl_graph::GraphError;
use hl_solver::SolverError;
use thiserror::Error;

/// Errors raised while building, evaluating or driving the cycle.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: ComponentError,
    },

    #[error("Unknown stage '{name}'")]
    UnknownStage { name: String },

    #[error("Unknown input '{name}'")]
    UnknownInput { name: String },

    #[error("Unknown output '{name}'")]
    UnknownOutput { name: String },

    #[error("Invalid value {field} = {value}: {reason}")]
    InvalidDesign {
        field: String,
        value: f64,
        reason: &'static str,
    },

    #[error("Network invariant violated: {what}")]
    Invariant { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CycleResult<T> = Result<T, CycleError>;

impl CycleError {
    /// Tag a stage failure with the stage name.
    pub fn stage(stage: impl Into<String>) -> impl FnOnce(ComponentError) -> CycleError {
        let stage = stage.into();
        move |source| CycleError::Stage { stage, source }
    }

    /// True when the failure is a non-converged root find anywhere in the stack.
    pub fn is_convergence(&self) -> bool {
        match self {
            CycleError::Stage { source, .. } | CycleError::Component(source) => {
                source.is_convergence()
            }
            CycleError::Solver(e) => e.is_convergence(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_context_in_message() {
        let err = CycleError::stage("split")(ComponentError::NegativeFlow {
            w1: 0.44,
            w_in: 0.404,
        });
        let msg = err.to_string();
        assert!(msg.contains("'split'"));
        assert!(msg.contains("0.44"));
    }

    #[test]
    fn convergence_is_detected_through_stage() {
        let err = CycleError::stage("diffuser")(ComponentError::Convergence {
            what: "Mach for target area",
            source: SolverError::NoSignChange {
                lo: 1e-4,
                hi: 1.0,
                f_lo: 1.0,
                f_hi: 0.5,
            },
        });
        assert!(err.is_convergence());
        assert!(!CycleError::UnknownInput { name: "x".into() }.is_convergence());
    }
}
