use hl_core::HlError;
use thiserror::Error;

pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("non-physical gas property: {what}")]
    NonPhysical { what: &'static str },

    /// Outside the backend's curve-fit window.
    #[error("outside the property fit range: {what}")]
    OutOfRange { what: &'static str },

    #[error("invalid fluid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("unsupported by the fluid model: {what}")]
    NotSupported { what: &'static str },

    /// An inverse temperature solve (P-h, P-s, h-s) ran out of iterations.
    #[error("{what} did not converge in {iterations} iterations (residual {residual:.3e})")]
    ConvergenceFailed {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },
}

impl From<FluidError> for HlError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::OutOfRange { what } | FluidError::InvalidArg { what } => {
                HlError::InvalidArg { what }
            }
            FluidError::NonPhysical { what }
            | FluidError::NotSupported { what }
            | FluidError::ConvergenceFailed { what, .. } => HlError::Invariant { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convergence_message_names_the_solve() {
        let msg = FluidError::ConvergenceFailed {
            what: "temperature from pressure and entropy",
            iterations: 100,
            residual: 1.5,
        }
        .to_string();
        assert!(msg.starts_with("temperature from pressure and entropy"));
        assert!(msg.contains("100 iterations"));
    }

    #[test]
    fn fit_window_maps_to_invalid_argument() {
        let err: HlError = FluidError::OutOfRange { what: "T > 6000 K" }.into();
        assert_eq!(err, HlError::InvalidArg { what: "T > 6000 K" });
        let err: HlError = FluidError::NotSupported { what: "mixtures" }.into();
        assert!(matches!(err, HlError::Invariant { what: "mixtures" }));
    }
}
