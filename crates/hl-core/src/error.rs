//! Workspace-wide error kinds every crate-specific error converts into.

use thiserror::Error;

pub type HlResult<T> = Result<T, HlError>;

/// Coarse classification of a failure, independent of the crate that raised it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HlError {
    /// A computation produced NaN or infinity.
    #[error("{what} is not finite ({value})")]
    NonFinite { what: &'static str, value: f64 },

    /// A caller passed a value the operation cannot accept.
    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A physical or structural invariant failed mid-computation.
    #[error("{what} violated")]
    Invariant { what: &'static str },
}
