//! Common utilities for stage calculations.

use crate::error::{ComponentError, ComponentResult};
use hl_core::numeric::ensure_finite;

/// Smallest Mach number a stage will accept as a target.
pub const MIN_MACH: f64 = 1e-6;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Ensure a value is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v <= 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(v)
}

/// Ensure a fraction-like parameter lies in (0, 1].
pub fn check_unit_interval(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v <= 0.0 || v > 1.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(v)
}

/// Ensure a Mach target is usable.
pub fn check_mach(value: f64, what: &'static str) -> ComponentResult<f64> {
    let v = check_finite(value, what)?;
    if v < MIN_MACH {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(v)
}
