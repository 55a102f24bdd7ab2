//! Finiteness checks shared by every crate.

use crate::error::HlError;

/// Pass `v` through if it is finite.
pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, HlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HlError::NonFinite { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn non_finite_names_the_quantity() {
        let err = ensure_finite(f64::INFINITY, "static pressure").unwrap_err();
        assert!(err.to_string().contains("static pressure"));
        assert!(ensure_finite(f64::NAN, "area").is_err());
    }

    proptest! {
        #[test]
        fn finite_values_pass_unchanged(v in prop::num::f64::NORMAL | prop::num::f64::ZERO) {
            prop_assert_eq!(ensure_finite(v, "v"), Ok(v));
        }
    }
}
