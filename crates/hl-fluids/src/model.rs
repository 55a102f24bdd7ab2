//! The gas property oracle.
//!
//! Stages never evaluate thermodynamics themselves: they hand a composition
//! and an independent property pair to a [`FluidModel`] and read back a
//! [`GasState`].

use std::fmt;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, ThermoState};
use hl_core::units::{Density, Pressure, Temperature, Velocity};

/// Every property of one equilibrium state.
#[derive(Clone, Debug, PartialEq)]
pub struct GasState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub density: Density,
    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,
    /// Specific entropy [J/(kg·K)]
    pub s: SpecEntropy,
    /// [J/(kg·K)]
    pub cp: SpecHeatCapacity,
    /// [J/(kg·K)]
    pub cv: SpecHeatCapacity,
    pub gamma: f64,
    pub speed_of_sound: Velocity,
}

impl fmt::Display for GasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P={:.2} Pa T={:.2} K rho={:.4e} h={:.1} s={:.2} gamma={:.4} a={:.1}",
            self.pressure.value,
            self.temperature.value,
            self.density.value,
            self.h,
            self.s,
            self.gamma,
            self.speed_of_sound.value
        )
    }
}

/// A gas property backend.
///
/// Backends hold no mutable state, so one model can be shared by parallel
/// network evaluations.
pub trait FluidModel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backend has data for every species in `comp`.
    fn supports(&self, comp: &Composition) -> bool;

    /// Fix a state from an independent property pair.
    fn state(&self, input: StateInput, comp: Composition) -> FluidResult<ThermoState>;

    fn rho(&self, state: &ThermoState) -> FluidResult<Density>;
    fn h(&self, state: &ThermoState) -> FluidResult<SpecEnthalpy>;
    fn s(&self, state: &ThermoState) -> FluidResult<SpecEntropy>;
    fn cp(&self, state: &ThermoState) -> FluidResult<SpecHeatCapacity>;
    fn gamma(&self, state: &ThermoState) -> FluidResult<f64>;
    fn a(&self, state: &ThermoState) -> FluidResult<Velocity>;

    fn cv(&self, state: &ThermoState) -> FluidResult<SpecHeatCapacity> {
        let gamma = check::at_least(self.gamma(state)?, 1.0, "gamma")?;
        check::positive(self.cp(state)? / gamma, "cv")
    }

    /// All properties of `state`. Backends that share intermediate sums
    /// between properties should override this.
    fn properties(&self, state: &ThermoState) -> FluidResult<GasState> {
        Ok(GasState {
            pressure: state.pressure(),
            temperature: state.temperature(),
            density: self.rho(state)?,
            h: self.h(state)?,
            s: self.s(state)?,
            cp: self.cp(state)?,
            cv: self.cv(state)?,
            gamma: self.gamma(state)?,
            speed_of_sound: self.a(state)?,
        })
    }

    /// Composition plus any property pair to every property.
    fn resolve(&self, comp: &Composition, input: StateInput) -> FluidResult<GasState> {
        if !input.is_finite() {
            return Err(FluidError::InvalidArg {
                what: "state input must be finite",
            });
        }
        if !self.supports(comp) {
            return Err(FluidError::NotSupported {
                what: "composition is not supported by this fluid model",
            });
        }
        let state = self.state(input, comp.clone())?;
        self.properties(&state)
    }
}

/// Range checks that turn bad property values into [`FluidError`]s.
pub(crate) mod check {
    use crate::error::{FluidError, FluidResult};

    pub fn finite(v: f64, what: &'static str) -> FluidResult<f64> {
        if v.is_finite() {
            Ok(v)
        } else {
            Err(FluidError::NonPhysical { what })
        }
    }

    pub fn positive(v: f64, what: &'static str) -> FluidResult<f64> {
        if finite(v, what)? > 0.0 {
            Ok(v)
        } else {
            Err(FluidError::NonPhysical { what })
        }
    }

    pub fn at_least(v: f64, min: f64, what: &'static str) -> FluidResult<f64> {
        if finite(v, what)? >= min {
            Ok(v)
        } else {
            Err(FluidError::NonPhysical { what })
        }
    }

    /// Temperature must sit inside the backend's fit window.
    pub fn within(v: f64, lo: f64, hi: f64, what: &'static str) -> FluidResult<f64> {
        if (lo..=hi).contains(&v) {
            Ok(v)
        } else {
            Err(FluidError::OutOfRange { what })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::check::*;
    use super::*;
    use crate::IdealGasModel;
    use hl_core::units::{k, pa};

    #[test]
    fn range_checks() {
        assert_eq!(positive(101_325.0, "p"), Ok(101_325.0));
        assert!(positive(0.0, "p").is_err());
        assert!(positive(f64::NAN, "p").is_err());
        assert!(at_least(1.0, 1.0, "gamma").is_ok());
        assert!(at_least(0.9, 1.0, "gamma").is_err());
        assert!(finite(-3.0e5, "h").is_ok());
        assert!(finite(f64::INFINITY, "h").is_err());
        assert!(matches!(
            within(7_000.0, 1.0, 6_000.0, "t"),
            Err(FluidError::OutOfRange { what: "t" })
        ));
    }

    #[test]
    fn resolve_pt() {
        let model = IdealGasModel::new();
        let gas = model
            .resolve(
                &Composition::air(),
                StateInput::PT {
                    p: pa(101_325.0),
                    t: k(300.0),
                },
            )
            .unwrap();
        assert!(gas.cp > gas.cv);
        assert!(gas.speed_of_sound.value > 300.0, "{gas}");
    }

    #[test]
    fn every_pair_lands_on_the_same_state() {
        let model = IdealGasModel::new();
        let air = Composition::air();
        let base = model
            .resolve(
                &air,
                StateInput::PT {
                    p: pa(2.0e4),
                    t: k(420.0),
                },
            )
            .unwrap();

        let (h, s, p) = (base.h, base.s, base.pressure);
        let inputs = [
            StateInput::PH { p, h },
            StateInput::PS { p, s },
            StateInput::HS { h, s },
            StateInput::RhoH {
                rho_kg_m3: base.density.value,
                h,
            },
        ];
        for input in inputs {
            let label = input.label();
            let got = model.resolve(&air, input).unwrap();
            assert!((got.temperature.value - 420.0).abs() < 1e-6, "{label}");
            assert!((got.pressure.value - 2.0e4).abs() < 1e-5, "{label}");
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let err = IdealGasModel::new()
            .resolve(
                &Composition::air(),
                StateInput::PT {
                    p: pa(f64::NAN),
                    t: k(300.0),
                },
            )
            .unwrap_err();
        assert!(matches!(err, FluidError::InvalidArg { .. }));
    }
}
