//! Thermally perfect ideal-gas mixture backend.
//!
//! Each species follows its NASA 7-term fit; the mixture adds ideal mixing
//! entropy. Pressure enters only through `p = ρRT` and the `-R ln(p/p_ref)`
//! entropy term, so every inverse solve reduces to a 1-D temperature solve.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{FluidModel, GasState, check};
use crate::state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, ThermoState};
use hl_core::units::constants::{P_REF_PA, R_UNIVERSAL};
use hl_core::units::{Density, Velocity, k, kgpm3, mps, pa};

/// Molar-basis mixture sums at one temperature.
struct MixtureTerms {
    /// Molar mass [kg/kmol]
    molar_mass: f64,
    /// cp [J/(kmol·K)]
    cp: f64,
    /// h [J/kmol]
    h: f64,
    /// s at the reference pressure, mixing included [J/(kmol·K)]
    s_ref: f64,
}

impl MixtureTerms {
    fn at(comp: &Composition, t: f64) -> Self {
        let mut terms = Self {
            molar_mass: 0.0,
            cp: 0.0,
            h: 0.0,
            s_ref: 0.0,
        };
        for (species, x) in comp.iter() {
            let fit = species.nasa();
            terms.molar_mass += x * species.molar_mass();
            terms.cp += x * fit.cp_r(t) * R_UNIVERSAL;
            terms.h += x * fit.h_rt(t) * R_UNIVERSAL * t;
            terms.s_ref += x * (fit.s_r(t) - x.ln()) * R_UNIVERSAL;
        }
        terms
    }

    fn gas_constant(&self) -> f64 {
        R_UNIVERSAL / self.molar_mass
    }

    fn cp_mass(&self) -> f64 {
        self.cp / self.molar_mass
    }

    fn h_mass(&self) -> f64 {
        self.h / self.molar_mass
    }

    /// cp / (cp - R); thermally perfect gases never drop below 1.
    fn gamma(&self) -> FluidResult<f64> {
        let cp = self.cp_mass();
        check::at_least(cp / (cp - self.gas_constant()), 1.0, "gamma must be >= 1 and finite")
    }

    fn s_mass(&self, p_pa: f64) -> f64 {
        self.s_ref / self.molar_mass - self.gas_constant() * (p_pa / P_REF_PA).ln()
    }
}

/// Ideal-gas mixture property oracle.
#[derive(Debug, Clone)]
pub struct IdealGasModel {
    /// Lower temperature bound for inverse solves [K].
    pub t_min: f64,
    /// Upper temperature bound for inverse solves [K].
    pub t_max: f64,
    /// Iteration cap for inverse temperature solves.
    pub max_iterations: usize,
    /// Relative temperature step at which an inverse solve is converged.
    pub rel_tol: f64,
}

impl Default for IdealGasModel {
    fn default() -> Self {
        Self {
            t_min: 1.0e-2,
            t_max: 6_000.0,
            max_iterations: 100,
            rel_tol: 1.0e-11,
        }
    }
}

impl IdealGasModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mixture gas constant R = Ru / M [J/(kg·K)].
    pub fn gas_constant(&self, comp: &Composition) -> f64 {
        R_UNIVERSAL / comp.molar_mass()
    }

    fn clamp_t(&self, t: f64) -> f64 {
        t.clamp(self.t_min, self.t_max)
    }

    /// A solve that stalls on a window bound has not found the target.
    fn check_pinned(&self, t: f64, step: f64) -> FluidResult<f64> {
        let pinned = t <= self.t_min || t >= self.t_max;
        if pinned && step.abs() > self.rel_tol * t.max(1.0) {
            return Err(FluidError::OutOfRange {
                what: "temperature solve left the polynomial fit window",
            });
        }
        Ok(t)
    }

    /// Newton on T: h(T) - h = 0, dh/dT = cp.
    fn temperature_from_h(&self, comp: &Composition, h: SpecEnthalpy) -> FluidResult<f64> {
        check::finite(h, "enthalpy must be finite")?;
        let mut t = 300.0;
        let mut residual = f64::INFINITY;
        for _ in 0..self.max_iterations {
            let terms = MixtureTerms::at(comp, t);
            residual = terms.h_mass() - h;
            let t_next = self.clamp_t(t - residual / terms.cp_mass());
            if (t_next - t).abs() <= self.rel_tol * t.max(1.0) {
                return self.check_pinned(t_next, residual / terms.cp_mass());
            }
            t = t_next;
        }
        Err(FluidError::ConvergenceFailed {
            what: "temperature from enthalpy",
            iterations: self.max_iterations,
            residual,
        })
    }

    /// Newton on ln T: s(T, p) - s = 0, ds/dlnT = cp.
    fn temperature_from_ps(&self, comp: &Composition, p_pa: f64, s: SpecEntropy) -> FluidResult<f64> {
        check::finite(s, "entropy must be finite")?;
        let ln_min = self.t_min.ln();
        let ln_max = self.t_max.ln();
        let mut ln_t = 300.0_f64.ln();
        let mut residual = f64::INFINITY;
        for _ in 0..self.max_iterations {
            let terms = MixtureTerms::at(comp, ln_t.exp());
            residual = terms.s_mass(p_pa) - s;
            let next = (ln_t - residual / terms.cp_mass()).clamp(ln_min, ln_max);
            if (next - ln_t).abs() <= self.rel_tol {
                return self.check_pinned(next.exp(), residual / terms.cp_mass());
            }
            ln_t = next;
        }
        Err(FluidError::ConvergenceFailed {
            what: "temperature from pressure and entropy",
            iterations: self.max_iterations,
            residual,
        })
    }

    fn terms(&self, state: &ThermoState) -> FluidResult<MixtureTerms> {
        let t = check::within(
            state.temperature().value,
            self.t_min,
            self.t_max,
            "temperature outside polynomial fit window",
        )?;
        Ok(MixtureTerms::at(state.composition(), t))
    }
}

impl FluidModel for IdealGasModel {
    fn name(&self) -> &str {
        "ideal-gas mixture (NASA 7-term)"
    }

    fn supports(&self, comp: &Composition) -> bool {
        comp.iter().next().is_some()
    }

    fn state(&self, input: StateInput, comp: Composition) -> FluidResult<ThermoState> {
        if !self.supports(&comp) {
            return Err(FluidError::NotSupported {
                what: "empty composition",
            });
        }
        match input {
            StateInput::PT { p, t } => ThermoState::from_pt(p, t, comp),
            StateInput::PH { p, h } => {
                check::positive(p.value, "pressure must be positive and finite")?;
                let t = self.temperature_from_h(&comp, h)?;
                ThermoState::from_pt(p, k(t), comp)
            }
            StateInput::PS { p, s } => {
                check::positive(p.value, "pressure must be positive and finite")?;
                let t = self.temperature_from_ps(&comp, p.value, s)?;
                ThermoState::from_pt(p, k(t), comp)
            }
            StateInput::RhoH { rho_kg_m3, h } => {
                check::positive(rho_kg_m3, "density must be positive and finite")?;
                let t = self.temperature_from_h(&comp, h)?;
                let p = rho_kg_m3 * self.gas_constant(&comp) * t;
                ThermoState::from_pt(pa(p), k(t), comp)
            }
            StateInput::HS { h, s } => {
                check::finite(s, "entropy must be finite")?;
                let t = self.temperature_from_h(&comp, h)?;
                let terms = MixtureTerms::at(&comp, t);
                let p = P_REF_PA * ((terms.s_mass(P_REF_PA) - s) / terms.gas_constant()).exp();
                ThermoState::from_pt(pa(p), k(t), comp)
            }
        }
    }

    fn rho(&self, state: &ThermoState) -> FluidResult<Density> {
        let terms = self.terms(state)?;
        let rho = state.pressure().value / (terms.gas_constant() * state.temperature().value);
        Ok(kgpm3(check::positive(rho, "density must be positive and finite")?))
    }

    fn h(&self, state: &ThermoState) -> FluidResult<SpecEnthalpy> {
        Ok(self.terms(state)?.h_mass())
    }

    fn s(&self, state: &ThermoState) -> FluidResult<SpecEntropy> {
        Ok(self.terms(state)?.s_mass(state.pressure().value))
    }

    fn cp(&self, state: &ThermoState) -> FluidResult<SpecHeatCapacity> {
        check::positive(self.terms(state)?.cp_mass(), "cp must be positive and finite")
    }

    fn gamma(&self, state: &ThermoState) -> FluidResult<f64> {
        self.terms(state)?.gamma()
    }

    fn a(&self, state: &ThermoState) -> FluidResult<Velocity> {
        let terms = self.terms(state)?;
        let a2 = terms.gamma()? * terms.gas_constant() * state.temperature().value;
        Ok(mps(check::positive(a2.sqrt(), "speed of sound must be positive")?))
    }

    fn properties(&self, state: &ThermoState) -> FluidResult<GasState> {
        let terms = self.terms(state)?;
        let (p, t) = (state.pressure(), state.temperature());
        let r = terms.gas_constant();
        let cp = check::positive(terms.cp_mass(), "cp must be positive and finite")?;
        let gamma = terms.gamma()?;
        let rho = check::positive(p.value / (r * t.value), "density must be positive and finite")?;
        let a = check::positive((gamma * r * t.value).sqrt(), "speed of sound must be positive")?;

        Ok(GasState {
            pressure: p,
            temperature: t,
            density: kgpm3(rho),
            h: terms.h_mass(),
            s: terms.s_mass(p.value),
            cp,
            cv: cp - r,
            gamma,
            speed_of_sound: mps(a),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;

    fn air_state(p: f64, t: f64) -> ThermoState {
        ThermoState::from_pt(pa(p), k(t), Composition::air()).unwrap()
    }

    #[test]
    fn sea_level_air() {
        let model = IdealGasModel::new();
        let gas = model.properties(&air_state(101_325.0, 288.15)).unwrap();
        assert!((gas.density.value - 1.225).abs() < 2e-3, "{gas}");
        assert!((gas.gamma - 1.40).abs() < 2e-3, "{gas}");
        assert!((gas.speed_of_sound.value - 340.3).abs() < 0.5, "{gas}");
        assert!((gas.cp - 1004.0).abs() < 3.0, "{gas}");
    }

    #[test]
    fn properties_match_individual_calls() {
        let model = IdealGasModel::new();
        let state = air_state(99.0, 292.6);
        let gas = model.properties(&state).unwrap();
        assert_eq!(gas.density, model.rho(&state).unwrap());
        assert_eq!(gas.h, model.h(&state).unwrap());
        assert_eq!(gas.s, model.s(&state).unwrap());
        assert_eq!(gas.cp, model.cp(&state).unwrap());
        assert_eq!(gas.gamma, model.gamma(&state).unwrap());
        assert_eq!(gas.speed_of_sound, model.a(&state).unwrap());
        assert!((gas.cv - model.cv(&state).unwrap()).abs() < 1e-9);
        assert!((gas.cp - gas.cv - model.gas_constant(state.composition())).abs() < 1e-9);
    }

    #[test]
    fn ph_inverts_pt() {
        let model = IdealGasModel::new();
        let state = air_state(5.0e4, 745.0);
        let h = model.h(&state).unwrap();
        let back = model
            .state(StateInput::PH { p: pa(5.0e4), h }, Composition::air())
            .unwrap();
        assert!((back.temperature().value - 745.0).abs() < 1e-8);
    }

    #[test]
    fn ps_inverts_pt_across_the_fit_break() {
        let model = IdealGasModel::new();
        for t in [150.0, 292.6, 999.0, 1001.0, 1800.0] {
            let state = air_state(1.2e5, t);
            let s = model.s(&state).unwrap();
            let back = model
                .state(StateInput::PS { p: pa(1.2e5), s }, Composition::air())
                .unwrap();
            assert!((back.temperature().value - t).abs() < 1e-7 * t, "t = {t}");
        }
    }

    #[test]
    fn hs_recovers_pressure_and_temperature() {
        let model = IdealGasModel::new();
        let state = air_state(1_234.5, 410.0);
        let gas = model.properties(&state).unwrap();
        let back = model
            .state(StateInput::HS { h: gas.h, s: gas.s }, Composition::air())
            .unwrap();
        assert!((back.temperature().value - 410.0).abs() < 1e-8);
        assert!((back.pressure().value - 1_234.5).abs() < 1e-6);
    }

    #[test]
    fn rho_h_recovers_pressure() {
        let model = IdealGasModel::new();
        let state = air_state(8.0e4, 350.0);
        let gas = model.properties(&state).unwrap();
        let back = model
            .state(
                StateInput::RhoH {
                    rho_kg_m3: gas.density.value,
                    h: gas.h,
                },
                Composition::air(),
            )
            .unwrap();
        assert!((back.pressure().value - 8.0e4).abs() < 1e-6);
    }

    #[test]
    fn isentropic_compression_heats_the_gas() {
        let model = IdealGasModel::new();
        let s = model.s(&air_state(1.0e5, 300.0)).unwrap();
        let out = model
            .state(StateInput::PS { p: pa(1.0e6), s }, Composition::air())
            .unwrap();
        // constant-gamma estimate is 579 K; rising cp pulls it down a few kelvin
        let t = out.temperature().value;
        assert!(t > 570.0 && t < 579.0, "t = {t}");
    }

    #[test]
    fn mixing_entropy_is_positive() {
        let model = IdealGasModel::new();
        let n2 = ThermoState::from_pt(pa(1.0e5), k(300.0), Composition::pure(Species::N2)).unwrap();
        let mix = Composition::new_mole_fractions(vec![(Species::N2, 0.5), (Species::Ar, 0.5)]).unwrap();
        let mixed = ThermoState::from_pt(pa(1.0e5), k(300.0), mix).unwrap();
        let ar = ThermoState::from_pt(pa(1.0e5), k(300.0), Composition::pure(Species::Ar)).unwrap();

        let m_n2 = Species::N2.molar_mass();
        let m_ar = Species::Ar.molar_mass();
        let separate = (0.5 * m_n2 * model.s(&n2).unwrap() + 0.5 * m_ar * model.s(&ar).unwrap())
            / (0.5 * m_n2 + 0.5 * m_ar);
        assert!(model.s(&mixed).unwrap() > separate);
    }

    #[test]
    fn rejects_out_of_window_state() {
        let model = IdealGasModel::new();
        let hot = air_state(1.0e5, 9_000.0);
        assert!(matches!(model.h(&hot), Err(FluidError::OutOfRange { .. })));
    }

    #[test]
    fn rejects_non_positive_pressure_in_inverse_solves() {
        let model = IdealGasModel::new();
        let err = model
            .state(StateInput::PS { p: pa(0.0), s: 7000.0 }, Composition::air())
            .unwrap_err();
        assert!(matches!(err, FluidError::NonPhysical { .. }));
    }
}
