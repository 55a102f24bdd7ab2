//! Flow stations and the compressible relations between total and static state.
//!
//! Every stage converts between total and static properties through the
//! functions in this module, so the relations live in exactly one place:
//!
//! ```text
//! s_static = s_total
//! h_total  = h_static + V^2 / 2,   V = M * a(P_s, s)
//! A        = W / (rho_s * V)
//! ```
//!
//! Static pressure for a given Mach number is found by secant iteration on
//! `ln P_s`; Mach for a given area by bisection on a configurable bracket.

use crate::common::{check_finite, check_mach, check_positive};
use crate::error::{ComponentError, ComponentResult};
use hl_core::units::{
    Area, Density, MassRate, Pressure, Temperature, Velocity, VolumeRate, m2, m3ps, mps, pa,
};
use hl_fluids::{Composition, FluidModel, GasState, SpecEnthalpy, SpecEntropy, StateInput};
use hl_solver::{BisectConfig, SecantConfig, bisect, secant};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Stagnation properties of a flow station.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalState {
    pub composition: Composition,
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub h: SpecEnthalpy,
    pub s: SpecEntropy,
    pub density: Density,
    /// Specific heat at constant pressure [J/(kg·K)]
    pub cp: f64,
    pub gamma: f64,
}

impl TotalState {
    /// Fix the total state from any supported property pair.
    pub fn from_input(
        fluid: &dyn FluidModel,
        composition: &Composition,
        input: StateInput,
    ) -> ComponentResult<Self> {
        let gas = fluid.resolve(composition, input)?;
        Ok(Self {
            composition: composition.clone(),
            pressure: gas.pressure,
            temperature: gas.temperature,
            h: gas.h,
            s: gas.s,
            density: gas.density,
            cp: gas.cp,
            gamma: gas.gamma,
        })
    }

    pub fn from_pt(
        fluid: &dyn FluidModel,
        composition: &Composition,
        p: Pressure,
        t: Temperature,
    ) -> ComponentResult<Self> {
        Self::from_input(fluid, composition, StateInput::PT { p, t })
    }

    pub fn from_ps(
        fluid: &dyn FluidModel,
        composition: &Composition,
        p: Pressure,
        s: SpecEntropy,
    ) -> ComponentResult<Self> {
        Self::from_input(fluid, composition, StateInput::PS { p, s })
    }

    pub fn from_ph(
        fluid: &dyn FluidModel,
        composition: &Composition,
        p: Pressure,
        h: SpecEnthalpy,
    ) -> ComponentResult<Self> {
        Self::from_input(fluid, composition, StateInput::PH { p, h })
    }

    pub fn from_hs(
        fluid: &dyn FluidModel,
        composition: &Composition,
        h: SpecEnthalpy,
        s: SpecEntropy,
    ) -> ComponentResult<Self> {
        Self::from_input(fluid, composition, StateInput::HS { h, s })
    }
}

/// Static properties of a flow station at one Mach number.
///
/// Static entropy is the total entropy and is not stored twice.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub h: SpecEnthalpy,
    pub density: Density,
    pub velocity: Velocity,
    pub speed_of_sound: Velocity,
    pub mach: f64,
    pub area: Area,
    pub gamma: f64,
}

/// A complete flow station: total state, optional statics, mass flow, FAR.
///
/// Compressors emit total-only stations; the following area/Mach stage adds
/// statics. Stations are never mutated after a stage returns them.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub total: TotalState,
    pub stat: Option<StaticState>,
    pub w: MassRate,
    /// Fuel-air ratio, carried through unchanged
    pub far: f64,
}

impl FlowState {
    /// Station with totals only.
    pub fn total_only(total: TotalState, w: MassRate) -> Self {
        Self {
            total,
            stat: None,
            w,
            far: 0.0,
        }
    }

    /// Station with totals and statics.
    pub fn with_statics(total: TotalState, stat: StaticState, w: MassRate) -> Self {
        Self {
            total,
            stat: Some(stat),
            w,
            far: 0.0,
        }
    }

    pub fn with_far(mut self, far: f64) -> Self {
        self.far = far;
        self
    }

    pub fn composition(&self) -> &Composition {
        &self.total.composition
    }

    pub fn statics(&self) -> Option<&StaticState> {
        self.stat.as_ref()
    }

    /// Statics or a `MissingStatics` error naming the consumer.
    pub fn require_statics(&self, what: &'static str) -> ComponentResult<&StaticState> {
        self.stat
            .as_ref()
            .ok_or(ComponentError::MissingStatics { what })
    }

    pub fn mach(&self) -> Option<f64> {
        self.stat.as_ref().map(|s| s.mach)
    }

    pub fn area(&self) -> Option<Area> {
        self.stat.as_ref().map(|s| s.area)
    }

    /// Volumetric flow at static density, `W / rho_s`.
    pub fn volumetric_flow(&self) -> Option<VolumeRate> {
        self.stat
            .as_ref()
            .map(|s| m3ps(self.w.value / s.density.value))
    }
}

/// Which side of the sonic point an area match looks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachBranch {
    #[default]
    Subsonic,
    Supersonic,
}

impl MachBranch {
    /// Branch for an area match downstream of `inbound`.
    ///
    /// A shock forces the subsonic branch; an inbound station without statics
    /// uses `without_statics`.
    pub fn for_inbound(inbound: &FlowState, shock: bool, without_statics: MachBranch) -> Self {
        if shock {
            return MachBranch::Subsonic;
        }
        match inbound.mach() {
            Some(mach) if mach < 1.0 => MachBranch::Subsonic,
            Some(_) => MachBranch::Supersonic,
            None => without_statics,
        }
    }
}

/// Secant settings for the static-pressure solve at fixed Mach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSolveConfig {
    pub max_iterations: usize,
    /// Tolerance on the normalized energy residual and on the `ln P_s` step
    pub tol: f64,
    /// Largest `ln P_s` step per iteration
    pub max_step: f64,
}

impl Default for StaticSolveConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tol: 1e-10,
            max_step: 0.5,
        }
    }
}

/// Mach brackets for area matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketConfig {
    pub subsonic_lo: f64,
    pub subsonic_hi: f64,
    pub supersonic_lo: f64,
    pub supersonic_hi: f64,
    pub max_iterations: usize,
    /// Bracket half-width at convergence
    pub x_tol: f64,
    /// Relative area error accepted as a root
    pub f_tol: f64,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            subsonic_lo: 1e-4,
            subsonic_hi: 1.0,
            supersonic_lo: 1.0,
            supersonic_hi: 50.0,
            max_iterations: 100,
            x_tol: 1e-12,
            f_tol: 1e-12,
        }
    }
}

impl BracketConfig {
    pub fn range(&self, branch: MachBranch) -> (f64, f64) {
        match branch {
            MachBranch::Subsonic => (self.subsonic_lo, self.subsonic_hi),
            MachBranch::Supersonic => (self.supersonic_lo, self.supersonic_hi),
        }
    }

    fn bisect_config(&self) -> BisectConfig {
        BisectConfig {
            max_iterations: self.max_iterations,
            x_tol: self.x_tol,
            f_tol: self.f_tol,
        }
    }
}

/// Solver knobs shared by every flow-station conversion a stage performs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowStationConfig {
    pub statics: StaticSolveConfig,
    pub bracket: BracketConfig,
}

/// Flow area `W / (rho_s * V)`.
pub fn flow_area(w: MassRate, density: Density, velocity: Velocity) -> ComponentResult<Area> {
    let rho_v = density.value * velocity.value;
    if rho_v <= 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "mass flux must be positive",
        });
    }
    let area = check_finite(w.value / rho_v, "flow area")?;
    Ok(m2(area))
}

fn static_state(
    gas: &GasState,
    w: MassRate,
    mach: f64,
    velocity: f64,
) -> ComponentResult<StaticState> {
    let velocity = mps(velocity);
    Ok(StaticState {
        pressure: gas.pressure,
        temperature: gas.temperature,
        h: gas.h,
        density: gas.density,
        velocity,
        speed_of_sound: gas.speed_of_sound,
        mach,
        area: flow_area(w, gas.density, velocity)?,
        gamma: gas.gamma,
    })
}

fn isentrope(
    fluid: &dyn FluidModel,
    total: &TotalState,
    ln_ps: f64,
) -> ComponentResult<GasState> {
    let gas = fluid.resolve(
        &total.composition,
        StateInput::PS {
            p: pa(ln_ps.exp()),
            s: total.s,
        },
    )?;
    Ok(gas)
}

/// Static state at Mach `mach` on the isentrope of `total`.
pub fn statics_from_mach(
    fluid: &dyn FluidModel,
    total: &TotalState,
    w: MassRate,
    mach: f64,
    config: &StaticSolveConfig,
) -> ComponentResult<StaticState> {
    let mach = check_mach(mach, "Mach number")?;
    let scale = check_positive(total.cp * total.temperature.value, "total cp*T")?;

    // Constant-gamma estimate as the starting point
    let g = total.gamma;
    let guess = total.pressure.value * (1.0 + 0.5 * (g - 1.0) * mach * mach).powf(-g / (g - 1.0));
    let x0 = check_finite(guess.ln(), "static pressure estimate")?;

    let residual = |ln_ps: f64| -> ComponentResult<f64> {
        let gas = isentrope(fluid, total, ln_ps)?;
        let v = mach * gas.speed_of_sound.value;
        Ok((total.h - gas.h - 0.5 * v * v) / scale)
    };

    let secant_config = SecantConfig {
        max_iterations: config.max_iterations,
        x_tol: config.tol,
        f_tol: config.tol,
        max_step: config.max_step,
    };
    let root = secant(residual, x0, x0 - 0.01, &secant_config)
        .map_err(|e: ComponentError| e.in_solve("static pressure at Mach"))?;
    trace!(mach, iterations = root.iterations, "statics from Mach");

    let gas = isentrope(fluid, total, root.x)?;
    let velocity = mach * gas.speed_of_sound.value;
    static_state(&gas, w, mach, velocity)
}

/// Static state whose flow area is `area`, on the requested side of sonic.
///
/// Bisects `(A(M) - A) / A` on the branch's bracket. A target below the
/// sonic area has no root on either branch and fails with `Convergence`.
pub fn statics_from_area(
    fluid: &dyn FluidModel,
    total: &TotalState,
    w: MassRate,
    area: Area,
    branch: MachBranch,
    config: &FlowStationConfig,
) -> ComponentResult<StaticState> {
    let target = check_positive(area.value, "target area")?;
    let (lo, hi) = config.bracket.range(branch);

    let residual = |mach: f64| -> ComponentResult<f64> {
        let stat = statics_from_mach(fluid, total, w, mach, &config.statics)?;
        Ok((stat.area.value - target) / target)
    };
    let root = bisect(residual, lo, hi, &config.bracket.bisect_config())
        .map_err(|e: ComponentError| e.in_solve("Mach for target area"))?;
    trace!(
        mach = root.x,
        iterations = root.iterations,
        ?branch,
        "statics from area"
    );

    statics_from_mach(fluid, total, w, root.x, &config.statics)
}

/// Static state at a given static pressure on the isentrope of `total`.
pub fn statics_from_ps(
    fluid: &dyn FluidModel,
    total: &TotalState,
    w: MassRate,
    ps: Pressure,
) -> ComponentResult<StaticState> {
    let ps_val = check_positive(ps.value, "static pressure")?;
    if ps_val >= total.pressure.value {
        return Err(ComponentError::InvalidArg {
            what: "static pressure must be below total pressure",
        });
    }
    let gas = isentrope(fluid, total, ps_val.ln())?;
    let dh = total.h - gas.h;
    if dh <= 0.0 {
        return Err(ComponentError::NonPhysical {
            what: "static enthalpy above total enthalpy",
        });
    }
    let velocity = (2.0 * dh).sqrt();
    let mach = velocity / gas.speed_of_sound.value;
    static_state(&gas, w, mach, velocity)
}
