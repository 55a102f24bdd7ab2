//! Tube approach flow, external bypass flow and the Kantrowitz limit.

use crate::error::{CycleError, CycleResult};
use hl_components::{
    ComponentError, FlowStart, FlowState, SplitTargets, StaticSolveConfig, WeightFlowSplitter,
    statics_from_mach,
};
use hl_core::units::{Area, MassRate, Pressure, Temperature, k, kgps, m2, pa};
use hl_fluids::{Composition, FluidModel};
use hl_solver::{SecantConfig, secant};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Ambient static conditions in the tube.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeConditions {
    pub ps: Pressure,
    pub ts: Temperature,
    pub composition: Composition,
}

impl TubeConditions {
    pub fn new(ps: Pressure, ts: Temperature) -> Self {
        Self {
            ps,
            ts,
            composition: Composition::air(),
        }
    }

    /// Tube air seen from a pod at `pod_mach`, captured through `area`.
    pub fn approach_flow(
        &self,
        fluid: &dyn FluidModel,
        pod_mach: f64,
        area: Area,
    ) -> CycleResult<FlowState> {
        let start = FlowStart::new(
            "tube",
            self.ps,
            self.ts,
            pod_mach,
            area,
            self.composition.clone(),
        )?;
        Ok(start.flow(fluid)?)
    }
}

/// Air passing around the pod outside the inlet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BypassFlow {
    pub mach: f64,
    pub area: Area,
    /// Largest share of the approach flow the bypass may carry
    pub percent_into_bypass: f64,
}

impl BypassFlow {
    pub fn new(mach: f64, area: Area) -> Self {
        Self {
            mach,
            area,
            percent_into_bypass: 1.0 - 1e-4,
        }
    }

    /// Bypass mass flow, capped by the approach flow.
    ///
    /// ```text
    /// W = min(rho * V * A_bypass, W_total * percent)
    /// ```
    pub fn w_bypass(&self, fluid: &dyn FluidModel, approach: &FlowState) -> CycleResult<MassRate> {
        let stat = statics_from_mach(
            fluid,
            &approach.total,
            approach.w,
            self.mach,
            &StaticSolveConfig::default(),
        )?;
        let passing = stat.density.value * stat.velocity.value * self.area.value;
        Ok(kgps(passing.min(approach.w.value * self.percent_into_bypass)))
    }

    /// Split the approach flow into `(bypass, pod inflow)`.
    ///
    /// The bypass branch leaves at the bypass Mach; the pod keeps the
    /// approach Mach and carries the rest of the mass flow.
    pub fn divide(
        &self,
        fluid: &dyn FluidModel,
        approach: &FlowState,
    ) -> CycleResult<(FlowState, FlowState)> {
        let pod_mach = approach.mach().ok_or_else(|| CycleError::Invariant {
            what: "approach flow has no static state".to_string(),
        })?;
        let w_bypass = self.w_bypass(fluid, approach)?;
        let splitter = WeightFlowSplitter::new(
            "bypass",
            w_bypass,
            SplitTargets::Mach {
                mach1: self.mach,
                mach2: pod_mach,
            },
        )?;
        let (bypass, pod) = splitter.split(fluid, approach)?;
        debug!(
            w_bypass = bypass.w.value,
            w_pod = pod.w.value,
            "bypass split"
        );
        Ok((bypass, pod))
    }
}

/// Tube/pod geometry and conditions for the Kantrowitz limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KantrowitzLimit {
    /// [m]
    pub tube_radius: f64,
    /// Inlet radius at its largest point [m]
    pub inlet_radius: f64,
    /// Tube static pressure [Pa]
    pub ps: f64,
    /// Tube static temperature [K]
    pub ts: f64,
    pub pod_mach: f64,
    /// Mach of the air passing around the pod
    pub bypass_mach: f64,
    pub secant: SecantConfig,
}

impl Default for KantrowitzLimit {
    fn default() -> Self {
        Self {
            tube_radius: 1.115,
            inlet_radius: 0.737,
            ps: 99.0,
            ts: 292.1,
            pod_mach: 1.0,
            bypass_mach: 0.95,
            secant: SecantConfig {
                max_iterations: 50,
                x_tol: 1e-10,
                f_tol: 1e-10,
                max_step: 0.1,
            },
        }
    }
}

/// Choking speed and tube flows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KantrowitzReport {
    /// Pod Mach at which the bypass chokes
    pub limit_mach: f64,
    /// [m/s]
    pub limit_velocity: f64,
    /// Flow the pod sweeps at `pod_mach` [kg/s]
    pub w_tube: f64,
    /// Flow the bypass passes at `bypass_mach` [kg/s]
    pub w_kant: f64,
    pub w_excess: f64,
    pub tube_area: f64,
    pub inlet_area: f64,
    pub bypass_area: f64,
}

impl KantrowitzLimit {
    pub fn tube(&self) -> TubeConditions {
        TubeConditions::new(pa(self.ps), k(self.ts))
    }

    pub fn solve(&self, fluid: &dyn FluidModel) -> CycleResult<KantrowitzReport> {
        let tube_area = PI * self.tube_radius.powi(2);
        let inlet_area = PI * self.inlet_radius.powi(2);
        let bypass_area = tube_area - inlet_area;
        if bypass_area <= 0.0 || !bypass_area.is_finite() {
            return Err(CycleError::InvalidDesign {
                field: "inlet_radius".to_string(),
                value: self.inlet_radius,
                reason: "must be smaller than the tube radius",
            });
        }
        let tube = self.tube();
        let target = tube_area / bypass_area;

        // Isentropic A/A* at the tube's total gamma
        let area_ratio = |mach: f64| -> CycleResult<f64> {
            let flow = tube.approach_flow(fluid, mach, m2(tube_area))?;
            let g = flow.total.gamma;
            let g_exp = (g + 1.0) / (2.0 * (g - 1.0));
            let ar = ((g + 1.0) / 2.0).powf(-g_exp)
                * (1.0 + (g - 1.0) / 2.0 * mach * mach).powf(g_exp)
                / mach;
            Ok(ar - target)
        };
        let root = secant(area_ratio, 0.3, 0.31, &self.secant).map_err(|e| match e {
            CycleError::Solver(source) if source.is_convergence() => {
                CycleError::Component(ComponentError::Convergence {
                    what: "Kantrowitz limit Mach",
                    source,
                })
            }
            other => other,
        })?;
        let limit_mach = root.x;

        let limit = tube.approach_flow(fluid, limit_mach, m2(tube_area))?;
        let limit_velocity = limit
            .statics()
            .map(|s| s.velocity.value)
            .unwrap_or_default();

        let pod = tube.approach_flow(fluid, self.pod_mach, m2(tube_area))?;
        let bypass = statics_from_mach(
            fluid,
            &pod.total,
            pod.w,
            self.bypass_mach,
            &StaticSolveConfig::default(),
        )?;
        let w_tube = pod.w.value;
        let w_kant = bypass.density.value * bypass.velocity.value * bypass_area;

        debug!(
            limit_mach,
            limit_velocity,
            iterations = root.iterations,
            w_tube,
            w_kant,
            "kantrowitz limit"
        );
        Ok(KantrowitzReport {
            limit_mach,
            limit_velocity,
            w_tube,
            w_kant,
            w_excess: w_tube - w_kant,
            tube_area,
            inlet_area,
            bypass_area,
        })
    }
}
