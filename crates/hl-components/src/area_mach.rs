//! Area/Mach matching stage.
//!
//! Re-solves the static state of a flow station for a new exit Mach number
//! or a new exit area. Totals, composition, mass flow and FAR pass through
//! untouched.

use crate::common::{check_mach, check_positive};
use crate::error::{ComponentError, ComponentResult};
use crate::flow::{FlowState, FlowStationConfig, MachBranch, statics_from_area, statics_from_mach};
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Area, m2};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const INPUTS: &[PortSpec] = &[PortSpec::flow("flow_in")];
const OUTPUTS: &[PortSpec] = &[
    PortSpec::flow("flow_out"),
    PortSpec::scalar("area_resid", Dimension::Area),
    PortSpec::scalar("ps_out", Dimension::Pressure),
];

/// How a stage fixes its exit statics: `"MN"` or `"area"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SolveMode {
    #[default]
    Mach,
    Area,
}

impl SolveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveMode::Mach => "MN",
            SolveMode::Area => "area",
        }
    }
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolveMode {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MN" => Ok(SolveMode::Mach),
            "area" => Ok(SolveMode::Area),
            other => Err(ComponentError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SolveMode {
    type Error = ComponentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SolveMode> for String {
    fn from(mode: SolveMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Exit condition of an area/Mach stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaticTarget {
    /// Exit Mach number set directly.
    Mach(f64),
    /// Exit area; `shock` forces the subsonic root.
    Area { area: Area, shock: bool },
}

/// Result of one area/Mach match.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaMatch {
    pub flow: FlowState,
    /// `area_out - area_target`; zero in Mach mode
    pub area_resid: Area,
}

/// Stage that sets a flow station's statics from a Mach or area target.
///
/// In area mode the exit Mach is bisected on the subsonic bracket when the
/// inbound station is subsonic or `shock` is set, on the supersonic bracket
/// otherwise. An inbound station without statics uses `without_statics`.
#[derive(Clone, Debug)]
pub struct AreaMachSolver {
    pub name: String,
    pub target: StaticTarget,
    pub without_statics: MachBranch,
    pub station: FlowStationConfig,
}

impl AreaMachSolver {
    /// Mach-mode stage.
    pub fn mach(name: impl Into<String>, mach: f64) -> ComponentResult<Self> {
        check_mach(mach, "target Mach number")?;
        Ok(Self::with_target(name, StaticTarget::Mach(mach)))
    }

    /// Area-mode stage.
    pub fn area(name: impl Into<String>, area: Area, shock: bool) -> ComponentResult<Self> {
        check_positive(area.value, "target area")?;
        Ok(Self::with_target(name, StaticTarget::Area { area, shock }))
    }

    /// Stage from a mode and both candidate targets; only the selected one is used.
    pub fn from_mode(
        name: impl Into<String>,
        mode: SolveMode,
        mach: f64,
        area: Area,
        shock: bool,
    ) -> ComponentResult<Self> {
        match mode {
            SolveMode::Mach => Self::mach(name, mach),
            SolveMode::Area => Self::area(name, area, shock),
        }
    }

    fn with_target(name: impl Into<String>, target: StaticTarget) -> Self {
        Self {
            name: name.into(),
            target,
            without_statics: MachBranch::Subsonic,
            station: FlowStationConfig::default(),
        }
    }

    pub fn with_station_config(mut self, station: FlowStationConfig) -> Self {
        self.station = station;
        self
    }

    pub fn with_branch_without_statics(mut self, branch: MachBranch) -> Self {
        self.without_statics = branch;
        self
    }

    pub fn mode(&self) -> SolveMode {
        match self.target {
            StaticTarget::Mach(_) => SolveMode::Mach,
            StaticTarget::Area { .. } => SolveMode::Area,
        }
    }

    /// Match the inbound station to the target.
    pub fn solve(&self, fluid: &dyn FluidModel, inbound: &FlowState) -> ComponentResult<AreaMatch> {
        let total = &inbound.total;
        let (stat, area_resid) = match self.target {
            StaticTarget::Mach(mach) => {
                let stat = statics_from_mach(fluid, total, inbound.w, mach, &self.station.statics)?;
                (stat, 0.0)
            }
            StaticTarget::Area { area, shock } => {
                let branch = MachBranch::for_inbound(inbound, shock, self.without_statics);
                let stat =
                    statics_from_area(fluid, total, inbound.w, area, branch, &self.station)?;
                let resid = stat.area.value - area.value;
                (stat, resid)
            }
        };
        debug!(
            stage = %self.name,
            mode = %self.mode(),
            mach = stat.mach,
            area = stat.area.value,
            "area/Mach match"
        );

        let flow = FlowState {
            total: inbound.total.clone(),
            stat: Some(stat),
            w: inbound.w,
            far: inbound.far,
        };
        Ok(AreaMatch {
            flow,
            area_resid: m2(area_resid),
        })
    }
}

impl Stage for AreaMachSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &'static [PortSpec] {
        INPUTS
    }

    fn outputs(&self) -> &'static [PortSpec] {
        OUTPUTS
    }

    fn evaluate(&self, fluid: &dyn FluidModel, inputs: &[Signal]) -> ComponentResult<Vec<Signal>> {
        let inbound = input_at(inputs, 0, "flow_in")?.as_flow("flow_in")?;
        let matched = self.solve(fluid, inbound)?;
        let stat = matched.flow.require_statics("area/Mach exit")?;
        let ps = stat.pressure;
        Ok(vec![
            Signal::Flow(matched.flow),
            Signal::Area(matched.area_resid),
            Signal::Pressure(ps),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{StaticSolveConfig, TotalState};
    use hl_core::units::{k, kgps, pa};
    use hl_fluids::{Composition, IdealGasModel};
    use proptest::prelude::*;

    fn inbound(fluid: &IdealGasModel) -> FlowState {
        let total =
            TotalState::from_pt(fluid, &Composition::air(), pa(120_000.0), k(300.0)).unwrap();
        FlowState::total_only(total, kgps(1.5)).with_far(0.01)
    }

    #[test]
    fn mode_names() {
        assert_eq!("MN".parse::<SolveMode>().unwrap(), SolveMode::Mach);
        assert_eq!("area".parse::<SolveMode>().unwrap(), SolveMode::Area);
        let err = "Area".parse::<SolveMode>().unwrap_err();
        assert!(matches!(err, ComponentError::InvalidMode { ref mode } if mode == "Area"));
        assert_eq!(SolveMode::Area.to_string(), "area");
    }

    #[test]
    fn mach_mode_passes_totals_through() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let stage = AreaMachSolver::mach("funnel", 0.6).unwrap();
        let out = stage.solve(&fluid, &flow).unwrap();

        assert_eq!(out.flow.total, flow.total);
        assert_eq!(out.flow.w, flow.w);
        assert_eq!(out.flow.far, 0.01);
        assert_eq!(out.flow.mach(), Some(0.6));
        assert_eq!(out.area_resid.value, 0.0);
    }

    #[test]
    fn area_mode_hits_target_and_is_idempotent() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let target = m2(0.01);
        let stage = AreaMachSolver::area("diffuser", target, false).unwrap();

        let first = stage.solve(&fluid, &flow).unwrap();
        let area = first.flow.area().unwrap().value;
        assert!((area - 0.01).abs() < 1e-8);
        assert!(first.area_resid.value.abs() < 1e-8);
        assert!(first.flow.mach().unwrap() < 1.0);

        let second = stage.solve(&fluid, &first.flow).unwrap();
        assert!((second.flow.mach().unwrap() - first.flow.mach().unwrap()).abs() < 1e-8);
        assert_eq!(second.flow.total, first.flow.total);
    }

    #[test]
    fn configured_supersonic_branch_without_statics() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let stage = AreaMachSolver::area("nozzle_exit", m2(0.01), false)
            .unwrap()
            .with_branch_without_statics(MachBranch::Supersonic);
        let out = stage.solve(&fluid, &flow).unwrap();
        assert!(out.flow.mach().unwrap() > 1.0);

        let shocked = AreaMachSolver::area("nozzle_exit", m2(0.01), true)
            .unwrap()
            .with_branch_without_statics(MachBranch::Supersonic);
        assert!(shocked.solve(&fluid, &flow).unwrap().flow.mach().unwrap() < 1.0);
    }

    #[test]
    fn unreachable_area_fails_to_converge() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let stage = AreaMachSolver::area("throat", m2(1e-4), false).unwrap();
        let err = stage.solve(&fluid, &flow).unwrap_err();
        assert!(err.is_convergence(), "{err}");
    }

    #[test]
    fn stage_outputs_match_ports() {
        let fluid = IdealGasModel::new();
        let stage = AreaMachSolver::mach("funnel", 0.6).unwrap();
        let out = stage
            .evaluate(&fluid, &[Signal::Flow(inbound(&fluid))])
            .unwrap();
        assert_eq!(out.len(), stage.outputs().len());
        for (signal, spec) in out.iter().zip(stage.outputs()) {
            assert_eq!(signal.kind(), spec.kind);
        }
    }

    /// Area of the station at `mach`, then back to Mach through an area-mode solve.
    fn recover_mach(pt: f64, tt: f64, w: f64, mach: f64, branch: MachBranch) -> f64 {
        let fluid = IdealGasModel::new();
        let total = TotalState::from_pt(&fluid, &Composition::air(), pa(pt), k(tt)).unwrap();
        let target = statics_from_mach(&fluid, &total, kgps(w), mach, &StaticSolveConfig::default())
            .unwrap()
            .area;
        let stage = AreaMachSolver::area("station", target, false)
            .unwrap()
            .with_branch_without_statics(branch);

        let first = stage
            .solve(&fluid, &FlowState::total_only(total, kgps(w)))
            .unwrap();
        let area = first.flow.area().unwrap().value;
        assert!(
            ((area - target.value) / target.value).abs() < 1e-7,
            "area {area} vs {}",
            target.value
        );

        let again = stage.solve(&fluid, &first.flow).unwrap();
        let (before, after) = (first.flow.mach().unwrap(), again.flow.mach().unwrap());
        assert!((before - after).abs() < 1e-9 * before, "{before} then {after}");
        before
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn area_from_subsonic_mach_is_recovered(
            pt in 1.0e3f64..2.0e5,
            tt in 250.0f64..600.0,
            w in 0.1f64..5.0,
            mach in 0.05f64..0.95,
        ) {
            let found = recover_mach(pt, tt, w, mach, MachBranch::Subsonic);
            prop_assert!((found - mach).abs() < 1e-6, "{found} vs {mach}");
        }

        #[test]
        fn area_from_supersonic_mach_is_recovered(
            pt in 1.0e3f64..2.0e5,
            tt in 250.0f64..600.0,
            w in 0.1f64..5.0,
            mach in 1.05f64..10.0,
        ) {
            let found = recover_mach(pt, tt, w, mach, MachBranch::Supersonic);
            prop_assert!((found - mach).abs() < 1e-6 * mach, "{found} vs {mach}");
        }
    }
}
