//! Weight-flow splitter.

use crate::area_mach::SolveMode;
use crate::common::{check_finite, check_mach, check_positive};
use crate::error::{ComponentError, ComponentResult};
use crate::flow::{FlowState, FlowStationConfig, MachBranch, statics_from_area, statics_from_mach};
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Area, MassRate, kgps};
use hl_fluids::FluidModel;
use hl_graph::PortSpec;
use tracing::debug;

const INPUTS: &[PortSpec] = &[PortSpec::flow("flow_in")];
const OUTPUTS: &[PortSpec] = &[PortSpec::flow("flow_out1"), PortSpec::flow("flow_out2")];

/// Exit targets of both branches; one mode for the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitTargets {
    Mach { mach1: f64, mach2: f64 },
    Area { area1: Area, area2: Area },
}

/// Splits one stream into a metered branch and the remainder.
///
/// ```text
/// W2 = W_in - W1
/// ```
///
/// Both branches carry the inbound total state, composition and FAR; each
/// branch then reaches its own exit Mach or area.
#[derive(Clone, Debug)]
pub struct WeightFlowSplitter {
    pub name: String,
    /// Mass flow drawn into branch 1
    pub w1: MassRate,
    pub targets: SplitTargets,
    pub without_statics: MachBranch,
    pub station: FlowStationConfig,
}

impl WeightFlowSplitter {
    pub fn new(
        name: impl Into<String>,
        w1: MassRate,
        targets: SplitTargets,
    ) -> ComponentResult<Self> {
        check_finite(w1.value, "split W1")?;
        match targets {
            SplitTargets::Mach { mach1, mach2 } => {
                check_mach(mach1, "split branch 1 Mach number")?;
                check_mach(mach2, "split branch 2 Mach number")?;
            }
            SplitTargets::Area { area1, area2 } => {
                check_positive(area1.value, "split branch 1 area")?;
                check_positive(area2.value, "split branch 2 area")?;
            }
        }
        Ok(Self {
            name: name.into(),
            w1,
            targets,
            without_statics: MachBranch::Subsonic,
            station: FlowStationConfig::default(),
        })
    }

    /// Splitter from a mode and both pairs of candidate targets.
    pub fn from_mode(
        name: impl Into<String>,
        w1: MassRate,
        mode: SolveMode,
        machs: (f64, f64),
        areas: (Area, Area),
    ) -> ComponentResult<Self> {
        let targets = match mode {
            SolveMode::Mach => SplitTargets::Mach {
                mach1: machs.0,
                mach2: machs.1,
            },
            SolveMode::Area => SplitTargets::Area {
                area1: areas.0,
                area2: areas.1,
            },
        };
        Self::new(name, w1, targets)
    }

    pub fn with_station_config(mut self, station: FlowStationConfig) -> Self {
        self.station = station;
        self
    }

    pub fn mode(&self) -> SolveMode {
        match self.targets {
            SplitTargets::Mach { .. } => SolveMode::Mach,
            SplitTargets::Area { .. } => SolveMode::Area,
        }
    }

    /// Branch mass flows `(W1, W2)`.
    pub fn split_flows(&self, w_in: MassRate) -> ComponentResult<(MassRate, MassRate)> {
        if self.w1.value < 0.0 || self.w1.value > w_in.value {
            return Err(ComponentError::NegativeFlow {
                w1: self.w1.value,
                w_in: w_in.value,
            });
        }
        Ok(exact_split(self.w1.value, w_in.value))
    }

    /// Split the inbound station into `(flow_out1, flow_out2)`.
    pub fn split(
        &self,
        fluid: &dyn FluidModel,
        inbound: &FlowState,
    ) -> ComponentResult<(FlowState, FlowState)> {
        let (w1, w2) = self.split_flows(inbound.w)?;
        let total = &inbound.total;

        let (stat1, stat2) = match self.targets {
            SplitTargets::Mach { mach1, mach2 } => (
                statics_from_mach(fluid, total, w1, mach1, &self.station.statics)?,
                statics_from_mach(fluid, total, w2, mach2, &self.station.statics)?,
            ),
            SplitTargets::Area { area1, area2 } => {
                if w1.value == 0.0 {
                    return Err(ComponentError::InvalidArg {
                        what: "split branch 1 carries no flow in area mode",
                    });
                }
                if w2.value == 0.0 {
                    return Err(ComponentError::InvalidArg {
                        what: "split branch 2 carries no flow in area mode",
                    });
                }
                let branch = MachBranch::for_inbound(inbound, false, self.without_statics);
                (
                    statics_from_area(fluid, total, w1, area1, branch, &self.station)?,
                    statics_from_area(fluid, total, w2, area2, branch, &self.station)?,
                )
            }
        };
        debug!(
            stage = %self.name,
            w1 = w1.value,
            w2 = w2.value,
            mach1 = stat1.mach,
            mach2 = stat2.mach,
            "split"
        );

        let out1 = FlowState::with_statics(total.clone(), stat1, w1).with_far(inbound.far);
        let out2 = FlowState::with_statics(total.clone(), stat2, w2).with_far(inbound.far);
        Ok((out1, out2))
    }
}

/// `(W1, W2)` with `W1 + W2 == W_in` in floating point, for `0 <= W1 <= W_in`.
///
/// `W_in - W1` is exact when `W1 >= W_in / 2`; below that the rounded
/// difference can leave the sum one ulp off, so `W2` is stepped by ulps.
fn exact_split(w1: f64, w_in: f64) -> (MassRate, MassRate) {
    let mut w2 = w_in - w1;
    for _ in 0..4 {
        let sum = w1 + w2;
        if sum == w_in {
            return (kgps(w1), kgps(w2));
        }
        w2 = if sum > w_in { w2.next_down() } else { w2.next_up() };
    }
    // W2 >= W_in / 2 here, so this difference is exact and sums back to W_in
    (kgps(w_in - w2), kgps(w2))
}

impl Stage for WeightFlowSplitter {
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
        let (out1, out2) = self.split(fluid, inbound)?;
        Ok(vec![Signal::Flow(out1), Signal::Flow(out2)])
    }
}
