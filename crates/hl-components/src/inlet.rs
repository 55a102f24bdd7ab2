//! Inlet stage: ram recovery and ram drag.

use crate::common::{check_mach, check_unit_interval};
use crate::error::ComponentResult;
use crate::flow::{FlowState, StaticSolveConfig, TotalState, statics_from_mach};
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Force, newtons};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec};
use tracing::debug;

const INPUTS: &[PortSpec] = &[PortSpec::flow("flow_in")];
const OUTPUTS: &[PortSpec] = &[
    PortSpec::flow("flow_out"),
    PortSpec::scalar("f_ram", Dimension::Force),
];

/// Pod inlet.
///
/// Total pressure drops by the ram recovery factor, total enthalpy is
/// conserved, and the exit statics sit at `exit_mach` (the inflow Mach when
/// unset). Ram drag is the momentum of the captured stream, `W * V_in`.
#[derive(Clone, Debug)]
pub struct Inlet {
    pub name: String,
    /// Pt_out / Pt_in, in (0, 1]
    pub ram_recovery: f64,
    pub exit_mach: Option<f64>,
    pub statics: StaticSolveConfig,
}

/// Exit station and ram drag of one inlet evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct InletCapture {
    pub flow: FlowState,
    pub f_ram: Force,
}

impl Inlet {
    pub fn new(name: impl Into<String>, ram_recovery: f64) -> ComponentResult<Self> {
        check_unit_interval(ram_recovery, "ram recovery must be in (0,1]")?;
        Ok(Self {
            name: name.into(),
            ram_recovery,
            exit_mach: None,
            statics: StaticSolveConfig::default(),
        })
    }

    pub fn with_exit_mach(mut self, mach: f64) -> ComponentResult<Self> {
        check_mach(mach, "inlet exit Mach number")?;
        self.exit_mach = Some(mach);
        Ok(self)
    }

    pub fn capture(&self, fluid: &dyn FluidModel, inbound: &FlowState) -> ComponentResult<InletCapture> {
        let stat_in = inbound.require_statics("inlet needs the inflow velocity")?;
        let total_in = &inbound.total;
        let pt = total_in.pressure * self.ram_recovery;
        let total = TotalState::from_ph(fluid, &total_in.composition, pt, total_in.h)?;

        let mach = self.exit_mach.unwrap_or(stat_in.mach);
        let stat = statics_from_mach(fluid, &total, inbound.w, mach, &self.statics)?;
        let f_ram = newtons(inbound.w.value * stat_in.velocity.value);
        debug!(stage = %self.name, f_ram = f_ram.value, mach, "inlet");

        let flow = FlowState::with_statics(total, stat, inbound.w).with_far(inbound.far);
        Ok(InletCapture { flow, f_ram })
    }
}

impl Stage for Inlet {
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
        let out = self.capture(fluid, inbound)?;
        Ok(vec![Signal::Flow(out.flow), Signal::Force(out.f_ram)])
    }
}
