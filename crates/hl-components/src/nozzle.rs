//! Convergent nozzle.

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};
use crate::flow::{FlowState, StaticSolveConfig, TotalState, statics_from_mach, statics_from_ps};
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Force, Pressure, newtons};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec};
use tracing::debug;

const INPUTS: &[PortSpec] = &[PortSpec::flow("flow_in")];
const OUTPUTS: &[PortSpec] = &[
    PortSpec::flow("flow_out"),
    PortSpec::scalar("fg", Dimension::Force),
];

/// Convergent exhaust nozzle discharging to the tube.
///
/// ```text
/// Pt_exit = Pt_in * (1 - dPqP)
/// choked   (Ps* > Pamb):  exit at M = 1
/// unchoked (Ps* <= Pamb): exit expanded to Pamb
/// Fg = W * V + (Ps - Pamb) * A
/// ```
#[derive(Clone, Debug)]
pub struct Nozzle {
    pub name: String,
    /// Fractional total-pressure loss, in [0, 1)
    pub dpqp: f64,
    /// Ambient pressure the nozzle exhausts into
    pub ps_exhaust: Pressure,
    pub statics: StaticSolveConfig,
}

/// Exit station, gross thrust and choking state of one nozzle evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct NozzleExit {
    pub flow: FlowState,
    pub fg: Force,
    pub choked: bool,
}

impl Nozzle {
    pub fn new(name: impl Into<String>, dpqp: f64, ps_exhaust: Pressure) -> ComponentResult<Self> {
        if !dpqp.is_finite() || !(0.0..1.0).contains(&dpqp) {
            return Err(ComponentError::InvalidArg {
                what: "nozzle dPqP must be in [0,1)",
            });
        }
        check_positive(ps_exhaust.value, "nozzle exhaust pressure")?;
        Ok(Self {
            name: name.into(),
            dpqp,
            ps_exhaust,
            statics: StaticSolveConfig::default(),
        })
    }

    pub fn expand(&self, fluid: &dyn FluidModel, inbound: &FlowState) -> ComponentResult<NozzleExit> {
        let total_in = &inbound.total;
        let total = if self.dpqp == 0.0 {
            total_in.clone()
        } else {
            let pt = total_in.pressure * (1.0 - self.dpqp);
            TotalState::from_ph(fluid, &total_in.composition, pt, total_in.h)?
        };
        if total.pressure.value <= self.ps_exhaust.value {
            return Err(ComponentError::InvalidArg {
                what: "nozzle total pressure must exceed exhaust pressure",
            });
        }

        let throat = statics_from_mach(fluid, &total, inbound.w, 1.0, &self.statics)?;
        let choked = throat.pressure.value > self.ps_exhaust.value;
        let stat = if choked {
            throat
        } else {
            statics_from_ps(fluid, &total, inbound.w, self.ps_exhaust)?
        };

        let pressure_thrust = (stat.pressure.value - self.ps_exhaust.value) * stat.area.value;
        let fg = newtons(inbound.w.value * stat.velocity.value + pressure_thrust);
        debug!(
            stage = %self.name,
            choked,
            mach = stat.mach,
            fg = fg.value,
            "nozzle"
        );

        let flow = FlowState::with_statics(total, stat, inbound.w).with_far(inbound.far);
        Ok(NozzleExit { flow, fg, choked })
    }
}

impl Stage for Nozzle {
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
        let out = self.expand(fluid, inbound)?;
        Ok(vec![Signal::Flow(out.flow), Signal::Force(out.fg)])
    }
}
