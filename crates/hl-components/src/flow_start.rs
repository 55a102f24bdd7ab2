//! Flow start: ambient static conditions and travel Mach to a flow station.

use crate::common::{check_mach, check_positive};
use crate::error::ComponentResult;
use crate::flow::{FlowState, StaticState, TotalState};
use crate::traits::{Signal, Stage};
use hl_core::units::{Area, MassRate, Pressure, Temperature, kgps, mps};
use hl_fluids::{Composition, FluidModel, StateInput};
use hl_graph::PortSpec;

const OUTPUTS: &[PortSpec] = &[PortSpec::flow("flow_out")];

/// Source stage: air at rest in the tube seen from a pod moving at `mach`.
///
/// ```text
/// V  = M * a(Ps, Ts)
/// ht = hs + V^2 / 2,  st = ss
/// W  = rho_s * V * A
/// ```
#[derive(Clone, Debug)]
pub struct FlowStart {
    pub name: String,
    pub ps: Pressure,
    pub ts: Temperature,
    pub mach: f64,
    /// Capture area the mass flow is computed through
    pub area: Area,
    pub composition: Composition,
}

impl FlowStart {
    pub fn new(
        name: impl Into<String>,
        ps: Pressure,
        ts: Temperature,
        mach: f64,
        area: Area,
        composition: Composition,
    ) -> ComponentResult<Self> {
        check_positive(ps.value, "flow start static pressure")?;
        check_positive(ts.value, "flow start static temperature")?;
        check_mach(mach, "flow start Mach number")?;
        check_positive(area.value, "flow start area")?;
        Ok(Self {
            name: name.into(),
            ps,
            ts,
            mach,
            area,
            composition,
        })
    }

    /// Build the station.
    pub fn flow(&self, fluid: &dyn FluidModel) -> ComponentResult<FlowState> {
        let gas = fluid.resolve(
            &self.composition,
            StateInput::PT {
                p: self.ps,
                t: self.ts,
            },
        )?;
        let v = self.mach * gas.speed_of_sound.value;
        let ht = gas.h + 0.5 * v * v;
        let total = TotalState::from_hs(fluid, &self.composition, ht, gas.s)?;
        let w: MassRate = kgps(gas.density.value * v * self.area.value);

        let stat = StaticState {
            pressure: gas.pressure,
            temperature: gas.temperature,
            h: gas.h,
            density: gas.density,
            velocity: mps(v),
            speed_of_sound: gas.speed_of_sound,
            mach: self.mach,
            area: self.area,
            gamma: gas.gamma,
        };
        Ok(FlowState::with_statics(total, stat, w))
    }
}

impl Stage for FlowStart {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &[]
    }

    fn outputs(&self) -> &'static [PortSpec] {
        OUTPUTS
    }

    fn evaluate(&self, fluid: &dyn FluidModel, _inputs: &[Signal]) -> ComponentResult<Vec<Signal>> {
        Ok(vec![Signal::Flow(self.flow(fluid)?)])
    }
}
