//! Compressor stage model.

use crate::common::{check_finite, check_unit_interval};
use crate::error::{ComponentError, ComponentResult};
use crate::flow::{FlowState, TotalState};
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Power, watts};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec};
use tracing::debug;

const INPUTS: &[PortSpec] = &[PortSpec::flow("flow_in")];
const OUTPUTS: &[PortSpec] = &[
    PortSpec::flow("flow_out"),
    PortSpec::scalar("pwr", Dimension::Power),
];

/// Adiabatic compressor with a design pressure ratio and isentropic efficiency.
///
/// ## Model
///
/// ```text
/// Pt_out = PR * Pt_in
/// h_s    = h(Pt_out, s_in)
/// h_out  = h_in + (h_s - h_in) / eta
/// P_shaft = W * (h_out - h_in)
/// ```
///
/// ## Sign Conventions
///
/// - `power` is POSITIVE (power consumed from the shaft)
/// - The exit station carries totals only; a following area/Mach stage adds statics
#[derive(Clone, Debug)]
pub struct Compressor {
    /// Component name for debugging
    pub name: String,
    /// Total pressure ratio (>= 1)
    pub pr: f64,
    /// Isentropic efficiency (0 < eta <= 1)
    pub eff: f64,
}

/// Exit station and shaft power of one compressor evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Compression {
    pub flow: FlowState,
    pub power: Power,
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// # Errors
    /// Returns error if the pressure ratio is below 1 or the efficiency is
    /// outside (0, 1].
    pub fn new(name: impl Into<String>, pr: f64, eff: f64) -> ComponentResult<Self> {
        let pr = check_finite(pr, "compressor pressure ratio")?;
        if pr < 1.0 {
            return Err(ComponentError::InvalidArg {
                what: "compressor pressure ratio must be >= 1",
            });
        }
        check_unit_interval(eff, "compressor efficiency must be in (0,1]")?;
        Ok(Self {
            name: name.into(),
            pr,
            eff,
        })
    }

    pub fn compress(
        &self,
        fluid: &dyn FluidModel,
        inbound: &FlowState,
    ) -> ComponentResult<Compression> {
        let total_in = &inbound.total;
        let comp = &total_in.composition;
        let pt_out = total_in.pressure * self.pr;

        let ideal = TotalState::from_ps(fluid, comp, pt_out, total_in.s)?;
        let dh = (ideal.h - total_in.h) / self.eff;
        let total_out = TotalState::from_ph(fluid, comp, pt_out, total_in.h + dh)?;
        let power = watts(check_finite(inbound.w.value * dh, "compressor power")?);

        debug!(
            stage = %self.name,
            pr = self.pr,
            tt_out = total_out.temperature.value,
            power_w = power.value,
            "compress"
        );

        let flow = FlowState::total_only(total_out, inbound.w).with_far(inbound.far);
        Ok(Compression { flow, power })
    }
}

impl Stage for Compressor {
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
        let out = self.compress(fluid, inbound)?;
        Ok(vec![Signal::Flow(out.flow), Signal::Power(out.power)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::units::{k, kgps, pa};
    use hl_fluids::{Composition, IdealGasModel};

    fn inbound(fluid: &IdealGasModel) -> FlowState {
        let total =
            TotalState::from_pt(fluid, &Composition::air(), pa(117.45), k(307.26)).unwrap();
        FlowState::total_only(total, kgps(0.4043))
    }

    #[test]
    fn compressor_creation() {
        assert!(Compressor::new("comp1", 12.47, 0.8).is_ok());
        assert!(Compressor::new("comp1", 0.9, 0.8).is_err());
        assert!(Compressor::new("comp1", 5.0, 1.5).is_err());
        assert!(Compressor::new("comp1", 5.0, 0.0).is_err());
    }

    #[test]
    fn compressor_raises_pressure_and_consumes_power() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let out = Compressor::new("comp1", 12.47, 0.8)
            .unwrap()
            .compress(&fluid, &flow)
            .unwrap();

        assert!((out.flow.total.pressure.value - 12.47 * 117.45).abs() < 1e-9);
        assert!((out.flow.total.temperature.value - 699.7).abs() < 0.5);
        assert!(out.power.value > 160_000.0 && out.power.value < 168_000.0);
        assert!(out.flow.statics().is_none());
        assert_eq!(out.flow.w, flow.w);
    }

    #[test]
    fn ideal_compression_is_isentropic() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let out = Compressor::new("ideal", 3.0, 1.0)
            .unwrap()
            .compress(&fluid, &flow)
            .unwrap();
        assert!((out.flow.total.s - flow.total.s).abs() < 1e-5);
    }

    #[test]
    fn unit_ratio_does_no_work() {
        let fluid = IdealGasModel::new();
        let flow = inbound(&fluid);
        let out = Compressor::new("idle", 1.0, 0.8)
            .unwrap()
            .compress(&fluid, &flow)
            .unwrap();
        assert!(out.power.value.abs() < 1e-3);
    }
}
