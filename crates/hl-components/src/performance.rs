//! Performance aggregator.

use crate::common::check_finite;
use crate::error::ComponentResult;
use crate::traits::{Signal, Stage, input_at};
use hl_core::units::{Force, Power, Pressure};
use hl_fluids::FluidModel;
use hl_graph::{Dimension, PortSpec};

const INPUTS: &[PortSpec] = &[
    PortSpec::scalar("c1_pwr", Dimension::Power),
    PortSpec::scalar("c2_pwr", Dimension::Power),
    PortSpec::scalar("fg", Dimension::Force),
    PortSpec::scalar("f_ram", Dimension::Force),
    PortSpec::scalar("ps_bearing", Dimension::Pressure),
];
const OUTPUTS: &[PortSpec] = &[
    PortSpec::scalar("pwr", Dimension::Power),
    PortSpec::scalar("fnet", Dimension::Force),
    PortSpec::scalar("ps_bearing_resid", Dimension::Pressure),
];

/// Whole-system figures of merit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    /// Total compressor shaft power
    pub pwr: Power,
    /// Gross thrust minus ram drag
    pub fnet: Force,
    /// Bearing static pressure minus its target
    pub ps_bearing_resid: Pressure,
}

/// Sums compressor power, nets thrust against ram drag and checks the bearing supply.
#[derive(Clone, Debug)]
pub struct Performance {
    pub name: String,
    pub ps_bearing_target: Pressure,
}

impl Performance {
    pub fn new(name: impl Into<String>, ps_bearing_target: Pressure) -> ComponentResult<Self> {
        check_finite(ps_bearing_target.value, "bearing pressure target")?;
        Ok(Self {
            name: name.into(),
            ps_bearing_target,
        })
    }

    pub fn summarize(
        &self,
        c1_pwr: Power,
        c2_pwr: Power,
        fg: Force,
        f_ram: Force,
        ps_bearing: Pressure,
    ) -> PerformanceSummary {
        PerformanceSummary {
            pwr: c1_pwr + c2_pwr,
            fnet: fg - f_ram,
            ps_bearing_resid: ps_bearing - self.ps_bearing_target,
        }
    }
}

impl Stage for Performance {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &'static [PortSpec] {
        INPUTS
    }

    fn outputs(&self) -> &'static [PortSpec] {
        OUTPUTS
    }

    fn evaluate(&self, _fluid: &dyn FluidModel, inputs: &[Signal]) -> ComponentResult<Vec<Signal>> {
        let summary = self.summarize(
            input_at(inputs, 0, "c1_pwr")?.as_power("c1_pwr")?,
            input_at(inputs, 1, "c2_pwr")?.as_power("c2_pwr")?,
            input_at(inputs, 2, "fg")?.as_force("fg")?,
            input_at(inputs, 3, "f_ram")?.as_force("f_ram")?,
            input_at(inputs, 4, "ps_bearing")?.as_pressure("ps_bearing")?,
        );
        Ok(vec![
            Signal::Power(summary.pwr),
            Signal::Force(summary.fnet),
            Signal::Pressure(summary.ps_bearing_resid),
        ])
    }
}
