//! Results of one compression-system evaluation.

use crate::error::{CycleError, CycleResult};
use crate::network::NetworkValues;
use crate::system::{COMP1, COMP2, COMP2_FUNNEL, DIFFUSER, INLET, NOZZLE, PERF, RESIDUALS, SPLIT};
use hl_components::{FlowState, Signal};
use hl_core::units::constants::FT3_PER_M3;
use std::collections::BTreeMap;

/// Headline figures of an evaluated compression system, SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSolution {
    /// Total shaft power of both compressors [W]
    pub pwr: f64,
    /// Net thrust, gross nozzle thrust less ram drag [N]
    pub fnet: f64,
    pub fg: f64,
    pub f_ram: f64,
    pub c1_pwr: f64,
    pub c2_pwr: f64,
    /// Static pressure delivered to the air bearings [Pa]
    pub ps_bearing: f64,
    pub ps_bearing_resid: f64,
    /// Captured mass flow [kg/s]
    pub w_in: f64,
    pub w_bearing: f64,
    pub w_bypass: f64,
    /// Compressor-1 inlet volumetric flow [m^3/min]
    pub comp1_m3pm: f64,
    /// Compressor-1 inlet volumetric flow [ft^3/min]
    pub comp1_cfm: f64,
    values: NetworkValues,
}

impl CycleSolution {
    pub(crate) fn from_values(values: NetworkValues) -> CycleResult<Self> {
        let diffuser = values.flow(DIFFUSER, "flow_out")?;
        let comp1_m3ps = diffuser
            .volumetric_flow()
            .ok_or_else(|| CycleError::Invariant {
                what: "diffuser exit has no statics".to_string(),
            })?
            .value;

        Ok(Self {
            pwr: values.scalar(PERF, "pwr")?,
            fnet: values.scalar(PERF, "fnet")?,
            fg: values.scalar(NOZZLE, "fg")?,
            f_ram: values.scalar(INLET, "f_ram")?,
            c1_pwr: values.scalar(COMP1, "pwr")?,
            c2_pwr: values.scalar(COMP2, "pwr")?,
            ps_bearing: values.scalar(COMP2_FUNNEL, "ps_out")?,
            ps_bearing_resid: values.scalar(PERF, "ps_bearing_resid")?,
            w_in: values.flow(INLET, "flow_out")?.w.value,
            w_bearing: values.flow(SPLIT, "flow_out1")?.w.value,
            w_bypass: values.flow(SPLIT, "flow_out2")?.w.value,
            comp1_m3pm: comp1_m3ps * 60.0,
            comp1_cfm: comp1_m3ps * 60.0 * FT3_PER_M3,
            values,
        })
    }

    /// Every stage output of the evaluation.
    pub fn values(&self) -> &NetworkValues {
        &self.values
    }

    pub fn flow(&self, stage: &str, port: &str) -> CycleResult<&FlowState> {
        self.values.flow(stage, port)
    }

    /// Exit area of a stage's flow port, when statics were computed.
    pub fn area(&self, stage: &str, port: &str) -> CycleResult<Option<f64>> {
        Ok(self.flow(stage, port)?.area().map(|a| a.value))
    }

    /// Residuals that vanish at a consistent design point, keyed `stage.port`.
    pub fn residuals(&self) -> CycleResult<BTreeMap<String, f64>> {
        RESIDUALS
            .iter()
            .map(|(stage, port)| Ok((format!("{stage}.{port}"), self.values.scalar(stage, port)?)))
            .collect()
    }

    /// Named scalar outputs.
    ///
    /// Scalar ports appear as `stage.port`; flow ports expand to
    /// `stage.port.{w, pt, tt}` plus `{ps, ts, mach, area}` when statics exist.
    pub fn outputs(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (key, signal) in self.values.iter() {
            match signal {
                Signal::Flow(flow) => {
                    out.insert(format!("{key}.w"), flow.w.value);
                    out.insert(format!("{key}.pt"), flow.total.pressure.value);
                    out.insert(format!("{key}.tt"), flow.total.temperature.value);
                    if let Some(stat) = flow.statics() {
                        out.insert(format!("{key}.ps"), stat.pressure.value);
                        out.insert(format!("{key}.ts"), stat.temperature.value);
                        out.insert(format!("{key}.mach"), stat.mach);
                        out.insert(format!("{key}.area"), stat.area.value);
                    }
                }
                scalar => {
                    if let Some(v) = scalar.scalar_value() {
                        out.insert(key.to_string(), v);
                    }
                }
            }
        }
        out.insert("comp1.m3pm".to_string(), self.comp1_m3pm);
        out.insert("comp1.cfm".to_string(), self.comp1_cfm);
        out
    }
}
