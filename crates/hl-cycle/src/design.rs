//! Design-point configuration: nominal values, named inputs, YAML/JSON I/O.

use crate::error::{CycleError, CycleResult};
use hl_components::{FlowStationConfig, SolveMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Every parameter of one compression-system evaluation, in SI units.
///
/// Missing fields take the nominal values on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignPoint {
    /// Pod travel Mach number
    pub pod_mach: f64,
    /// Tube static pressure [Pa]
    pub tube_ps: f64,
    /// Tube static temperature [K]
    pub tube_ts: f64,
    /// Inlet capture area [m^2]
    pub inlet_area: f64,
    pub ram_recovery: f64,
    /// Inlet exit Mach; inflow Mach when unset
    pub inlet_exit_mach: Option<f64>,
    /// Diffuser exit area [m^2]; the inlet area when unset
    pub diffuser_area: Option<f64>,
    pub comp1_pr: f64,
    pub comp1_eff: f64,
    pub comp1_funnel_mach: f64,
    pub split_mode: SolveMode,
    /// Bearing branch mass flow [kg/s]
    pub split_w1: f64,
    pub split_mach1: f64,
    pub split_mach2: f64,
    pub split_area1: Option<f64>,
    pub split_area2: Option<f64>,
    pub comp2_pr: f64,
    pub comp2_eff: f64,
    pub comp2_funnel_mode: SolveMode,
    pub comp2_funnel_mach: f64,
    pub comp2_funnel_area: Option<f64>,
    pub nozzle_dpqp: f64,
    /// Nozzle exhaust pressure [Pa]; the tube pressure when unset
    pub nozzle_ps_exhaust: Option<f64>,
    /// Bearing static pressure target [Pa]
    pub ps_bearing_target: f64,
    pub station: FlowStationConfig,
}

impl Default for DesignPoint {
    fn default() -> Self {
        Self {
            pod_mach: 0.5,
            tube_ps: 99.0,
            tube_ts: 292.6,
            inlet_area: 2.0,
            ram_recovery: 1.0,
            inlet_exit_mach: None,
            diffuser_area: None,
            comp1_pr: 12.47,
            comp1_eff: 0.8,
            comp1_funnel_mach: 0.6,
            split_mode: SolveMode::Mach,
            // Nominal inflow is about 0.40 kg/s at Mach 0.5 through 2 m^2
            split_w1: 0.2,
            split_mach1: 0.6,
            split_mach2: 1.0,
            split_area1: None,
            split_area2: None,
            comp2_pr: 5.0,
            comp2_eff: 0.8,
            comp2_funnel_mode: SolveMode::Mach,
            comp2_funnel_mach: 0.6,
            comp2_funnel_area: None,
            nozzle_dpqp: 0.0,
            nozzle_ps_exhaust: None,
            ps_bearing_target: 0.0,
            station: FlowStationConfig::default(),
        }
    }
}

/// Names accepted by `DesignPoint::input` and `DesignPoint::set_input`.
pub const INPUT_NAMES: &[&str] = &[
    "pod_mach",
    "tube.ps",
    "tube.ts",
    "inlet.area",
    "inlet.ram_recovery",
    "inlet.exit_mach",
    "diffuser.area",
    "comp1.pr",
    "comp1.eff",
    "comp1_funnel.mach",
    "split.w1",
    "split.mach1",
    "split.mach2",
    "split.area1",
    "split.area2",
    "comp2.pr",
    "comp2.eff",
    "comp2_funnel.mach",
    "comp2_funnel.area",
    "nozzle.dpqp",
    "nozzle.ps_exhaust",
    "perf.ps_bearing_target",
];

impl DesignPoint {
    pub fn effective_diffuser_area(&self) -> f64 {
        self.diffuser_area.unwrap_or(self.inlet_area)
    }

    pub fn effective_ps_exhaust(&self) -> f64 {
        self.nozzle_ps_exhaust.unwrap_or(self.tube_ps)
    }

    /// Current value of a named input; `None` for an unset optional one.
    pub fn input(&self, name: &str) -> CycleResult<Option<f64>> {
        let v = match name {
            "pod_mach" => Some(self.pod_mach),
            "tube.ps" => Some(self.tube_ps),
            "tube.ts" => Some(self.tube_ts),
            "inlet.area" => Some(self.inlet_area),
            "inlet.ram_recovery" => Some(self.ram_recovery),
            "inlet.exit_mach" => self.inlet_exit_mach,
            "diffuser.area" => Some(self.effective_diffuser_area()),
            "comp1.pr" => Some(self.comp1_pr),
            "comp1.eff" => Some(self.comp1_eff),
            "comp1_funnel.mach" => Some(self.comp1_funnel_mach),
            "split.w1" => Some(self.split_w1),
            "split.mach1" => Some(self.split_mach1),
            "split.mach2" => Some(self.split_mach2),
            "split.area1" => self.split_area1,
            "split.area2" => self.split_area2,
            "comp2.pr" => Some(self.comp2_pr),
            "comp2.eff" => Some(self.comp2_eff),
            "comp2_funnel.mach" => Some(self.comp2_funnel_mach),
            "comp2_funnel.area" => self.comp2_funnel_area,
            "nozzle.dpqp" => Some(self.nozzle_dpqp),
            "nozzle.ps_exhaust" => Some(self.effective_ps_exhaust()),
            "perf.ps_bearing_target" => Some(self.ps_bearing_target),
            _ => {
                return Err(CycleError::UnknownInput {
                    name: name.to_string(),
                });
            }
        };
        Ok(v)
    }

    /// Set a named input.
    pub fn set_input(&mut self, name: &str, value: f64) -> CycleResult<()> {
        match name {
            "pod_mach" => self.pod_mach = value,
            "tube.ps" => self.tube_ps = value,
            "tube.ts" => self.tube_ts = value,
            "inlet.area" => self.inlet_area = value,
            "inlet.ram_recovery" => self.ram_recovery = value,
            "inlet.exit_mach" => self.inlet_exit_mach = Some(value),
            "diffuser.area" => self.diffuser_area = Some(value),
            "comp1.pr" => self.comp1_pr = value,
            "comp1.eff" => self.comp1_eff = value,
            "comp1_funnel.mach" => self.comp1_funnel_mach = value,
            "split.w1" => self.split_w1 = value,
            "split.mach1" => self.split_mach1 = value,
            "split.mach2" => self.split_mach2 = value,
            "split.area1" => self.split_area1 = Some(value),
            "split.area2" => self.split_area2 = Some(value),
            "comp2.pr" => self.comp2_pr = value,
            "comp2.eff" => self.comp2_eff = value,
            "comp2_funnel.mach" => self.comp2_funnel_mach = value,
            "comp2_funnel.area" => self.comp2_funnel_area = Some(value),
            "nozzle.dpqp" => self.nozzle_dpqp = value,
            "nozzle.ps_exhaust" => self.nozzle_ps_exhaust = Some(value),
            "perf.ps_bearing_target" => self.ps_bearing_target = value,
            _ => {
                return Err(CycleError::UnknownInput {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Copy of `self` with every named input applied.
    pub fn with_inputs(&self, inputs: &BTreeMap<String, f64>) -> CycleResult<Self> {
        let mut design = self.clone();
        for (name, value) in inputs {
            design.set_input(name, *value)?;
        }
        Ok(design)
    }

    pub fn from_inputs(inputs: &BTreeMap<String, f64>) -> CycleResult<Self> {
        Self::default().with_inputs(inputs)
    }

    /// All inputs that currently have a value.
    pub fn to_inputs(&self) -> BTreeMap<String, f64> {
        INPUT_NAMES
            .iter()
            .filter_map(|name| {
                self.input(name)
                    .ok()
                    .flatten()
                    .map(|v| (name.to_string(), v))
            })
            .collect()
    }

    /// Check that every value is usable before any stage is built.
    pub fn validate(&self) -> CycleResult<()> {
        for (name, value) in self.to_inputs() {
            if !value.is_finite() {
                return Err(CycleError::InvalidDesign {
                    field: name,
                    value,
                    reason: "must be finite",
                });
            }
        }

        let positive = [
            ("pod_mach", self.pod_mach),
            ("tube.ps", self.tube_ps),
            ("tube.ts", self.tube_ts),
            ("inlet.area", self.inlet_area),
            ("diffuser.area", self.effective_diffuser_area()),
            ("nozzle.ps_exhaust", self.effective_ps_exhaust()),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(CycleError::InvalidDesign {
                    field: field.to_string(),
                    value,
                    reason: "must be positive",
                });
            }
        }

        if self.split_w1 < 0.0 {
            return Err(CycleError::InvalidDesign {
                field: "split.w1".to_string(),
                value: self.split_w1,
                reason: "must not be negative",
            });
        }

        let required = [
            (self.split_mode == SolveMode::Area, "split.area1", self.split_area1),
            (self.split_mode == SolveMode::Area, "split.area2", self.split_area2),
            (
                self.comp2_funnel_mode == SolveMode::Area,
                "comp2_funnel.area",
                self.comp2_funnel_area,
            ),
        ];
        for (needed, field, value) in required {
            if needed && value.is_none() {
                return Err(CycleError::InvalidDesign {
                    field: field.to_string(),
                    value: f64::NAN,
                    reason: "required in area mode",
                });
            }
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> CycleResult<Self> {
        let design: DesignPoint = serde_yaml::from_str(content)?;
        design.validate()?;
        Ok(design)
    }

    pub fn to_yaml_string(&self) -> CycleResult<String> {
        self.validate()?;
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn load_yaml(path: &Path) -> CycleResult<DesignPoint> {
    let content = std::fs::read_to_string(path)?;
    DesignPoint::from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, design: &DesignPoint) -> CycleResult<()> {
    let content = design.to_yaml_string()?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> CycleResult<DesignPoint> {
    let content = std::fs::read_to_string(path)?;
    let design: DesignPoint = serde_json::from_str(&content)?;
    design.validate()?;
    Ok(design)
}

pub fn save_json(path: &Path, design: &DesignPoint) -> CycleResult<()> {
    design.validate()?;
    let content = serde_json::to_string_pretty(design)?;
    std::fs::write(path, content)?;
    Ok(())
}
