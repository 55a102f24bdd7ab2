//! Driver contract: named inputs in, named outputs and residuals out.

use crate::design::DesignPoint;
use crate::error::{CycleError, CycleResult};
use crate::solution::CycleSolution;
use crate::system::CompressionSystem;
use hl_fluids::FluidModel;
use hl_solver::{NewtonConfig, finite_difference_jacobian, newton_solve};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Named results of one driven evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverOutput {
    pub outputs: BTreeMap<String, f64>,
    pub residuals: BTreeMap<String, f64>,
}

/// An external solver's view of the compression system.
pub trait Driver {
    fn evaluate(
        &self,
        fluid: &dyn FluidModel,
        inputs: &BTreeMap<String, f64>,
    ) -> CycleResult<DriverOutput>;
}

/// Evaluates a base design point with named inputs overridden.
#[derive(Debug, Clone, Default)]
pub struct DesignDriver {
    pub base: DesignPoint,
}

impl DesignDriver {
    pub fn new(base: DesignPoint) -> Self {
        Self { base }
    }
}

impl Driver for DesignDriver {
    fn evaluate(
        &self,
        fluid: &dyn FluidModel,
        inputs: &BTreeMap<String, f64>,
    ) -> CycleResult<DriverOutput> {
        let design = self.base.with_inputs(inputs)?;
        let solution = CompressionSystem::new(&design)?.evaluate(fluid)?;
        Ok(DriverOutput {
            outputs: solution.outputs(),
            residuals: solution.residuals()?,
        })
    }
}

/// Newton driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonDriver {
    pub config: NewtonConfig,
    /// Relative finite-difference step for the Jacobian
    pub fd_step: f64,
}

impl Default for NewtonDriver {
    fn default() -> Self {
        Self {
            config: NewtonConfig {
                rel_tol: 1e-8,
                ..NewtonConfig::default()
            },
            fd_step: 1e-7,
        }
    }
}

/// A design point whose residuals have been driven to zero.
#[derive(Debug, Clone)]
pub struct DriverSolution {
    pub design: DesignPoint,
    pub solution: CycleSolution,
    pub iterations: usize,
    pub residual_norm: f64,
}

impl NewtonDriver {
    /// Adjust `free_inputs` until every residual in `residual_names` vanishes.
    ///
    /// The system must be square. Starting values are the design's current
    /// inputs.
    pub fn solve(
        &self,
        fluid: &dyn FluidModel,
        design: &DesignPoint,
        free_inputs: &[&str],
        residual_names: &[&str],
    ) -> CycleResult<DriverSolution> {
        if free_inputs.is_empty() || free_inputs.len() != residual_names.len() {
            return Err(CycleError::InvalidDesign {
                field: "free_inputs".to_string(),
                value: free_inputs.len() as f64,
                reason: "need one free input per residual",
            });
        }

        let x0 = free_inputs
            .iter()
            .map(|name| {
                design.input(name)?.ok_or_else(|| CycleError::InvalidDesign {
                    field: name.to_string(),
                    value: f64::NAN,
                    reason: "free input needs a starting value",
                })
            })
            .collect::<CycleResult<Vec<f64>>>()?;

        let evaluate = |x: &DVector<f64>| -> CycleResult<(DesignPoint, CycleSolution)> {
            let mut trial = design.clone();
            for (name, value) in free_inputs.iter().zip(x.iter()) {
                trial.set_input(name, *value)?;
            }
            let solution = CompressionSystem::new(&trial)?.evaluate(fluid)?;
            Ok((trial, solution))
        };
        let residual = |x: &DVector<f64>| -> CycleResult<DVector<f64>> {
            let (_, solution) = evaluate(x)?;
            let all = solution.residuals()?;
            let r = residual_names
                .iter()
                .map(|name| {
                    all.get(*name).copied().ok_or_else(|| CycleError::UnknownOutput {
                        name: name.to_string(),
                    })
                })
                .collect::<CycleResult<Vec<f64>>>()?;
            Ok(DVector::from_vec(r))
        };

        // Fail fast on bad residual names before the first Jacobian
        let x0 = DVector::from_vec(x0);
        residual(&x0)?;

        info!(free = ?free_inputs, residuals = ?residual_names, "newton driver start");
        let result = newton_solve(
            x0,
            residual,
            |x: &DVector<f64>| -> CycleResult<DMatrix<f64>> {
                finite_difference_jacobian(x, residual, self.fd_step)
            },
            &self.config,
        )?;
        debug!(
            iterations = result.iterations,
            residual_norm = result.residual_norm,
            "newton driver converged"
        );

        let (design, solution) = evaluate(&result.x)?;
        Ok(DriverSolution {
            design,
            solution,
            iterations: result.iterations,
            residual_norm: result.residual_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_fluids::IdealGasModel;

    #[test]
    fn design_driver_overrides_inputs() {
        let fluid = IdealGasModel::new();
        let driver = DesignDriver::default();
        let nominal = driver.evaluate(&fluid, &BTreeMap::new()).unwrap();

        let inputs = BTreeMap::from([("comp2.pr".to_string(), 3.0)]);
        let lower = driver.evaluate(&fluid, &inputs).unwrap();
        assert!(lower.outputs["perf.pwr"] < nominal.outputs["perf.pwr"]);
        assert!(lower.residuals["perf.ps_bearing_resid"] < nominal.residuals["perf.ps_bearing_resid"]);

        let bad = BTreeMap::from([("comp9.pr".to_string(), 3.0)]);
        assert!(matches!(
            driver.evaluate(&fluid, &bad),
            Err(CycleError::UnknownInput { .. })
        ));
    }

    #[test]
    fn system_must_be_square() {
        let err = NewtonDriver::default()
            .solve(
                &IdealGasModel::new(),
                &DesignPoint::default(),
                &["comp2.pr", "comp1.pr"],
                &["perf.ps_bearing_resid"],
            )
            .unwrap_err();
        assert!(matches!(err, CycleError::InvalidDesign { .. }));
    }

    #[test]
    fn unknown_residual_is_reported() {
        let err = NewtonDriver::default()
            .solve(
                &IdealGasModel::new(),
                &DesignPoint::default(),
                &["comp2.pr"],
                &["perf.nothing"],
            )
            .unwrap_err();
        assert!(matches!(err, CycleError::UnknownOutput { ref name } if name == "perf.nothing"));
    }
}
