//! Parallel parameter sweeps over one named input.

use crate::design::DesignPoint;
use crate::error::CycleResult;
use crate::solution::CycleSolution;
use crate::system::CompressionSystem;
use hl_fluids::FluidModel;
use rayon::prelude::*;
use tracing::warn;

/// One evaluated point of a sweep.
#[derive(Debug)]
pub struct SweepPoint {
    pub value: f64,
    pub result: CycleResult<CycleSolution>,
}

/// Evaluate `design` once per value of `input`, in parallel.
///
/// Points are independent and returned in the order of `values`; a failed
/// point keeps its error and does not stop the others.
pub fn sweep(
    fluid: &dyn FluidModel,
    design: &DesignPoint,
    input: &str,
    values: &[f64],
) -> CycleResult<Vec<SweepPoint>> {
    // Reject unknown names once, up front
    design.input(input)?;

    let points = values
        .par_iter()
        .map(|&value| {
            let result = evaluate_at(fluid, design, input, value);
            if let Err(e) = &result {
                warn!(input, value, error = %e, "sweep point failed");
            }
            SweepPoint { value, result }
        })
        .collect();
    Ok(points)
}

fn evaluate_at(
    fluid: &dyn FluidModel,
    design: &DesignPoint,
    input: &str,
    value: f64,
) -> CycleResult<CycleSolution> {
    let mut point = design.clone();
    point.set_input(input, value)?;
    CompressionSystem::new(&point)?.evaluate(fluid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use hl_fluids::IdealGasModel;

    #[test]
    fn points_come_back_in_order() {
        let values = [2.0, 3.0, 4.0, 5.0];
        let points = sweep(&IdealGasModel::new(), &DesignPoint::default(), "comp2.pr", &values)
            .unwrap();
        assert_eq!(points.len(), values.len());
        let powers: Vec<f64> = points
            .iter()
            .map(|p| p.result.as_ref().unwrap().c2_pwr)
            .collect();
        for (point, value) in points.iter().zip(values) {
            assert_eq!(point.value, value);
        }
        assert!(powers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn failed_point_does_not_stop_the_sweep() {
        let points =
            sweep(&IdealGasModel::new(), &DesignPoint::default(), "split.w1", &[0.1, 0.44]).unwrap();
        assert!(points[0].result.is_ok());
        assert!(matches!(points[1].result, Err(CycleError::Stage { .. })));
    }

    #[test]
    fn unknown_input_fails_before_sweeping() {
        let err = sweep(&IdealGasModel::new(), &DesignPoint::default(), "comp3.pr", &[1.0])
            .unwrap_err();
        assert!(matches!(err, CycleError::UnknownInput { .. }));
    }
}
