//! The pod compression system assembled as a stage network.
//!
//! ```text
//! start -> inlet -> diffuser -> comp1 -> comp1_funnel -> split
//!   split.flow_out1 -> comp2 -> comp2_funnel  (bearing supply)
//!   split.flow_out2 -> nozzle                 (exhaust)
//! comp1.pwr, comp2.pwr, nozzle.fg, inlet.f_ram, comp2_funnel.ps_out -> perf
//! ```

use crate::design::DesignPoint;
use crate::error::{CycleError, CycleResult};
use crate::network::{Network, NetworkBuilder};
use crate::solution::CycleSolution;
use hl_components::{
    AreaMachSolver, Compressor, FlowStart, Inlet, Nozzle, Performance, SolveMode,
    WeightFlowSplitter,
};
use hl_core::units::{k, kgps, m2, pa};
use hl_fluids::{Composition, FluidModel};
use tracing::debug;

pub const START: &str = "start";
pub const INLET: &str = "inlet";
pub const DIFFUSER: &str = "diffuser";
pub const COMP1: &str = "comp1";
pub const COMP1_FUNNEL: &str = "comp1_funnel";
pub const SPLIT: &str = "split";
pub const COMP2: &str = "comp2";
pub const COMP2_FUNNEL: &str = "comp2_funnel";
pub const NOZZLE: &str = "nozzle";
pub const PERF: &str = "perf";

/// Stages whose residuals must vanish at a consistent design point.
pub const RESIDUALS: &[(&str, &str)] = &[
    (DIFFUSER, "area_resid"),
    (COMP1_FUNNEL, "area_resid"),
    (COMP2_FUNNEL, "area_resid"),
    (PERF, "ps_bearing_resid"),
];

/// Compression-system network built from one design point.
#[derive(Debug)]
pub struct CompressionSystem {
    design: DesignPoint,
    network: Network,
}

impl CompressionSystem {
    pub fn new(design: &DesignPoint) -> CycleResult<Self> {
        design.validate()?;
        let d = design;
        let station = d.station;
        let mut net = NetworkBuilder::new();

        net.add_stage(
            FlowStart::new(
                START,
                pa(d.tube_ps),
                k(d.tube_ts),
                d.pod_mach,
                m2(d.inlet_area),
                Composition::air(),
            )
            .map_err(CycleError::stage(START))?,
        );

        let mut inlet = Inlet::new(INLET, d.ram_recovery).map_err(CycleError::stage(INLET))?;
        if let Some(mach) = d.inlet_exit_mach {
            inlet = inlet.with_exit_mach(mach).map_err(CycleError::stage(INLET))?;
        }
        inlet.statics = station.statics;
        net.add_stage(inlet);

        net.add_stage(
            AreaMachSolver::area(DIFFUSER, m2(d.effective_diffuser_area()), false)
                .map_err(CycleError::stage(DIFFUSER))?
                .with_station_config(station),
        );
        net.add_stage(Compressor::new(COMP1, d.comp1_pr, d.comp1_eff).map_err(CycleError::stage(COMP1))?);
        net.add_stage(
            AreaMachSolver::mach(COMP1_FUNNEL, d.comp1_funnel_mach)
                .map_err(CycleError::stage(COMP1_FUNNEL))?
                .with_station_config(station),
        );

        let split = WeightFlowSplitter::from_mode(
            SPLIT,
            kgps(d.split_w1),
            d.split_mode,
            (d.split_mach1, d.split_mach2),
            (
                m2(d.split_area1.unwrap_or(f64::NAN)),
                m2(d.split_area2.unwrap_or(f64::NAN)),
            ),
        )
        .map_err(CycleError::stage(SPLIT))?
        .with_station_config(station);
        net.add_stage(split);

        net.add_stage(Compressor::new(COMP2, d.comp2_pr, d.comp2_eff).map_err(CycleError::stage(COMP2))?);
        let funnel2 = match d.comp2_funnel_mode {
            SolveMode::Mach => AreaMachSolver::mach(COMP2_FUNNEL, d.comp2_funnel_mach),
            SolveMode::Area => AreaMachSolver::area(
                COMP2_FUNNEL,
                m2(d.comp2_funnel_area.unwrap_or(f64::NAN)),
                false,
            ),
        }
        .map_err(CycleError::stage(COMP2_FUNNEL))?
        .with_station_config(station);
        net.add_stage(funnel2);

        let mut nozzle = Nozzle::new(NOZZLE, d.nozzle_dpqp, pa(d.effective_ps_exhaust()))
            .map_err(CycleError::stage(NOZZLE))?;
        nozzle.statics = station.statics;
        net.add_stage(nozzle);

        net.add_stage(
            Performance::new(PERF, pa(d.ps_bearing_target)).map_err(CycleError::stage(PERF))?,
        );

        net.connect(START, "flow_out", INLET, "flow_in")?;
        net.connect(INLET, "flow_out", DIFFUSER, "flow_in")?;
        net.connect(DIFFUSER, "flow_out", COMP1, "flow_in")?;
        net.connect(COMP1, "flow_out", COMP1_FUNNEL, "flow_in")?;
        net.connect(COMP1_FUNNEL, "flow_out", SPLIT, "flow_in")?;
        net.connect(SPLIT, "flow_out1", COMP2, "flow_in")?;
        net.connect(SPLIT, "flow_out2", NOZZLE, "flow_in")?;
        net.connect(COMP2, "flow_out", COMP2_FUNNEL, "flow_in")?;

        net.connect(COMP1, "pwr", PERF, "c1_pwr")?;
        net.connect(COMP2, "pwr", PERF, "c2_pwr")?;
        net.connect(NOZZLE, "fg", PERF, "fg")?;
        net.connect(INLET, "f_ram", PERF, "f_ram")?;
        net.connect(COMP2_FUNNEL, "ps_out", PERF, "ps_bearing")?;

        Ok(Self {
            design: design.clone(),
            network: net.build()?,
        })
    }

    pub fn design(&self) -> &DesignPoint {
        &self.design
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// One pass through the network.
    pub fn evaluate(&self, fluid: &dyn FluidModel) -> CycleResult<CycleSolution> {
        let values = self.network.evaluate(fluid)?;
        let solution = CycleSolution::from_values(values)?;
        debug!(
            pwr_w = solution.pwr,
            fnet_n = solution.fnet,
            ps_bearing_resid = solution.ps_bearing_resid,
            "compression system evaluated"
        );
        Ok(solution)
    }
}
