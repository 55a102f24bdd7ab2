//! hl-components: stage library for the pod compression-system network.
//!
//! Provides the flow-station type and the stages that transform it:
//! - Flow start from ambient tube conditions
//! - Inlet with ram recovery and ram drag
//! - Area/Mach matching (diffusers, funnels)
//! - Weight-flow splitter
//! - Compressor and convergent nozzle
//! - Performance aggregation
//!
//! All stages implement the `Stage` trait and are deterministic functions of
//! their inputs and parameters. Total/static conversions go through `flow`.
//!
//! # Example
//!
//! ```no_run
//! use hl_components::{AreaMachSolver, FlowStart};
//! use hl_core::units::{k, m2, pa};
//! use hl_fluids::{Composition, IdealGasModel};
//!
//! let fluid = IdealGasModel::new();
//! let start = FlowStart::new("start", pa(99.0), k(292.6), 0.5, m2(2.0), Composition::air())
//!     .unwrap();
//! let approach = start.flow(&fluid).unwrap();
//!
//! let funnel = AreaMachSolver::mach("funnel", 0.3).unwrap();
//! let slowed = funnel.solve(&fluid, &approach).unwrap();
//! println!("area at M 0.3: {} m^2", slowed.flow.area().unwrap().value);
//! ```

pub mod area_mach;
pub mod common;
pub mod compressor;
pub mod error;
pub mod flow;
pub mod flow_start;
pub mod inlet;
pub mod nozzle;
pub mod performance;
pub mod splitter;
pub mod traits;

// Re-exports
pub use area_mach::{AreaMachSolver, AreaMatch, SolveMode, StaticTarget};
pub use compressor::{Compression, Compressor};
pub use error::{ComponentError, ComponentResult};
pub use flow::{
    BracketConfig, FlowState, FlowStationConfig, MachBranch, StaticSolveConfig, StaticState,
    TotalState, flow_area, statics_from_area, statics_from_mach, statics_from_ps,
};
pub use flow_start::FlowStart;
pub use inlet::{Inlet, InletCapture};
pub use nozzle::{Nozzle, NozzleExit};
pub use performance::{Performance, PerformanceSummary};
pub use splitter::{SplitTargets, WeightFlowSplitter};
pub use traits::{Signal, Stage};
