//! hl-cycle: pod compression-system network assembly and execution.
//!
//! - `network`: stage graph with typed ports, evaluated once in topological order
//! - `system`: the inlet, two-compressor, bearing/nozzle split system
//! - `design`: design-point configuration with named inputs and YAML/JSON I/O
//! - `driver`: named-input evaluation and Newton residual closure
//! - `tube`: tube approach flow, bypass flow and the Kantrowitz limit
//! - `sweep`: independent design points evaluated in parallel
//!
//! # Example
//!
//! ```no_run
//! use hl_cycle::{CompressionSystem, DesignPoint};
//! use hl_fluids::IdealGasModel;
//!
//! let system = CompressionSystem::new(&DesignPoint::default()).unwrap();
//! let solution = system.evaluate(&IdealGasModel::new()).unwrap();
//! println!("power {:.0} W, net thrust {:.1} N", solution.pwr, solution.fnet);
//! ```

pub mod design;
pub mod driver;
pub mod error;
pub mod network;
pub mod solution;
pub mod sweep;
pub mod system;
pub mod tube;

pub use design::{DesignPoint, INPUT_NAMES, load_json, load_yaml, save_json, save_yaml};
pub use driver::{DesignDriver, Driver, DriverOutput, DriverSolution, NewtonDriver};
pub use error::{CycleError, CycleResult};
pub use network::{Network, NetworkBuilder, NetworkValues};
pub use solution::CycleSolution;
pub use sweep::{SweepPoint, sweep};
pub use system::CompressionSystem;
pub use tube::{BypassFlow, KantrowitzLimit, KantrowitzReport, TubeConditions};
