//! hl-fluids: gas properties for the pod compression system.
//!
//! [`FluidModel`] is the property oracle every flow stage talks to;
//! [`IdealGasModel`] implements it for thermally perfect mixtures of the dry
//! air constituents, each described by a NASA 7-term fit.
//!
//! ```
//! use hl_fluids::{Composition, FluidModel, IdealGasModel, StateInput};
//! use hl_core::units::{k, pa};
//!
//! let gas = IdealGasModel::new()
//!     .resolve(
//!         &Composition::air(),
//!         StateInput::PT { p: pa(101_325.0), t: k(300.0) },
//!     )
//!     .unwrap();
//! assert!((gas.density.value - 1.177).abs() < 0.01);
//! ```

pub mod composition;
pub mod error;
pub mod ideal_gas;
pub mod model;
pub mod species;
pub mod state;

pub use composition::Composition;
pub use error::{FluidError, FluidResult};
pub use ideal_gas::IdealGasModel;
pub use model::{FluidModel, GasState};
pub use species::{NasaPolynomial, Species};
pub use state::{SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput, ThermoState};
