//! hl-core: foundation types for the pod compression-system workspace.
//!
//! - `units`: `uom` SI quantities and their constructors
//! - `ids`: typed indices for stages, ports and nodes
//! - `numeric`: finiteness checks
//! - `error`: the coarse error every crate error converts into

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{HlError, HlResult};
pub use ids::{CompId, NodeId, PortId};
pub use numeric::ensure_finite;
