//! hl-graph: typed-port stage graph for the compression system.
//!
//! Provides:
//! - Stage graph data structures (Node, Component, Port, Graph)
//! - Typed port declarations (`PortSpec`, `SignalKind`, `Dimension`)
//! - Incremental builder with connection checks and build-time validation
//! - Topological evaluation order
//!
//! # Example
//!
//! ```
//! use hl_graph::{GraphBuilder, PortSpec};
//!
//! let mut builder = GraphBuilder::new();
//! let start = builder.add_component("start", &[], &[PortSpec::flow("flow_out")]);
//! let duct = builder.add_component(
//!     "duct",
//!     &[PortSpec::flow("flow_in")],
//!     &[PortSpec::flow("flow_out")],
//! );
//! builder.connect_named(start, "flow_out", duct, "flow_in").unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.components().len(), 2);
//! assert_eq!(graph.order(), &[start, duct]);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Component, Dimension, Graph, Node, Port, PortKind, PortSpec, SignalKind};
