//! Graph-specific error types.

use crate::graph::SignalKind;
use hl_core::{CompId, HlError, NodeId, PortId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A port refers to a component that doesn't exist.
    InvalidCompRef { port: PortId, comp: CompId },

    /// A node refers to a port that doesn't exist or is not an outlet.
    InvalidNodeRef { node: NodeId, port: PortId },

    /// Two components share a name.
    DuplicateComponent { name: String },

    /// A component declares the same port name twice.
    DuplicatePortName { comp: String, port: String },

    /// Named port not found on a component.
    PortNotFound { comp: String, port: String },

    /// A connection must run from an outlet to an inlet.
    PortDirection { from: String, to: String },

    /// Connected ports carry different physical quantities.
    InconsistentUnits {
        from: String,
        to: String,
        from_kind: SignalKind,
        to_kind: SignalKind,
    },

    /// An inlet already has a source.
    DuplicateConnection { to: String },

    /// A mandatory inlet has no source.
    UnconnectedInput { comp: String, port: String },

    /// Components form a cycle; names are the stages left unordered.
    Cycle { stages: Vec<String> },

    /// Adjacency list is inconsistent.
    InconsistentAdjacency { port: PortId, node: NodeId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidCompRef { port, comp } => {
                write!(f, "Port {} refers to non-existent component {}", port, comp)
            }
            GraphError::InvalidNodeRef { node, port } => {
                write!(f, "Node {} refers to invalid source port {}", node, port)
            }
            GraphError::DuplicateComponent { name } => {
                write!(f, "Component name '{}' is used more than once", name)
            }
            GraphError::DuplicatePortName { comp, port } => {
                write!(f, "Component '{}' declares port '{}' twice", comp, port)
            }
            GraphError::PortNotFound { comp, port } => {
                write!(f, "Component '{}' has no port '{}'", comp, port)
            }
            GraphError::PortDirection { from, to } => {
                write!(f, "Cannot connect {} -> {}: must run outlet -> inlet", from, to)
            }
            GraphError::InconsistentUnits {
                from,
                to,
                from_kind,
                to_kind,
            } => {
                write!(
                    f,
                    "Inconsistent units connecting {} ({}) -> {} ({})",
                    from, from_kind, to, to_kind
                )
            }
            GraphError::DuplicateConnection { to } => {
                write!(f, "Inlet {} is already connected", to)
            }
            GraphError::UnconnectedInput { comp, port } => {
                write!(f, "Input '{}.{}' is not connected", comp, port)
            }
            GraphError::Cycle { stages } => {
                write!(f, "Stage graph has a cycle through: {}", stages.join(", "))
            }
            GraphError::InconsistentAdjacency { port, node } => {
                write!(
                    f,
                    "Port {} in node {}'s adjacency list but doesn't reference that node",
                    port, node
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for HlError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InconsistentUnits { .. } => HlError::InvalidArg {
                what: "inconsistent units at connection",
            },
            GraphError::UnconnectedInput { .. } => HlError::InvalidArg {
                what: "unconnected input",
            },
            _ => HlError::Invariant {
                what: "invalid stage graph",
            },
        }
    }
}
