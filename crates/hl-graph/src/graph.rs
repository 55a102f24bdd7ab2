//! Core graph data structures.

use hl_core::{CompId, NodeId, PortId};
use std::fmt;

/// Physical dimension of a scalar signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Power,
    Force,
    Pressure,
    Area,
    MassRate,
    Dimensionless,
}

impl Dimension {
    pub fn unit(self) -> &'static str {
        match self {
            Dimension::Power => "W",
            Dimension::Force => "N",
            Dimension::Pressure => "Pa",
            Dimension::Area => "m^2",
            Dimension::MassRate => "kg/s",
            Dimension::Dimensionless => "-",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Power => "power",
            Dimension::Force => "force",
            Dimension::Pressure => "pressure",
            Dimension::Area => "area",
            Dimension::MassRate => "mass rate",
            Dimension::Dimensionless => "ratio",
        };
        write!(f, "{} [{}]", name, self.unit())
    }
}

/// What travels along an edge: a full flow station or one scalar quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Flow,
    Scalar(Dimension),
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Flow => write!(f, "flow station"),
            SignalKind::Scalar(dim) => write!(f, "{}", dim),
        }
    }
}

/// Port declaration a stage publishes for the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub kind: SignalKind,
}

impl PortSpec {
    pub const fn flow(name: &'static str) -> Self {
        Self {
            name,
            kind: SignalKind::Flow,
        }
    }

    pub const fn scalar(name: &'static str, dim: Dimension) -> Self {
        Self {
            name,
            kind: SignalKind::Scalar(dim),
        }
    }
}

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Inlet,
    Outlet,
}

/// A node carries one outlet's value to every inlet reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// `stage.port` of the source outlet
    pub name: String,
    pub source: PortId,
}

/// A named, typed port on a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub comp: CompId,
    pub name: String,
    pub kind: PortKind,
    pub signal: SignalKind,
    /// Node this port writes (outlet) or reads (inlet); None while unconnected
    pub node: Option<NodeId>,
}

/// A stage in the network with ordered input and output ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: CompId,
    pub name: String,
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
}

/// The graph: a validated, immutable, acyclic stage network.
///
/// - Components, ports and nodes are stored in vectors indexed by their IDs.
/// - Node -> reader adjacency is compact (offsets into a flat list).
/// - `order` lists components so every source precedes its readers.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) components: Vec<Component>,
    pub(crate) ports: Vec<Port>,

    /// Node i's reader ports are node_readers[node_reader_offsets[i]..node_reader_offsets[i+1]].
    pub(crate) node_reader_offsets: Vec<usize>,
    pub(crate) node_readers: Vec<PortId>,

    pub(crate) order: Vec<CompId>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id.index() as usize)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.index() as usize)
    }

    /// Find a component by name.
    pub fn component_by_name(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Inlet ports reading a node.
    pub fn node_readers(&self, node_id: NodeId) -> &[PortId] {
        let idx = node_id.index() as usize;
        if idx >= self.nodes.len() {
            return &[];
        }
        let start = self.node_reader_offsets[idx];
        let end = self.node_reader_offsets[idx + 1];
        &self.node_readers[start..end]
    }

    /// Components in evaluation order.
    pub fn order(&self) -> &[CompId] {
        &self.order
    }

    /// `stage.port` label for a port.
    pub fn port_label(&self, id: PortId) -> String {
        match self.port(id) {
            Some(port) => {
                let comp = self
                    .component(port.comp)
                    .map_or("?", |c| c.name.as_str());
                format!("{}.{}", comp, port.name)
            }
            None => format!("port#{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_kinds_compare_by_dimension() {
        assert_eq!(
            SignalKind::Scalar(Dimension::Power),
            SignalKind::Scalar(Dimension::Power)
        );
        assert_ne!(
            SignalKind::Scalar(Dimension::Power),
            SignalKind::Scalar(Dimension::Force)
        );
        assert_ne!(SignalKind::Flow, SignalKind::Scalar(Dimension::Area));
    }

    #[test]
    fn port_spec_constructors() {
        let p = PortSpec::scalar("fg", Dimension::Force);
        assert_eq!(p.kind.to_string(), "force [N]");
        assert_eq!(PortSpec::flow("flow_in").kind, SignalKind::Flow);
    }
}
