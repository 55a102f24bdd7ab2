//! Incremental graph builder.

use hl_core::{CompId, NodeId, PortId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, Graph, Node, Port, PortKind, PortSpec};
use crate::validate;

/// Builder for constructing a stage graph incrementally.
///
/// Declare stages with `add_component`, wire outlets to inlets with `connect`,
/// then call `build()` to validate and freeze it into an immutable `Graph`.
/// Type mismatches are rejected as soon as a connection is made; unconnected
/// inputs and cycles are rejected by `build()`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    components: Vec<Component>,
    ports: Vec<Port>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage with its declared input and output ports.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        inputs: &[PortSpec],
        outputs: &[PortSpec],
    ) -> CompId {
        let comp_id = CompId::from_index(self.components.len() as u32);
        let inputs = inputs
            .iter()
            .map(|spec| self.push_port(comp_id, spec, PortKind::Inlet))
            .collect();
        let outputs = outputs
            .iter()
            .map(|spec| self.push_port(comp_id, spec, PortKind::Outlet))
            .collect();

        self.components.push(Component {
            id: comp_id,
            name: name.into(),
            inputs,
            outputs,
        });
        comp_id
    }

    fn push_port(&mut self, comp: CompId, spec: &PortSpec, kind: PortKind) -> PortId {
        let id = PortId::from_index(self.ports.len() as u32);
        self.ports.push(Port {
            id,
            comp,
            name: spec.name.to_string(),
            kind,
            signal: spec.kind,
            node: None,
        });
        id
    }

    /// Look up a port on a component by name.
    pub fn port(&self, comp: CompId, name: &str) -> GraphResult<PortId> {
        let component = self
            .components
            .get(comp.index() as usize)
            .ok_or_else(|| GraphError::PortNotFound {
                comp: format!("#{}", comp),
                port: name.to_string(),
            })?;
        component
            .inputs
            .iter()
            .chain(component.outputs.iter())
            .copied()
            .find(|id| self.ports[id.index() as usize].name == name)
            .ok_or_else(|| GraphError::PortNotFound {
                comp: component.name.clone(),
                port: name.to_string(),
            })
    }

    fn label(&self, id: PortId) -> String {
        match self.ports.get(id.index() as usize) {
            Some(port) => {
                let comp = self
                    .components
                    .get(port.comp.index() as usize)
                    .map_or("?", |c| c.name.as_str());
                format!("{}.{}", comp, port.name)
            }
            None => format!("port#{}", id),
        }
    }

    fn existing_port(&self, id: PortId) -> GraphResult<&Port> {
        self.ports
            .get(id.index() as usize)
            .ok_or_else(|| GraphError::PortNotFound {
                comp: "?".to_string(),
                port: format!("#{}", id),
            })
    }

    /// Wire an outlet to an inlet and return the node carrying the value.
    ///
    /// An outlet may feed several inlets; an inlet has exactly one source.
    pub fn connect(&mut self, from: PortId, to: PortId) -> GraphResult<NodeId> {
        let (src_kind, src_signal, src_node) = {
            let p = self.existing_port(from)?;
            (p.kind, p.signal, p.node)
        };
        let (dst_kind, dst_signal, dst_node) = {
            let p = self.existing_port(to)?;
            (p.kind, p.signal, p.node)
        };

        if src_kind != PortKind::Outlet || dst_kind != PortKind::Inlet {
            return Err(GraphError::PortDirection {
                from: self.label(from),
                to: self.label(to),
            });
        }
        if src_signal != dst_signal {
            return Err(GraphError::InconsistentUnits {
                from: self.label(from),
                to: self.label(to),
                from_kind: src_signal,
                to_kind: dst_signal,
            });
        }
        if dst_node.is_some() {
            return Err(GraphError::DuplicateConnection { to: self.label(to) });
        }

        let node_id = match src_node {
            Some(node) => node,
            None => {
                let id = NodeId::from_index(self.nodes.len() as u32);
                let name = self.label(from);
                self.nodes.push(Node {
                    id,
                    name,
                    source: from,
                });
                self.ports[from.index() as usize].node = Some(id);
                id
            }
        };
        self.ports[to.index() as usize].node = Some(node_id);
        Ok(node_id)
    }

    /// `connect` by component ids and port names.
    pub fn connect_named(
        &mut self,
        from_comp: CompId,
        from_port: &str,
        to_comp: CompId,
        to_port: &str,
    ) -> GraphResult<NodeId> {
        let from = self.port(from_comp, from_port)?;
        let to = self.port(to_comp, to_port)?;
        self.connect(from, to)
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_structure(&self.nodes, &self.components, &self.ports)?;
        validate::validate_connections(&self.nodes, &self.components, &self.ports)?;

        let order = validate::topological_order(&self.components, &self.ports, &self.nodes)?;
        let (node_reader_offsets, node_readers) = Self::build_adjacency(&self.nodes, &self.ports);
        validate::validate_adjacency(&self.nodes, &self.ports, &node_reader_offsets, &node_readers)?;

        Ok(Graph {
            nodes: self.nodes,
            components: self.components,
            ports: self.ports,
            node_reader_offsets,
            node_readers,
            order,
        })
    }

    /// Compact node -> reader lists, ports sorted by id for determinism.
    fn build_adjacency(nodes: &[Node], ports: &[Port]) -> (Vec<usize>, Vec<PortId>) {
        let mut per_node: Vec<Vec<PortId>> = vec![Vec::new(); nodes.len()];
        for port in ports.iter().filter(|p| p.kind == PortKind::Inlet) {
            if let Some(node) = port.node {
                if let Some(list) = per_node.get_mut(node.index() as usize) {
                    list.push(port.id);
                }
            }
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::new();
        offsets.push(0);
        for mut list in per_node {
            list.sort_by_key(|p| p.index());
            flat.extend(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Dimension;

    fn duct(builder: &mut GraphBuilder, name: &str) -> CompId {
        builder.add_component(name, &[PortSpec::flow("flow_in")], &[PortSpec::flow("flow_out")])
    }

    #[test]
    fn builder_basic() {
        let mut builder = GraphBuilder::new();
        let a = duct(&mut builder, "a");
        let b = duct(&mut builder, "b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(builder.ports.len(), 4);
        assert!(builder.port(a, "flow_out").is_ok());
        assert!(matches!(
            builder.port(a, "nope"),
            Err(GraphError::PortNotFound { .. })
        ));
    }

    #[test]
    fn fan_out_shares_one_node() {
        let mut builder = GraphBuilder::new();
        let src = builder.add_component("src", &[], &[PortSpec::flow("flow_out")]);
        let a = duct(&mut builder, "a");
        let b = duct(&mut builder, "b");
        let n1 = builder.connect_named(src, "flow_out", a, "flow_in").unwrap();
        let n2 = builder.connect_named(src, "flow_out", b, "flow_in").unwrap();
        assert_eq!(n1, n2);
        assert_eq!(builder.nodes.len(), 1);
        assert_eq!(builder.nodes[0].name, "src.flow_out");
    }

    #[test]
    fn mismatched_kinds_rejected_at_connect() {
        let mut builder = GraphBuilder::new();
        let comp = builder.add_component(
            "comp",
            &[],
            &[PortSpec::scalar("power", Dimension::Power)],
        );
        let perf = builder.add_component("perf", &[PortSpec::scalar("fg", Dimension::Force)], &[]);
        let err = builder.connect_named(comp, "power", perf, "fg").unwrap_err();
        assert!(matches!(err, GraphError::InconsistentUnits { .. }));
    }

    #[test]
    fn direction_and_duplicates_rejected() {
        let mut builder = GraphBuilder::new();
        let a = duct(&mut builder, "a");
        let b = duct(&mut builder, "b");
        let err = builder.connect_named(b, "flow_in", a, "flow_out").unwrap_err();
        assert!(matches!(err, GraphError::PortDirection { .. }));

        builder.connect_named(a, "flow_out", b, "flow_in").unwrap();
        let err = builder.connect_named(a, "flow_out", b, "flow_in").unwrap_err();
        assert!(matches!(err, GraphError::DuplicateConnection { .. }));
    }
}
