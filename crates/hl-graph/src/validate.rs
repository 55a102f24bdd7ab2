//! Graph validation logic.

use hl_core::{CompId, NodeId, PortId};
use std::collections::{HashSet, VecDeque};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, Node, Port, PortKind};

/// All references exist, names are unique, node sources are outlets.
pub(crate) fn validate_structure(
    nodes: &[Node],
    components: &[Component],
    ports: &[Port],
) -> GraphResult<()> {
    let mut names = HashSet::new();
    for comp in components {
        if !names.insert(comp.name.as_str()) {
            return Err(GraphError::DuplicateComponent {
                name: comp.name.clone(),
            });
        }

        let mut port_names = HashSet::new();
        for &port_id in comp.inputs.iter().chain(comp.outputs.iter()) {
            let port = ports
                .get(port_id.index() as usize)
                .filter(|p| p.comp == comp.id)
                .ok_or(GraphError::InvalidCompRef {
                    port: port_id,
                    comp: comp.id,
                })?;
            if !port_names.insert(port.name.as_str()) {
                return Err(GraphError::DuplicatePortName {
                    comp: comp.name.clone(),
                    port: port.name.clone(),
                });
            }
        }
    }

    for port in ports {
        if port.comp.index() as usize >= components.len() {
            return Err(GraphError::InvalidCompRef {
                port: port.id,
                comp: port.comp,
            });
        }
    }

    for node in nodes {
        let ok = ports
            .get(node.source.index() as usize)
            .is_some_and(|p| p.kind == PortKind::Outlet && p.node == Some(node.id));
        if !ok {
            return Err(GraphError::InvalidNodeRef {
                node: node.id,
                port: node.source,
            });
        }
    }

    Ok(())
}

/// Every inlet has a source of the same signal kind.
pub(crate) fn validate_connections(
    nodes: &[Node],
    components: &[Component],
    ports: &[Port],
) -> GraphResult<()> {
    for comp in components {
        for &port_id in &comp.inputs {
            let port = &ports[port_id.index() as usize];
            let Some(node_id) = port.node else {
                return Err(GraphError::UnconnectedInput {
                    comp: comp.name.clone(),
                    port: port.name.clone(),
                });
            };
            let node = nodes
                .get(node_id.index() as usize)
                .ok_or(GraphError::InconsistentAdjacency {
                    port: port_id,
                    node: node_id,
                })?;
            let source = &ports[node.source.index() as usize];
            if source.signal != port.signal {
                return Err(GraphError::InconsistentUnits {
                    from: node.name.clone(),
                    to: format!("{}.{}", comp.name, port.name),
                    from_kind: source.signal,
                    to_kind: port.signal,
                });
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm; ties broken by insertion order.
pub(crate) fn topological_order(
    components: &[Component],
    ports: &[Port],
    nodes: &[Node],
) -> GraphResult<Vec<CompId>> {
    let n = components.len();
    let mut indegree = vec![0_usize; n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];

    for comp in components {
        let reader = comp.id.index() as usize;
        let mut sources = HashSet::new();
        for &port_id in &comp.inputs {
            if let Some(node_id) = ports[port_id.index() as usize].node {
                let node = &nodes[node_id.index() as usize];
                let writer = ports[node.source.index() as usize].comp.index() as usize;
                if sources.insert(writer) {
                    successors[writer].push(reader);
                    indegree[reader] += 1;
                }
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(i) = ready.pop_front() {
        order.push(components[i].id);
        for &j in &successors[i] {
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push_back(j);
            }
        }
    }

    if order.len() != n {
        let stages = (0..n)
            .filter(|&i| indegree[i] > 0)
            .map(|i| components[i].name.clone())
            .collect();
        return Err(GraphError::Cycle { stages });
    }
    Ok(order)
}

/// Reader lists reference inlets that read that node; every connected inlet appears once.
pub(crate) fn validate_adjacency(
    nodes: &[Node],
    ports: &[Port],
    node_reader_offsets: &[usize],
    node_readers: &[PortId],
) -> GraphResult<()> {
    if node_reader_offsets.len() != nodes.len() + 1 {
        return Err(GraphError::InconsistentAdjacency {
            port: PortId::from_index(0),
            node: nodes.first().map_or(NodeId::from_index(0), |n| n.id),
        });
    }

    let mut seen: HashSet<PortId> = HashSet::new();
    for node in nodes {
        let idx = node.id.index() as usize;
        for &port_id in &node_readers[node_reader_offsets[idx]..node_reader_offsets[idx + 1]] {
            let ok = ports
                .get(port_id.index() as usize)
                .is_some_and(|p| p.kind == PortKind::Inlet && p.node == Some(node.id));
            if !ok || !seen.insert(port_id) {
                return Err(GraphError::InconsistentAdjacency {
                    port: port_id,
                    node: node.id,
                });
            }
        }
    }

    for port in ports.iter().filter(|p| p.kind == PortKind::Inlet) {
        if let Some(node) = port.node {
            if !seen.contains(&port.id) {
                return Err(GraphError::InconsistentAdjacency {
                    port: port.id,
                    node,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SignalKind;

    fn port(id: u32, comp: u32, name: &str, kind: PortKind, node: Option<u32>) -> Port {
        Port {
            id: PortId::from_index(id),
            comp: CompId::from_index(comp),
            name: name.into(),
            kind,
            signal: SignalKind::Flow,
            node: node.map(NodeId::from_index),
        }
    }

    #[test]
    fn validate_empty_graph() {
        assert!(validate_structure(&[], &[], &[]).is_ok());
        assert!(topological_order(&[], &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn port_owned_by_other_component_is_rejected() {
        let components = vec![Component {
            id: CompId::from_index(0),
            name: "c".into(),
            inputs: vec![PortId::from_index(0)],
            outputs: vec![],
        }];
        let ports = vec![port(0, 7, "flow_in", PortKind::Inlet, None)];
        let err = validate_structure(&[], &components, &ports).unwrap_err();
        assert!(matches!(err, GraphError::InvalidCompRef { .. }));
    }

    #[test]
    fn node_sourced_by_inlet_is_rejected() {
        let components = vec![Component {
            id: CompId::from_index(0),
            name: "c".into(),
            inputs: vec![PortId::from_index(0)],
            outputs: vec![],
        }];
        let ports = vec![port(0, 0, "flow_in", PortKind::Inlet, Some(0))];
        let nodes = vec![Node {
            id: NodeId::from_index(0),
            name: "c.flow_in".into(),
            source: PortId::from_index(0),
        }];
        let err = validate_structure(&nodes, &components, &ports).unwrap_err();
        assert!(matches!(err, GraphError::InvalidNodeRef { .. }));
    }
}
