//! Stage network: typed wiring plus a single-pass executor.

use crate::error::{CycleError, CycleResult};
use hl_components::{FlowState, Signal, Stage};
use hl_core::{CompId, NodeId};
use hl_fluids::FluidModel;
use hl_graph::{Graph, GraphBuilder};
use std::collections::BTreeMap;
use tracing::trace;

/// Collects stages and their connections, then validates them into a `Network`.
#[derive(Default)]
pub struct NetworkBuilder {
    graph: GraphBuilder,
    stages: Vec<Box<dyn Stage>>,
    ids: BTreeMap<String, CompId>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage; its declared ports become graph ports.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> CompId {
        let id = self
            .graph
            .add_component(stage.name(), stage.inputs(), stage.outputs());
        // A repeated name is reported by `build`
        self.ids.entry(stage.name().to_string()).or_insert(id);
        self.stages.push(Box::new(stage));
        id
    }

    pub fn stage_id(&self, name: &str) -> CycleResult<CompId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| CycleError::UnknownStage {
                name: name.to_string(),
            })
    }

    /// Connect `from_stage.from_port` (an output) to `to_stage.to_port` (an input).
    pub fn connect(
        &mut self,
        from_stage: &str,
        from_port: &str,
        to_stage: &str,
        to_port: &str,
    ) -> CycleResult<NodeId> {
        let from = self.stage_id(from_stage)?;
        let to = self.stage_id(to_stage)?;
        Ok(self.graph.connect_named(from, from_port, to, to_port)?)
    }

    pub fn build(self) -> CycleResult<Network> {
        let graph = self.graph.build()?;
        Ok(Network {
            graph,
            stages: self.stages,
        })
    }
}

/// A validated, acyclic network of stages.
///
/// Stages are stored in component-id order; evaluation walks the graph's
/// topological order once and moves every signal by value.
pub struct Network {
    graph: Graph,
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("stages", &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Network {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stage(&self, name: &str) -> Option<&dyn Stage> {
        self.graph
            .component_by_name(name)
            .and_then(|c| self.stages.get(c.id.index() as usize))
            .map(|s| s.as_ref())
    }

    /// Evaluate every stage once in topological order.
    ///
    /// The first stage failure aborts the pass and is returned with the
    /// stage's name.
    pub fn evaluate(&self, fluid: &dyn FluidModel) -> CycleResult<NetworkValues> {
        let mut node_values: Vec<Option<Signal>> = vec![None; self.graph.nodes().len()];
        let mut values = NetworkValues::default();

        for &comp_id in self.graph.order() {
            let comp = self
                .graph
                .component(comp_id)
                .ok_or_else(|| invariant(format!("component {comp_id} missing from graph")))?;
            let stage = self
                .stages
                .get(comp_id.index() as usize)
                .ok_or_else(|| invariant(format!("no stage for component '{}'", comp.name)))?;

            let mut inputs = Vec::with_capacity(comp.inputs.len());
            for &port_id in &comp.inputs {
                let signal = self
                    .graph
                    .port(port_id)
                    .and_then(|p| p.node)
                    .and_then(|n| node_values.get(n.index() as usize))
                    .and_then(Option::as_ref)
                    .ok_or_else(|| {
                        invariant(format!("no value reached {}", self.graph.port_label(port_id)))
                    })?;
                inputs.push(signal.clone());
            }

            trace!(stage = %comp.name, "evaluate stage");
            let outputs = stage
                .evaluate(fluid, &inputs)
                .map_err(CycleError::stage(comp.name.as_str()))?;
            if outputs.len() != comp.outputs.len() {
                return Err(invariant(format!(
                    "stage '{}' returned {} outputs, declared {}",
                    comp.name,
                    outputs.len(),
                    comp.outputs.len()
                )));
            }

            for (&port_id, signal) in comp.outputs.iter().zip(outputs) {
                let port = self
                    .graph
                    .port(port_id)
                    .ok_or_else(|| invariant(format!("port {port_id} missing from graph")))?;
                if signal.kind() != port.signal {
                    return Err(invariant(format!(
                        "{} produced a {} signal, declared {}",
                        self.graph.port_label(port_id),
                        signal.kind(),
                        port.signal
                    )));
                }
                if let Some(node) = port.node {
                    if let Some(slot) = node_values.get_mut(node.index() as usize) {
                        *slot = Some(signal.clone());
                    }
                }
                values
                    .signals
                    .insert(format!("{}.{}", comp.name, port.name), signal);
            }
        }

        Ok(values)
    }
}

fn invariant(what: String) -> CycleError {
    CycleError::Invariant { what }
}

/// Every output signal of one evaluation, keyed `stage.port`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkValues {
    signals: BTreeMap<String, Signal>,
}

impl NetworkValues {
    pub fn get(&self, stage: &str, port: &str) -> Option<&Signal> {
        self.signals.get(&format!("{stage}.{port}"))
    }

    pub fn flow(&self, stage: &str, port: &str) -> CycleResult<&FlowState> {
        match self.get(stage, port) {
            Some(Signal::Flow(flow)) => Ok(flow),
            _ => Err(CycleError::UnknownOutput {
                name: format!("{stage}.{port}"),
            }),
        }
    }

    /// SI value of a scalar output.
    pub fn scalar(&self, stage: &str, port: &str) -> CycleResult<f64> {
        self.get(stage, port)
            .and_then(Signal::scalar_value)
            .ok_or_else(|| CycleError::UnknownOutput {
                name: format!("{stage}.{port}"),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signal)> {
        self.signals.iter().map(|(k, v)| (k.as_str(), v))
    }
}
