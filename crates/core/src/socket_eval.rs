use std::collections::BTreeMap;

use crate::eval::{evaluate_from_with, EvalError, EvalReport, EvalState};
use crate::geometry::{EdgeLists, EdgeObject, VertexLists};
use crate::graph::{Graph, GraphError, Node, NodeId};
use crate::nodes::{adaptive_edges, viewer, SocketInputs, SocketOutputs, SocketValue};
use crate::nodes_builtin::compute_node;
use crate::registry::NodeRegistry;

type NodeSockets = BTreeMap<String, SocketValue>;

#[derive(Debug, Default)]
pub struct GraphEvalState {
    pub eval: EvalState,
    outputs: BTreeMap<NodeId, NodeSockets>,
}

#[derive(Debug)]
pub struct GraphEvalResult {
    pub report: EvalReport,
    /// Objects arriving at the output node's `Vertices`/`Edges` inputs.
    pub output: Vec<EdgeObject>,
}

impl GraphEvalState {
    pub fn new() -> Self {
        Self::default()
    }

    fn retain_nodes(&mut self, graph: &Graph) {
        self.eval.retain_nodes(graph);
        self.outputs.retain(|id, _| graph.node(*id).is_some());
    }

    pub fn socket_value(&self, node_id: NodeId, pin_name: &str) -> Option<&SocketValue> {
        self.outputs.get(&node_id)?.get(pin_name)
    }
}

pub fn evaluate_graph(
    graph: &Graph,
    output: NodeId,
    registry: &NodeRegistry,
    state: &mut GraphEvalState,
) -> Result<GraphEvalResult, GraphError> {
    state.retain_nodes(graph);
    let outputs = &mut state.outputs;
    let report = evaluate_from_with(graph, output, &mut state.eval, |node_id, params| {
        let node = graph
            .node(node_id)
            .ok_or_else(|| "missing node".to_string())?;
        let kind = registry
            .kind_from_name(&node.name)
            .ok_or_else(|| format!("unknown node type {}", node.name))?;

        let inputs = gather_inputs(graph, node, outputs)?;
        let linked: Vec<&str> = node
            .outputs
            .iter()
            .filter(|pin_id| graph.is_pin_linked(**pin_id))
            .filter_map(|pin_id| graph.pin(*pin_id).map(|pin| pin.name.as_str()))
            .collect();
        let mut node_outputs = SocketOutputs::new(linked);

        compute_node(kind, params, &inputs, &mut node_outputs)?;
        outputs.insert(node_id, node_outputs.into_values());
        Ok(())
    })?;

    for err in &report.errors {
        match err {
            EvalError::Node { node, .. } | EvalError::Upstream { node, .. } => {
                outputs.remove(node);
            }
        }
    }

    if !report.output_valid {
        return Ok(GraphEvalResult {
            report,
            output: Vec::new(),
        });
    }

    let node = graph.node(output).ok_or(GraphError::MissingNode(output))?;
    let captured = gather_inputs(graph, node, outputs)
        .map(|inputs| viewer::capture(&inputs))
        .unwrap_or_default();
    tracing::debug!("evaluated graph: {} object(s) at output", captured.len());

    Ok(GraphEvalResult {
        report,
        output: captured,
    })
}

fn gather_inputs(
    graph: &Graph,
    node: &Node,
    outputs: &BTreeMap<NodeId, NodeSockets>,
) -> Result<SocketInputs, String> {
    let mut inputs = SocketInputs::new();
    for pin_id in &node.inputs {
        let pin = graph
            .pin(*pin_id)
            .ok_or_else(|| "missing input pin".to_string())?;
        let Some(link) = graph.link_to(*pin_id) else {
            continue;
        };
        let from_pin = graph
            .pin(link.from)
            .ok_or_else(|| "missing upstream pin".to_string())?;
        let value = outputs
            .get(&from_pin.node)
            .and_then(|sockets| sockets.get(&from_pin.name))
            .filter(|value| value.pin_type() == pin.pin_type)
            .cloned();
        inputs.link(&pin.name, value);
    }
    Ok(inputs)
}

/// Socket values for a single Adaptive Edges update. `None` means the socket
/// is not linked.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveEdgesInputs {
    pub recipient_vertices: Option<VertexLists>,
    pub recipient_edges: Option<EdgeLists>,
    pub donor_vertices: Option<VertexLists>,
    pub donor_edges: Option<EdgeLists>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptiveEdgesOutputs {
    pub vertices: Option<VertexLists>,
    pub edges: Option<EdgeLists>,
}

/// Runs one Adaptive Edges update outside of any graph, with both outputs
/// treated as linked.
pub fn recompute(inputs: &AdaptiveEdgesInputs) -> Result<AdaptiveEdgesOutputs, String> {
    let mut sockets = SocketInputs::new();
    let values = [
        (
            adaptive_edges::RECIPIENT_VERTICES,
            inputs.recipient_vertices.clone().map(SocketValue::Vertices),
        ),
        (
            adaptive_edges::RECIPIENT_EDGES,
            inputs.recipient_edges.clone().map(SocketValue::Edges),
        ),
        (
            adaptive_edges::DONOR_VERTICES,
            inputs.donor_vertices.clone().map(SocketValue::Vertices),
        ),
        (
            adaptive_edges::DONOR_EDGES,
            inputs.donor_edges.clone().map(SocketValue::Edges),
        ),
    ];
    for (name, value) in values {
        if let Some(value) = value {
            sockets.link(name, Some(value));
        }
    }

    let mut outputs =
        SocketOutputs::all_linked(&[adaptive_edges::OUT_VERTICES, adaptive_edges::OUT_EDGES]);
    adaptive_edges::compute(&adaptive_edges::default_params(), &sockets, &mut outputs)?;

    let mut values = outputs.into_values();
    let vertices = match values.remove(adaptive_edges::OUT_VERTICES) {
        Some(SocketValue::Vertices(v)) => Some(v),
        _ => None,
    };
    let edges = match values.remove(adaptive_edges::OUT_EDGES) {
        Some(SocketValue::Edges(e)) => Some(e),
        _ => None,
    };
    Ok(AdaptiveEdgesOutputs { vertices, edges })
}
