use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use crate::graph::{Graph, GraphError, Node, NodeId, NodeParams, PinId};

/// Per-node cache entries kept between evaluations.
#[derive(Debug, Default)]
pub struct EvalState {
    nodes: BTreeMap<NodeId, NodeCache>,
}

#[derive(Debug, Default)]
struct NodeCache {
    signature: Option<u64>,
    output_version: u64,
}

#[derive(Debug, Default)]
pub struct EvalReport {
    pub ordered: Vec<NodeId>,
    pub computed: Vec<NodeId>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub node_reports: BTreeMap<NodeId, EvalNodeReport>,
    pub errors: Vec<EvalError>,
    pub output_valid: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvalNodeReport {
    pub duration_ms: f32,
    pub cache_hit: bool,
}

#[derive(Debug, Clone)]
pub enum EvalError {
    Node { node: NodeId, message: String },
    Upstream { node: NodeId, upstream: Vec<NodeId> },
}

impl EvalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops cache entries for nodes no longer in `graph`.
    pub fn retain_nodes(&mut self, graph: &Graph) {
        self.nodes.retain(|id, _| graph.node(*id).is_some());
    }

    fn output_version(&self, node_id: NodeId) -> u64 {
        self.nodes
            .get(&node_id)
            .map_or(0, |cache| cache.output_version)
    }
}

/// Walks the nodes feeding `output` upstream first and calls `compute` for
/// every node whose params, upstream outputs or links changed since the last
/// run. A failed node fails everything downstream of it.
pub fn evaluate_from_with<F>(
    graph: &Graph,
    output: NodeId,
    state: &mut EvalState,
    mut compute: F,
) -> Result<EvalReport, GraphError>
where
    F: FnMut(NodeId, &NodeParams) -> Result<(), String>,
{
    let ordered = graph.topo_sort_from(output)?;
    let mut report = EvalReport {
        ordered: ordered.clone(),
        output_valid: true,
        ..Default::default()
    };
    let mut failed = Vec::<NodeId>::new();

    for node_id in ordered {
        let node = graph
            .node(node_id)
            .ok_or(GraphError::MissingNode(node_id))?;
        let mut upstream = graph.upstream_nodes(node_id);
        upstream.sort();

        let upstream_failed: Vec<NodeId> = upstream
            .iter()
            .copied()
            .filter(|id| failed.contains(id))
            .collect();
        if !upstream_failed.is_empty() {
            state.nodes.entry(node_id).or_default().signature = None;
            report.errors.push(EvalError::Upstream {
                node: node_id,
                upstream: upstream_failed,
            });
            report.output_valid = false;
            report.node_reports.insert(node_id, EvalNodeReport::default());
            failed.push(node_id);
            continue;
        }

        let signature = node_signature(graph, node, &upstream, state);
        let cache = state.nodes.entry(node_id).or_default();
        if cache.signature == Some(signature) {
            report.cache_hits += 1;
            report.node_reports.insert(
                node_id,
                EvalNodeReport {
                    duration_ms: 0.0,
                    cache_hit: true,
                },
            );
            continue;
        }

        let start = Instant::now();
        let result = compute(node_id, &node.params);
        let duration_ms = start.elapsed().as_secs_f32() * 1000.0;
        report.node_reports.insert(
            node_id,
            EvalNodeReport {
                duration_ms,
                cache_hit: false,
            },
        );

        let cache = state.nodes.entry(node_id).or_default();
        match result {
            Ok(()) => {
                cache.signature = Some(signature);
                cache.output_version = cache.output_version.wrapping_add(1);
                report.cache_misses += 1;
                report.computed.push(node_id);
            }
            Err(message) => {
                tracing::warn!("node '{}' failed: {}", node.name, message);
                cache.signature = None;
                report.errors.push(EvalError::Node {
                    node: node_id,
                    message,
                });
                report.output_valid = false;
                failed.push(node_id);
            }
        }
    }

    Ok(report)
}

/// Hash of the node's param version, the output versions of its upstream
/// nodes, which pin feeds each input and whether each output has a reader.
fn node_signature(graph: &Graph, node: &Node, upstream: &[NodeId], state: &EvalState) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.param_version.hash(&mut hasher);
    for id in upstream {
        (*id, state.output_version(*id)).hash(&mut hasher);
    }
    for pin in &node.inputs {
        let source: Option<PinId> = graph.link_to(*pin).map(|link| link.from);
        (*pin, source).hash(&mut hasher);
    }
    for pin in &node.outputs {
        (*pin, graph.is_pin_linked(*pin)).hash(&mut hasher);
    }
    hasher.finish()
}
