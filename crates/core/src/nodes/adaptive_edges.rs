use crate::adaptive::adaptive_edges;
use crate::graph::{NodeDefinition, NodeParams};
use crate::nodes::{edges_in, edges_out, vertices_in, vertices_out, SocketInputs, SocketOutputs, SocketValue};
use crate::nodes_builtin::BuiltinNodeKind;
use crate::registry::NodeRegistry;

pub const NAME: &str = "Adaptive Edges";

pub const RECIPIENT_VERTICES: &str = "VersR";
pub const RECIPIENT_EDGES: &str = "EdgeR";
pub const DONOR_VERTICES: &str = "VersD";
pub const DONOR_EDGES: &str = "EdgeD";
pub const INPUTS: [&str; 4] = [RECIPIENT_VERTICES, RECIPIENT_EDGES, DONOR_VERTICES, DONOR_EDGES];

pub const OUT_VERTICES: &str = "Vertices";
pub const OUT_EDGES: &str = "Edges";

pub fn definition() -> NodeDefinition {
    NodeDefinition {
        name: NAME.to_string(),
        category: "Modifiers".to_string(),
        inputs: vec![
            vertices_in(RECIPIENT_VERTICES),
            edges_in(RECIPIENT_EDGES),
            vertices_in(DONOR_VERTICES),
            edges_in(DONOR_EDGES),
        ],
        outputs: vec![vertices_out(OUT_VERTICES), edges_out(OUT_EDGES)],
    }
}

pub fn default_params() -> NodeParams {
    NodeParams::default()
}

pub fn register(registry: &mut NodeRegistry) -> bool {
    registry.register(BuiltinNodeKind::AdaptiveEdges)
}

pub fn unregister(registry: &mut NodeRegistry) -> bool {
    registry.unregister(BuiltinNodeKind::AdaptiveEdges)
}

/// Maps the donor edge-chain onto every recipient edge. Does nothing until all
/// four inputs are linked and carry data.
pub fn compute(
    _params: &NodeParams,
    inputs: &SocketInputs,
    outputs: &mut SocketOutputs,
) -> Result<(), String> {
    if let Some(name) = INPUTS.iter().find(|name| !inputs.is_linked(name)) {
        tracing::debug!("adaptive edges: input '{}' is not linked, skipping", name);
        return Ok(());
    }

    let (Some(vers_r), Some(edge_r), Some(vers_d), Some(edge_d)) = (
        inputs.vertices(RECIPIENT_VERTICES),
        inputs.edges(RECIPIENT_EDGES),
        inputs.vertices(DONOR_VERTICES),
        inputs.edges(DONOR_EDGES),
    ) else {
        tracing::debug!("adaptive edges: upstream produced no data, skipping");
        return Ok(());
    };

    let (vertices, edges) = adaptive_edges(vers_r, edge_r, vers_d, edge_d)?;

    if outputs.is_linked(OUT_VERTICES) {
        outputs.set(OUT_VERTICES, SocketValue::Vertices(vertices));
    }
    if outputs.is_linked(OUT_EDGES) {
        outputs.set(OUT_EDGES, SocketValue::Edges(edges));
    }
    Ok(())
}
