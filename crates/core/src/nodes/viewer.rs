use crate::geometry::{objects_from_lists, EdgeObject};
use crate::graph::{NodeDefinition, NodeParams};
use crate::nodes::{edges_in, vertices_in, SocketInputs, SocketOutputs};

pub const NAME: &str = "Viewer";

pub const IN_VERTICES: &str = "Vertices";
pub const IN_EDGES: &str = "Edges";

pub fn definition() -> NodeDefinition {
    NodeDefinition {
        name: NAME.to_string(),
        category: "Outputs".to_string(),
        inputs: vec![vertices_in(IN_VERTICES), edges_in(IN_EDGES)],
        outputs: Vec::new(),
    }
}

pub fn default_params() -> NodeParams {
    NodeParams::default()
}

pub fn compute(
    _params: &NodeParams,
    _inputs: &SocketInputs,
    _outputs: &mut SocketOutputs,
) -> Result<(), String> {
    Ok(())
}

/// Objects shown by the viewer. Vertices without an edge input are shown as
/// point clouds.
pub fn capture(inputs: &SocketInputs) -> Vec<EdgeObject> {
    let Some(vertices) = inputs.vertices(IN_VERTICES) else {
        return Vec::new();
    };
    match inputs.edges(IN_EDGES) {
        Some(edges) => objects_from_lists(vertices, edges),
        None => vertices
            .iter()
            .map(|v| EdgeObject::new(v.clone(), Vec::new()))
            .collect(),
    }
}
