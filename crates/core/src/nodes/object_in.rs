use std::collections::BTreeMap;

use crate::geometry::{EdgeLists, VertexLists};
use crate::graph::{NodeDefinition, NodeParams, ParamValue};
use crate::nodes::{edges_out, vertices_out, SocketInputs, SocketOutputs, SocketValue};

pub const NAME: &str = "Object In";

pub const OUT_VERTICES: &str = "Vertices";
pub const OUT_EDGES: &str = "Edges";

pub fn definition() -> NodeDefinition {
    NodeDefinition {
        name: NAME.to_string(),
        category: "Inputs".to_string(),
        inputs: Vec::new(),
        outputs: vec![vertices_out(OUT_VERTICES), edges_out(OUT_EDGES)],
    }
}

pub fn default_params() -> NodeParams {
    NodeParams {
        values: BTreeMap::from([
            ("vertices".to_string(), ParamValue::VertexLists(Vec::new())),
            ("edges".to_string(), ParamValue::EdgeLists(Vec::new())),
        ]),
    }
}

pub fn params_for(vertices: VertexLists, edges: EdgeLists) -> NodeParams {
    NodeParams {
        values: BTreeMap::from([
            ("vertices".to_string(), ParamValue::VertexLists(vertices)),
            ("edges".to_string(), ParamValue::EdgeLists(edges)),
        ]),
    }
}

pub fn compute(
    params: &NodeParams,
    _inputs: &SocketInputs,
    outputs: &mut SocketOutputs,
) -> Result<(), String> {
    if outputs.is_linked(OUT_VERTICES) {
        outputs.set(
            OUT_VERTICES,
            SocketValue::Vertices(params.get_vertex_lists("vertices")),
        );
    }
    if outputs.is_linked(OUT_EDGES) {
        outputs.set(OUT_EDGES, SocketValue::Edges(params.get_edge_lists("edges")));
    }
    Ok(())
}
