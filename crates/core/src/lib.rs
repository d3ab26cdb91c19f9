mod adaptive;
mod eval;
mod geometry;
mod graph;
mod nodes;
mod nodes_builtin;
mod project;
mod registry;
mod socket_eval;

pub use adaptive::{adaptive_edges, replicate_along_edges, DonorTemplate};
pub use eval::{evaluate_from_with, EvalError, EvalNodeReport, EvalReport, EvalState};
pub use geometry::{
    lists_from_objects, objects_from_lists, Aabb, Edge, EdgeLists, EdgeObject, Vertex,
    VertexLists,
};
pub use graph::{
    Graph, GraphError, Link, LinkId, Node, NodeDefinition, NodeId, NodeParams, ParamValue, Pin,
    PinDefinition, PinId, PinKind, PinType,
};
pub use nodes::obj_output::{write_obj, write_obj_to};
pub use nodes::{adaptive_edges as adaptive_edges_node, object_in, SocketInputs, SocketOutputs, SocketValue};
pub use nodes_builtin::{
    builtin_definitions, builtin_kind_from_name, compute_node, default_params, node_definition,
    BuiltinNodeKind,
};
pub use project::{Project, PROJECT_VERSION};
pub use registry::{builtin_registry, NodeRegistry};
pub use socket_eval::{
    evaluate_graph, recompute, AdaptiveEdgesInputs, AdaptiveEdgesOutputs, GraphEvalResult,
    GraphEvalState,
};
