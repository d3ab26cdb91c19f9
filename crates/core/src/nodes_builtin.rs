use serde::{Deserialize, Serialize};

use crate::graph::{NodeDefinition, NodeParams};
use crate::nodes::{self, SocketInputs, SocketOutputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuiltinNodeKind {
    ObjectIn,
    AdaptiveEdges,
    ObjOutput,
    Viewer,
}

impl BuiltinNodeKind {
    pub const ALL: [BuiltinNodeKind; 4] = [
        BuiltinNodeKind::ObjectIn,
        BuiltinNodeKind::AdaptiveEdges,
        BuiltinNodeKind::ObjOutput,
        BuiltinNodeKind::Viewer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinNodeKind::ObjectIn => nodes::object_in::NAME,
            BuiltinNodeKind::AdaptiveEdges => nodes::adaptive_edges::NAME,
            BuiltinNodeKind::ObjOutput => nodes::obj_output::NAME,
            BuiltinNodeKind::Viewer => nodes::viewer::NAME,
        }
    }
}

pub fn builtin_kind_from_name(name: &str) -> Option<BuiltinNodeKind> {
    match name {
        nodes::object_in::NAME => Some(BuiltinNodeKind::ObjectIn),
        nodes::adaptive_edges::NAME => Some(BuiltinNodeKind::AdaptiveEdges),
        nodes::obj_output::NAME => Some(BuiltinNodeKind::ObjOutput),
        nodes::viewer::NAME => Some(BuiltinNodeKind::Viewer),
        _ => None,
    }
}

pub fn builtin_definitions() -> Vec<NodeDefinition> {
    BuiltinNodeKind::ALL
        .iter()
        .map(|kind| node_definition(*kind))
        .collect()
}

pub fn node_definition(kind: BuiltinNodeKind) -> NodeDefinition {
    match kind {
        BuiltinNodeKind::ObjectIn => nodes::object_in::definition(),
        BuiltinNodeKind::AdaptiveEdges => nodes::adaptive_edges::definition(),
        BuiltinNodeKind::ObjOutput => nodes::obj_output::definition(),
        BuiltinNodeKind::Viewer => nodes::viewer::definition(),
    }
}

pub fn default_params(kind: BuiltinNodeKind) -> NodeParams {
    match kind {
        BuiltinNodeKind::ObjectIn => nodes::object_in::default_params(),
        BuiltinNodeKind::AdaptiveEdges => nodes::adaptive_edges::default_params(),
        BuiltinNodeKind::ObjOutput => nodes::obj_output::default_params(),
        BuiltinNodeKind::Viewer => nodes::viewer::default_params(),
    }
}

pub fn compute_node(
    kind: BuiltinNodeKind,
    params: &NodeParams,
    inputs: &SocketInputs,
    outputs: &mut SocketOutputs,
) -> Result<(), String> {
    match kind {
        BuiltinNodeKind::ObjectIn => nodes::object_in::compute(params, inputs, outputs),
        BuiltinNodeKind::AdaptiveEdges => nodes::adaptive_edges::compute(params, inputs, outputs),
        BuiltinNodeKind::ObjOutput => nodes::obj_output::compute(params, inputs, outputs),
        BuiltinNodeKind::Viewer => nodes::viewer::compute(params, inputs, outputs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in BuiltinNodeKind::ALL {
            assert_eq!(builtin_kind_from_name(kind.name()), Some(kind));
            assert_eq!(node_definition(kind).name, kind.name());
        }
        assert_eq!(builtin_kind_from_name("Sphere"), None);
    }

    #[test]
    fn adaptive_edges_has_four_inputs_two_outputs() {
        let def = node_definition(BuiltinNodeKind::AdaptiveEdges);
        let inputs: Vec<&str> = def.inputs.iter().map(|pin| pin.name.as_str()).collect();
        let outputs: Vec<&str> = def.outputs.iter().map(|pin| pin.name.as_str()).collect();
        assert_eq!(inputs, vec!["VersR", "EdgeR", "VersD", "EdgeD"]);
        assert_eq!(outputs, vec!["Vertices", "Edges"]);
    }
}
