use std::collections::BTreeSet;

use crate::graph::{Graph, NodeDefinition, NodeId};
use crate::nodes_builtin::{builtin_kind_from_name, default_params, node_definition, BuiltinNodeKind};

/// Node kinds available to a graph. Kinds are added and removed through the
/// register/unregister lifecycle; evaluation refuses nodes whose kind is not
/// registered.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    kinds: BTreeSet<BuiltinNodeKind>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the kind was already registered.
    pub fn register(&mut self, kind: BuiltinNodeKind) -> bool {
        let added = self.kinds.insert(kind);
        if added {
            tracing::debug!("registered node kind '{}'", kind.name());
        }
        added
    }

    /// Returns `false` if the kind was not registered.
    pub fn unregister(&mut self, kind: BuiltinNodeKind) -> bool {
        let removed = self.kinds.remove(&kind);
        if removed {
            tracing::debug!("unregistered node kind '{}'", kind.name());
        }
        removed
    }

    pub fn is_registered(&self, kind: BuiltinNodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kind_from_name(&self, name: &str) -> Option<BuiltinNodeKind> {
        builtin_kind_from_name(name).filter(|kind| self.is_registered(*kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = BuiltinNodeKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn definitions(&self) -> Vec<NodeDefinition> {
        self.kinds().map(node_definition).collect()
    }

    /// Adds a node of `kind` with its default params.
    pub fn add_node(&self, graph: &mut Graph, kind: BuiltinNodeKind) -> Result<NodeId, String> {
        if !self.is_registered(kind) {
            return Err(format!("node kind '{}' is not registered", kind.name()));
        }
        let node_id = graph.add_node(node_definition(kind));
        for (key, value) in default_params(kind).values {
            graph
                .set_param(node_id, key, value)
                .map_err(|err| format!("{:?}", err))?;
        }
        Ok(node_id)
    }
}

pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    for kind in BuiltinNodeKind::ALL {
        registry.register(kind);
    }
    registry
}
