pub mod adaptive_edges;
pub mod obj_output;
pub mod object_in;
pub mod viewer;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeLists, VertexLists};
use crate::graph::{PinDefinition, PinType};

pub fn vertices_in(name: &str) -> PinDefinition {
    PinDefinition {
        name: name.to_string(),
        pin_type: PinType::Vertices,
    }
}

pub fn vertices_out(name: &str) -> PinDefinition {
    vertices_in(name)
}

pub fn edges_in(name: &str) -> PinDefinition {
    PinDefinition {
        name: name.to_string(),
        pin_type: PinType::Edges,
    }
}

pub fn edges_out(name: &str) -> PinDefinition {
    edges_in(name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    Vertices(VertexLists),
    Edges(EdgeLists),
}

impl SocketValue {
    pub fn pin_type(&self) -> PinType {
        match self {
            SocketValue::Vertices(_) => PinType::Vertices,
            SocketValue::Edges(_) => PinType::Edges,
        }
    }
}

/// Values arriving at a node's input pins for one update.
#[derive(Debug, Clone, Default)]
pub struct SocketInputs {
    linked: BTreeSet<String>,
    values: BTreeMap<String, SocketValue>,
}

impl SocketInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as linked and stores the upstream value, if any.
    pub fn link(&mut self, name: &str, value: Option<SocketValue>) {
        self.linked.insert(name.to_string());
        match value {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.remove(name);
            }
        }
    }

    pub fn with_link(mut self, name: &str, value: SocketValue) -> Self {
        self.link(name, Some(value));
        self
    }

    pub fn is_linked(&self, name: &str) -> bool {
        self.linked.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&SocketValue> {
        self.values.get(name)
    }

    pub fn vertices(&self, name: &str) -> Option<&VertexLists> {
        match self.values.get(name) {
            Some(SocketValue::Vertices(v)) => Some(v),
            _ => None,
        }
    }

    pub fn edges(&self, name: &str) -> Option<&EdgeLists> {
        match self.values.get(name) {
            Some(SocketValue::Edges(e)) => Some(e),
            _ => None,
        }
    }
}

/// Output pins of a node for one update, with the names of pins that have
/// downstream links.
#[derive(Debug, Clone, Default)]
pub struct SocketOutputs {
    linked: BTreeSet<String>,
    values: BTreeMap<String, SocketValue>,
}

impl SocketOutputs {
    pub fn new<'a>(linked: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            linked: linked.into_iter().map(str::to_string).collect(),
            values: BTreeMap::new(),
        }
    }

    pub fn all_linked(names: &[&str]) -> Self {
        Self::new(names.iter().copied())
    }

    pub fn is_linked(&self, name: &str) -> bool {
        self.linked.contains(name)
    }

    pub fn set(&mut self, name: &str, value: SocketValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&SocketValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> BTreeMap<String, SocketValue> {
        self.values
    }
}

pub fn require_vertices<'a>(inputs: &'a SocketInputs, name: &str) -> Result<&'a VertexLists, String> {
    inputs
        .vertices(name)
        .ok_or_else(|| format!("missing input '{}'", name))
}

pub fn require_edges<'a>(inputs: &'a SocketInputs, name: &str) -> Result<&'a EdgeLists, String> {
    inputs
        .edges(name)
        .ok_or_else(|| format!("missing input '{}'", name))
}
