use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeLists, VertexLists};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    pins: BTreeMap<PinId, Pin>,
    links: BTreeMap<LinkId, Link>,
    next_node_id: u64,
    next_pin_id: u64,
    next_link_id: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            pins: BTreeMap::new(),
            links: BTreeMap::new(),
            next_node_id: 1,
            next_pin_id: 1,
            next_link_id: 1,
        }
    }
}

impl Graph {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(&id)
    }

    pub fn input_pin(&self, node_id: NodeId, name: &str) -> Option<PinId> {
        self.find_pin(node_id, name, PinKind::Input)
    }

    pub fn output_pin(&self, node_id: NodeId, name: &str) -> Option<PinId> {
        self.find_pin(node_id, name, PinKind::Output)
    }

    fn find_pin(&self, node_id: NodeId, name: &str, kind: PinKind) -> Option<PinId> {
        let node = self.nodes.get(&node_id)?;
        let pins = match kind {
            PinKind::Input => &node.inputs,
            PinKind::Output => &node.outputs,
        };
        pins.iter()
            .copied()
            .find(|pin_id| self.pins.get(pin_id).is_some_and(|pin| pin.name == name))
    }

    pub fn add_node(&mut self, def: NodeDefinition) -> NodeId {
        let node_id = self.alloc_node_id();
        let mut input_ids = Vec::new();
        let mut output_ids = Vec::new();

        for input in def.inputs {
            let pin_id = self.alloc_pin_id();
            self.pins.insert(
                pin_id,
                Pin {
                    id: pin_id,
                    node: node_id,
                    name: input.name,
                    kind: PinKind::Input,
                    pin_type: input.pin_type,
                },
            );
            input_ids.push(pin_id);
        }

        for output in def.outputs {
            let pin_id = self.alloc_pin_id();
            self.pins.insert(
                pin_id,
                Pin {
                    id: pin_id,
                    node: node_id,
                    name: output.name,
                    kind: PinKind::Output,
                    pin_type: output.pin_type,
                },
            );
            output_ids.push(pin_id);
        }

        self.nodes.insert(
            node_id,
            Node {
                id: node_id,
                name: def.name,
                inputs: input_ids,
                outputs: output_ids,
                params: NodeParams::default(),
                category: def.category,
                param_version: 0,
            },
        );

        node_id
    }

    pub fn remove_node(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&node_id) else {
            return false;
        };

        let mut pins_to_remove: HashSet<PinId> = node.inputs.into_iter().collect();
        pins_to_remove.extend(node.outputs);

        self.links.retain(|_, link| {
            !pins_to_remove.contains(&link.from) && !pins_to_remove.contains(&link.to)
        });

        for pin_id in pins_to_remove {
            self.pins.remove(&pin_id);
        }

        true
    }

    pub fn add_link(&mut self, from: PinId, to: PinId) -> Result<LinkId, GraphError> {
        let from_pin = self.pins.get(&from).ok_or(GraphError::MissingPin(from))?;
        let to_pin = self.pins.get(&to).ok_or(GraphError::MissingPin(to))?;

        if from_pin.kind != PinKind::Output || to_pin.kind != PinKind::Input {
            return Err(GraphError::WrongPinDirection { from, to });
        }

        if self.links.values().any(|link| link.to == to) {
            return Err(GraphError::InputAlreadyConnected { to });
        }

        if from_pin.pin_type != to_pin.pin_type {
            return Err(GraphError::IncompatiblePinTypes {
                from: from_pin.pin_type,
                to: to_pin.pin_type,
            });
        }

        let link_id = self.alloc_link_id();
        self.links.insert(
            link_id,
            Link {
                id: link_id,
                from,
                to,
            },
        );
        Ok(link_id)
    }

    pub fn remove_link(&mut self, link_id: LinkId) -> bool {
        self.links.remove(&link_id).is_some()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn link_to(&self, pin_id: PinId) -> Option<&Link> {
        self.links.values().find(|link| link.to == pin_id)
    }

    pub fn is_pin_linked(&self, pin_id: PinId) -> bool {
        self.links
            .values()
            .any(|link| link.from == pin_id || link.to == pin_id)
    }

    pub fn remove_links_for_pin(&mut self, pin_id: PinId) -> usize {
        let before = self.links.len();
        self.links
            .retain(|_, link| link.from != pin_id && link.to != pin_id);
        before - self.links.len()
    }

    pub fn set_param(
        &mut self,
        node_id: NodeId,
        key: impl Into<String>,
        value: ParamValue,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::MissingNode(node_id))?;
        let key = key.into();
        let changed = node
            .params
            .values
            .get(&key)
            .map(|existing| existing != &value)
            .unwrap_or(true);

        if changed {
            node.params.values.insert(key, value);
            node.param_version = node.param_version.wrapping_add(1);
        }

        Ok(())
    }

    pub fn topo_sort_from(&self, output: NodeId) -> Result<Vec<NodeId>, GraphError> {
        if !self.nodes.contains_key(&output) {
            return Err(GraphError::MissingNode(output));
        }

        let mut ordered = Vec::new();
        let mut visiting = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        self.visit_node(
            output,
            &mut visiting,
            &mut visited,
            &mut ordered,
            &mut stack,
        )?;

        Ok(ordered)
    }

    fn visit_node(
        &self,
        node_id: NodeId,
        visiting: &mut HashSet<NodeId>,
        visited: &mut HashSet<NodeId>,
        ordered: &mut Vec<NodeId>,
        stack: &mut Vec<NodeId>,
    ) -> Result<(), GraphError> {
        if visited.contains(&node_id) {
            return Ok(());
        }
        if visiting.contains(&node_id) {
            stack.push(node_id);
            return Err(GraphError::CycleDetected(stack.clone()));
        }

        visiting.insert(node_id);
        stack.push(node_id);

        for upstream in self.upstream_nodes(node_id) {
            self.visit_node(upstream, visiting, visited, ordered, stack)?;
        }

        visiting.remove(&node_id);
        visited.insert(node_id);
        ordered.push(node_id);
        stack.pop();
        Ok(())
    }

    pub fn upstream_nodes(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut upstream = Vec::new();

        for link in self.links.values() {
            let Some(to_node) = self.node_for_pin(link.to) else {
                continue;
            };
            if to_node != node_id {
                continue;
            }

            if let Some(from_node) = self.node_for_pin(link.from) {
                if !upstream.contains(&from_node) {
                    upstream.push(from_node);
                }
            }
        }

        upstream
    }

    fn node_for_pin(&self, pin_id: PinId) -> Option<NodeId> {
        self.pins.get(&pin_id).map(|pin| pin.node)
    }

    fn alloc_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        NodeId(id)
    }

    fn alloc_pin_id(&mut self) -> PinId {
        let id = self.next_pin_id;
        self.next_pin_id += 1;
        PinId(id)
    }

    fn alloc_link_id(&mut self) -> LinkId {
        let id = self.next_link_id;
        self.next_link_id += 1;
        LinkId(id)
    }

    pub fn rename_nodes(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        for node in self.nodes.values_mut() {
            if node.name == from {
                node.name = to.to_string();
                renamed += 1;
            }
        }
        renamed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: String,
    pub inputs: Vec<PinId>,
    pub outputs: Vec<PinId>,
    pub params: NodeParams,
    #[serde(default)]
    pub param_version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeParams {
    pub values: BTreeMap<String, ParamValue>,
}

impl NodeParams {
    pub fn get_string<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values
            .get(key)
            .and_then(|value| match value {
                ParamValue::String(v) => Some(v.as_str()),
                _ => None,
            })
            .unwrap_or(default)
    }

    pub fn get_vertex_lists(&self, key: &str) -> VertexLists {
        self.values
            .get(key)
            .and_then(|value| match value {
                ParamValue::VertexLists(v) => Some(v.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn get_edge_lists(&self, key: &str) -> EdgeLists {
        self.values
            .get(key)
            .and_then(|value| match value {
                ParamValue::EdgeLists(v) => Some(v.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ParamValue {
    String(String),
    VertexLists(VertexLists),
    EdgeLists(EdgeLists),
}

#[derive(Debug, Clone)]
pub struct NodeDefinition {
    pub name: String,
    pub category: String,
    pub inputs: Vec<PinDefinition>,
    pub outputs: Vec<PinDefinition>,
}

#[derive(Debug, Clone)]
pub struct PinDefinition {
    pub name: String,
    pub pin_type: PinType,
}

/// Socket data types. `Edges` pins carry index pairs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinType {
    Vertices,
    Edges,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinKind {
    Input,
    Output,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub node: NodeId,
    pub name: String,
    pub kind: PinKind,
    pub pin_type: PinType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub from: PinId,
    pub to: PinId,
}

#[derive(Debug, Clone)]
pub enum GraphError {
    MissingNode(NodeId),
    MissingPin(PinId),
    WrongPinDirection { from: PinId, to: PinId },
    InputAlreadyConnected { to: PinId },
    IncompatiblePinTypes { from: PinType, to: PinType },
    CycleDetected(Vec<NodeId>),
}
