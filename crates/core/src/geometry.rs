use glam::Vec3;
use serde::{Deserialize, Serialize};

pub type Vertex = [f32; 3];
pub type Edge = [u32; 2];

/// One inner list per object, the way sockets carry vertex data.
pub type VertexLists = Vec<Vec<Vertex>>;
pub type EdgeLists = Vec<Vec<Edge>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeObject {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
}

impl EdgeObject {
    pub fn new(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Self {
        Self { vertices, edges }
    }

    /// Copy with the first vertex moved to the origin.
    pub fn rebased(&self) -> Self {
        let Some(first) = self.vertices.first().copied().map(Vec3::from) else {
            return self.clone();
        };
        let vertices = self
            .vertices
            .iter()
            .map(|v| (Vec3::from(*v) - first).to_array())
            .collect();
        Self {
            vertices,
            edges: self.edges.clone(),
        }
    }

    pub fn validate_edges(&self) -> Result<(), String> {
        let count = self.vertices.len();
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge.iter().any(|i| *i as usize >= count) {
                return Err(format!(
                    "edge {idx} ({}, {}) is out of range for {count} vertices",
                    edge[0], edge[1]
                ));
            }
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.vertices.iter();
        let first = Vec3::from(*iter.next()?);
        let (min, max) = iter.fold((first, first), |(min, max), v| {
            let p = Vec3::from(*v);
            (min.min(p), max.max(p))
        });
        Some(Aabb {
            min: min.to_array(),
            max: max.to_array(),
        })
    }
}

/// Pairs vertex and edge lists by position. Unpaired lists on either side are dropped.
pub fn objects_from_lists(vertices: &VertexLists, edges: &EdgeLists) -> Vec<EdgeObject> {
    vertices
        .iter()
        .zip(edges.iter())
        .map(|(v, e)| EdgeObject::new(v.clone(), e.clone()))
        .collect()
}

pub fn lists_from_objects(objects: &[EdgeObject]) -> (VertexLists, EdgeLists) {
    objects
        .iter()
        .map(|object| (object.vertices.clone(), object.edges.clone()))
        .unzip()
}
