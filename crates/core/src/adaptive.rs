use glam::{Mat4, Quat, Vec3};

use crate::geometry::{objects_from_lists, EdgeLists, EdgeObject, VertexLists};

/// Donor edge-chain prepared for replication: rebased so the first vertex sits
/// at the origin, with the last vertex as the reference vector.
#[derive(Debug, Clone)]
pub struct DonorTemplate {
    object: EdgeObject,
    direction: Vec3,
    length: f32,
}

impl DonorTemplate {
    pub fn from_object(donor: &EdgeObject) -> Result<Self, String> {
        if donor.vertices.is_empty() {
            return Err("donor has no vertices".to_string());
        }
        donor
            .validate_edges()
            .map_err(|err| format!("donor {err}"))?;

        let object = donor.rebased();
        let reference = object
            .vertices
            .last()
            .copied()
            .map(Vec3::from)
            .unwrap_or(Vec3::ZERO);
        let length = reference.length();
        let direction = match reference.try_normalize() {
            Some(direction) => direction,
            _ => return Err("donor reference vector has zero length".to_string()),
        };

        Ok(Self {
            object,
            direction,
            length,
        })
    }

    pub fn object(&self) -> &EdgeObject {
        &self.object
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Scale, then rotate the reference direction onto `tail -> head`, then move to `tail`.
    pub fn edge_matrix(&self, tail: Vec3, head: Vec3) -> Mat4 {
        let span = head - tail;
        let span_length = span.length();
        let rotation = match span.try_normalize() {
            Some(direction) => Quat::from_rotation_arc(self.direction, direction),
            None => Quat::IDENTITY,
        };
        let scale = span_length / self.length;
        Mat4::from_translation(tail) * Mat4::from_quat(rotation) * Mat4::from_scale(Vec3::splat(scale))
    }
}

/// Replaces every edge of `recipient` with a transformed copy of the donor.
/// Copies are appended in edge order, each with its edges offset by the
/// number of vertices already emitted.
pub fn replicate_along_edges(
    donor: &DonorTemplate,
    recipient: &EdgeObject,
) -> Result<EdgeObject, String> {
    recipient
        .validate_edges()
        .map_err(|err| format!("recipient {err}"))?;

    let template = donor.object();
    let mut out = EdgeObject {
        vertices: Vec::with_capacity(recipient.edges.len() * template.vertices.len()),
        edges: Vec::with_capacity(recipient.edges.len() * template.edges.len()),
    };

    for edge in &recipient.edges {
        let tail = Vec3::from(recipient.vertices[edge[0] as usize]);
        let head = Vec3::from(recipient.vertices[edge[1] as usize]);
        let matrix = donor.edge_matrix(tail, head);

        let offset = out.vertices.len() as u32;
        out.edges.extend(
            template
                .edges
                .iter()
                .map(|e| [e[0] + offset, e[1] + offset]),
        );
        out.vertices.extend(
            template
                .vertices
                .iter()
                .map(|v| matrix.transform_point3(Vec3::from(*v)).to_array()),
        );
    }

    Ok(out)
}

/// Maps the first donor object onto every edge of every recipient object.
pub fn adaptive_edges(
    recipient_vertices: &VertexLists,
    recipient_edges: &EdgeLists,
    donor_vertices: &VertexLists,
    donor_edges: &EdgeLists,
) -> Result<(VertexLists, EdgeLists), String> {
    let (Some(donor_verts), Some(donor_edgs)) = (donor_vertices.first(), donor_edges.first())
    else {
        return Err("donor geometry has no objects".to_string());
    };
    if donor_vertices.len() > 1 || donor_edges.len() > 1 {
        tracing::debug!(
            "adaptive edges: using first donor object, ignoring {} more",
            donor_vertices.len().max(donor_edges.len()) - 1
        );
    }

    let donor = DonorTemplate::from_object(&EdgeObject::new(donor_verts.clone(), donor_edgs.clone()))?;

    let mut vertices_out = Vec::new();
    let mut edges_out = Vec::new();
    for (index, recipient) in objects_from_lists(recipient_vertices, recipient_edges)
        .iter()
        .enumerate()
    {
        let replicated = replicate_along_edges(&donor, recipient)
            .map_err(|err| format!("object {index}: {err}"))?;
        vertices_out.push(replicated.vertices);
        edges_out.push(replicated.edges);
    }

    Ok((vertices_out, edges_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn assert_close(a: [f32; 3], b: [f32; 3]) {
        assert!(
            Vec3::from(a).distance(Vec3::from(b)) < EPS,
            "expected {b:?}, got {a:?}"
        );
    }

    fn unit_donor() -> EdgeObject {
        EdgeObject::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], vec![[0, 1]])
    }

    fn zigzag_donor() -> EdgeObject {
        EdgeObject::new(
            vec![
                [5.0, 5.0, 5.0],
                [5.5, 5.5, 5.0],
                [6.0, 5.0, 5.0],
                [7.0, 5.0, 5.0],
            ],
            vec![[0, 1], [1, 2], [2, 3]],
        )
    }

    #[test]
    fn single_edge_example() {
        let donor = DonorTemplate::from_object(&unit_donor()).unwrap();
        let recipient = EdgeObject::new(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 2.0]], vec![[0, 1]]);
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        assert_eq!(out.vertices.len(), 2);
        assert_close(out.vertices[0], [0.0, 0.0, 0.0]);
        assert_close(out.vertices[1], [0.0, 0.0, 2.0]);
        assert_eq!(out.edges, vec![[0, 1]]);
    }

    #[test]
    fn donor_is_rebased_and_measured() {
        let donor = DonorTemplate::from_object(&zigzag_donor()).unwrap();
        assert_eq!(donor.object().vertices[0], [0.0, 0.0, 0.0]);
        assert!((donor.length() - 2.0).abs() < EPS);
        assert_close(donor.direction().to_array(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn copies_span_each_recipient_edge() {
        let donor = DonorTemplate::from_object(&zigzag_donor()).unwrap();
        let recipient = EdgeObject::new(
            vec![
                [0.0, 0.0, 0.0],
                [3.0, 0.0, 0.0],
                [3.0, 4.0, 0.0],
                [1.0, 2.0, 7.0],
            ],
            vec![[0, 1], [1, 2], [2, 3], [3, 0]],
        );
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        let per_copy = donor.object().vertices.len();

        for (copy, edge) in recipient.edges.iter().enumerate() {
            let tail = Vec3::from(recipient.vertices[edge[0] as usize]);
            let head = Vec3::from(recipient.vertices[edge[1] as usize]);
            let first = Vec3::from(out.vertices[copy * per_copy]);
            let last = Vec3::from(out.vertices[copy * per_copy + per_copy - 1]);

            assert!(first.distance(tail) < EPS);
            assert!(last.distance(head) < EPS);
            assert!(((last - first).length() - tail.distance(head)).abs() < EPS);
            let dir = (last - first).normalize();
            assert!(dir.distance((head - tail).normalize()) < EPS);
        }
    }

    #[test]
    fn counts_and_offsets() {
        let donor = DonorTemplate::from_object(&zigzag_donor()).unwrap();
        let recipient = EdgeObject::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            vec![[0, 1], [1, 2]],
        );
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        assert_eq!(out.vertices.len(), 2 * 4);
        assert_eq!(out.edges.len(), 2 * 3);
        assert_eq!(out.edges[3], [4, 5]);
        assert!(out.validate_edges().is_ok());
    }

    #[test]
    fn antiparallel_edge_flips_donor() {
        let donor = DonorTemplate::from_object(&unit_donor()).unwrap();
        let recipient = EdgeObject::new(vec![[2.0, 0.0, 0.0], [-1.0, 0.0, 0.0]], vec![[0, 1]]);
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        assert_close(out.vertices[0], [2.0, 0.0, 0.0]);
        assert_close(out.vertices[1], [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_length_recipient_edge_collapses_to_tail() {
        let donor = DonorTemplate::from_object(&zigzag_donor()).unwrap();
        let recipient = EdgeObject::new(vec![[1.0, 2.0, 3.0]], vec![[0, 0]]);
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        assert_eq!(out.vertices.len(), 4);
        for v in out.vertices {
            assert_close(v, [1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn tiny_recipient_edge_is_still_followed() {
        let donor = DonorTemplate::from_object(&unit_donor()).unwrap();
        let recipient = EdgeObject::new(vec![[0.0, 0.0, 0.0], [0.0, 0.0, 5.0e-7]], vec![[0, 1]]);
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        let tip = Vec3::from(out.vertices[1]);
        assert!((tip.length() - 5.0e-7).abs() < 1.0e-10);
        assert!(tip.normalize().distance(Vec3::Z) < EPS);
    }

    #[test]
    fn tiny_donor_is_accepted() {
        let tiny = EdgeObject::new(vec![[0.0, 0.0, 0.0], [5.0e-7, 0.0, 0.0]], vec![[0, 1]]);
        let donor = DonorTemplate::from_object(&tiny).unwrap();
        assert!((donor.length() - 5.0e-7).abs() < 1.0e-10);
        assert_close(donor.direction().to_array(), [1.0, 0.0, 0.0]);

        let recipient = EdgeObject::new(vec![[0.0, 0.0, 0.0], [0.0, 2.0, 0.0]], vec![[0, 1]]);
        let out = replicate_along_edges(&donor, &recipient).unwrap();
        assert_close(out.vertices[1], [0.0, 2.0, 0.0]);
    }

    #[test]
    fn degenerate_donor_is_rejected() {
        let closed = EdgeObject::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
            vec![[0, 1], [1, 2]],
        );
        assert!(DonorTemplate::from_object(&closed).is_err());
        assert!(DonorTemplate::from_object(&EdgeObject::default()).is_err());
        let bad_edges = EdgeObject::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![[0, 4]]);
        assert!(DonorTemplate::from_object(&bad_edges).is_err());
    }

    #[test]
    fn recipient_with_bad_index_is_rejected() {
        let donor = DonorTemplate::from_object(&unit_donor()).unwrap();
        let recipient = EdgeObject::new(vec![[0.0; 3]], vec![[0, 1]]);
        assert!(replicate_along_edges(&donor, &recipient).is_err());
    }

    #[test]
    fn only_first_donor_object_is_used() {
        let recipient_vertices = vec![
            vec![[0.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
        ];
        let recipient_edges = vec![vec![[0, 1]], vec![[0, 1], [1, 2]]];
        let donor_vertices = vec![
            unit_donor().vertices,
            vec![[0.0; 3], [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]],
        ];
        let donor_edges = vec![unit_donor().edges, vec![[0, 1], [1, 2]]];

        let (vertices, edges) = adaptive_edges(
            &recipient_vertices,
            &recipient_edges,
            &donor_vertices,
            &donor_edges,
        )
        .unwrap();

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].len(), 2);
        assert_eq!(vertices[1].len(), 4);
        assert_eq!(edges[1], vec![[0, 1], [2, 3]]);
        assert_close(vertices[0][1], [0.0, 3.0, 0.0]);
    }

    #[test]
    fn missing_donor_object_is_an_error() {
        let result = adaptive_edges(&vec![vec![[0.0; 3]]], &vec![vec![]], &Vec::new(), &Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn empty_recipient_edges_give_empty_object() {
        let (vertices, edges) = adaptive_edges(
            &vec![vec![[0.0; 3], [1.0, 0.0, 0.0]]],
            &vec![Vec::new()],
            &vec![unit_donor().vertices],
            &vec![unit_donor().edges],
        )
        .unwrap();
        assert_eq!(vertices, vec![Vec::<[f32; 3]>::new()]);
        assert_eq!(edges, vec![Vec::<[u32; 2]>::new()]);
    }
}
