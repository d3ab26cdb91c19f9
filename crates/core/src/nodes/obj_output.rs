use std::collections::BTreeMap;
use std::io::Write;

use crate::geometry::{objects_from_lists, EdgeObject};
use crate::graph::{NodeDefinition, NodeParams, ParamValue};
use crate::nodes::{
    edges_in, edges_out, require_edges, require_vertices, vertices_in, vertices_out,
    SocketInputs, SocketOutputs, SocketValue,
};

pub const NAME: &str = "OBJ Output";

pub const VERTICES: &str = "Vertices";
pub const EDGES: &str = "Edges";

pub fn definition() -> NodeDefinition {
    NodeDefinition {
        name: NAME.to_string(),
        category: "Outputs".to_string(),
        inputs: vec![vertices_in(VERTICES), edges_in(EDGES)],
        outputs: vec![vertices_out(VERTICES), edges_out(EDGES)],
    }
}

pub fn default_params() -> NodeParams {
    NodeParams {
        values: BTreeMap::from([(
            "path".to_string(),
            ParamValue::String("output.obj".to_string()),
        )]),
    }
}

pub fn compute(
    params: &NodeParams,
    inputs: &SocketInputs,
    outputs: &mut SocketOutputs,
) -> Result<(), String> {
    let vertices = require_vertices(inputs, VERTICES)?;
    let edges = require_edges(inputs, EDGES)?;
    let path = params.get_string("path", "output.obj");
    if path.trim().is_empty() {
        return Err("OBJ Output requires a path".to_string());
    }

    let objects = objects_from_lists(vertices, edges);
    write_obj(path, &objects)?;
    tracing::info!("wrote {} object(s) to {}", objects.len(), path);

    outputs.set(VERTICES, SocketValue::Vertices(vertices.clone()));
    outputs.set(EDGES, SocketValue::Edges(edges.clone()));
    Ok(())
}

pub fn write_obj(path: &str, objects: &[EdgeObject]) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|err| err.to_string())?;
    let mut writer = std::io::BufWriter::new(file);
    write_obj_to(&mut writer, objects)?;
    writer.flush().map_err(|err| err.to_string())
}

/// Writes one `o` block per object with `v` and `l` records. OBJ indices are
/// global and 1-based, so each block is offset by the vertices before it.
pub fn write_obj_to<W: Write>(writer: &mut W, objects: &[EdgeObject]) -> Result<(), String> {
    let mut base = 1u32;
    for (index, object) in objects.iter().enumerate() {
        object
            .validate_edges()
            .map_err(|err| format!("object {index}: {err}"))?;
        // Validated indices stay below `next`, so offsetting cannot overflow.
        let next = u32::try_from(object.vertices.len())
            .ok()
            .and_then(|count| base.checked_add(count))
            .ok_or_else(|| format!("object {index}: too many vertices for OBJ indices"))?;

        writeln!(writer, "o object_{index}").map_err(|err| err.to_string())?;
        for p in &object.vertices {
            writeln!(writer, "v {} {} {}", p[0], p[1], p[2]).map_err(|err| err.to_string())?;
        }
        for e in &object.edges {
            writeln!(writer, "l {} {}", e[0] + base, e[1] + base)
                .map_err(|err| err.to_string())?;
        }
        base = next;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_lines_offset_per_object() {
        let objects = vec![
            EdgeObject::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], vec![[0, 1]]),
            EdgeObject::new(vec![[0.0, 1.0, 0.0], [0.0, 2.0, 0.5]], vec![[1, 0]]),
        ];
        let mut buffer = Vec::new();
        write_obj_to(&mut buffer, &objects).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "o object_0",
                "v 0 0 0",
                "v 1 0 0",
                "l 1 2",
                "o object_1",
                "v 0 1 0",
                "v 0 2 0.5",
                "l 4 3",
            ]
        );
    }

    #[test]
    fn out_of_range_edge_is_an_error() {
        let objects = vec![
            EdgeObject::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![[0, 1]]),
            EdgeObject::new(vec![[0.0; 3]], vec![[u32::MAX, 0]]),
        ];
        let mut buffer = Vec::new();
        let err = write_obj_to(&mut buffer, &objects).unwrap_err();
        assert!(err.starts_with("object 1:"));

        let dangling = vec![EdgeObject::new(vec![[0.0; 3], [1.0; 3]], vec![[1, 2]])];
        assert!(write_obj_to(&mut Vec::new(), &dangling).is_err());
    }

    #[test]
    fn compute_writes_file_and_passes_through() {
        let path = std::env::temp_dir().join(format!("edgeweave_obj_{}.obj", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        let mut params = default_params();
        params
            .values
            .insert("path".to_string(), ParamValue::String(path_str));

        let inputs = SocketInputs::new()
            .with_link(VERTICES, SocketValue::Vertices(vec![vec![[0.0; 3], [1.0; 3]]]))
            .with_link(EDGES, SocketValue::Edges(vec![vec![[0, 1]]]));
        let mut outputs = SocketOutputs::all_linked(&[VERTICES, EDGES]);
        compute(&params, &inputs, &mut outputs).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(text.contains("l 1 2"));
        assert_eq!(outputs.get(EDGES), inputs.get(EDGES));
    }

    #[test]
    fn missing_input_is_an_error() {
        let mut outputs = SocketOutputs::all_linked(&[VERTICES, EDGES]);
        let result = compute(&default_params(), &SocketInputs::new(), &mut outputs);
        assert_eq!(result, Err("missing input 'Vertices'".to_string()));
    }
}
