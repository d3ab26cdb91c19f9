use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::nodes;

pub const PROJECT_VERSION: u32 = 2;

/// Node label used by version 1 projects.
const LEGACY_ADAPTIVE_EDGES_NAME: &str = "Adaptive Edges Node";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub version: u32,
    pub graph: Graph,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: PROJECT_VERSION,
            graph: Graph::default(),
        }
    }
}

impl Project {
    pub fn migrate_to_latest(&mut self) {
        if self.version < 2 {
            self.graph
                .rename_nodes(LEGACY_ADAPTIVE_EDGES_NAME, nodes::adaptive_edges::NAME);
            self.version = 2;
        }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|err| err.to_string())?;
        let mut project: Project = serde_json::from_slice(&data).map_err(|err| err.to_string())?;
        if project.version > PROJECT_VERSION {
            return Err(format!(
                "project version {} is newer than supported version {}",
                project.version, PROJECT_VERSION
            ));
        }
        project.migrate_to_latest();
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let data = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, data).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeDefinition;
    use crate::nodes_builtin::BuiltinNodeKind;
    use crate::registry::builtin_registry;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("edgeweave_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn save_and_load_keeps_graph() {
        let registry = builtin_registry();
        let mut project = Project::default();
        let node = registry
            .add_node(&mut project.graph, BuiltinNodeKind::AdaptiveEdges)
            .unwrap();

        let path = temp_path("roundtrip");
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.version, PROJECT_VERSION);
        let loaded_node = loaded.graph.node(node).expect("node");
        assert_eq!(loaded_node.name, nodes::adaptive_edges::NAME);
        assert!(loaded.graph.input_pin(node, "VersD").is_some());
    }

    #[test]
    fn migrates_legacy_node_names() {
        let mut project = Project {
            version: 1,
            graph: Graph::default(),
        };
        let node = project.graph.add_node(NodeDefinition {
            name: LEGACY_ADAPTIVE_EDGES_NAME.to_string(),
            ..nodes::adaptive_edges::definition()
        });
        project.migrate_to_latest();
        assert_eq!(project.version, PROJECT_VERSION);
        assert_eq!(
            project.graph.node(node).unwrap().name,
            nodes::adaptive_edges::NAME
        );
    }

    #[test]
    fn rejects_future_versions() {
        let project = Project {
            version: PROJECT_VERSION + 1,
            graph: Graph::default(),
        };
        let path = temp_path("future");
        project.save(&path).unwrap();
        let result = Project::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
