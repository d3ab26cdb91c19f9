use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process;

use edgeweave_core::{
    builtin_kind_from_name, builtin_registry, evaluate_graph, object_in, write_obj, EvalError,
    GraphEvalState, NodeId, ParamValue, Project,
};
use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::logging::parse_level;

#[derive(Debug, Deserialize)]
pub(crate) struct Plan {
    #[serde(default)]
    nodes: Vec<PlanNode>,
    #[serde(default)]
    links: Vec<PlanLink>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlanNode {
    id: String,
    kind: String,
    #[serde(default)]
    params: BTreeMap<String, ParamValue>,
}

#[derive(Debug, Deserialize)]
struct PlanLink {
    from: PlanEndpoint,
    to: PlanEndpoint,
}

#[derive(Debug, Deserialize)]
struct PlanEndpoint {
    node: String,
    pin: String,
}

#[derive(Debug)]
pub(crate) struct HeadlessArgs {
    pub plan_path: Option<PathBuf>,
    pub obj_path: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub print: bool,
    pub log_level: LevelFilter,
}

pub(crate) fn parse_args(args: &[String]) -> Result<HeadlessArgs, String> {
    let mut parsed = HeadlessArgs {
        plan_path: None,
        obj_path: None,
        save_path: None,
        print: false,
        log_level: LevelFilter::INFO,
    };
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plan" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--plan requires a path".to_string())?;
                parsed.plan_path = Some(PathBuf::from(value));
            }
            "--obj" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--obj requires a path".to_string())?;
                parsed.obj_path = Some(PathBuf::from(value));
            }
            "--save" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--save requires a path".to_string())?;
                parsed.save_path = Some(PathBuf::from(value));
            }
            "--log-level" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--log-level requires a value".to_string())?;
                parsed.log_level = parse_level(value)?;
            }
            "--print" => {
                parsed.print = true;
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(parsed)
}

fn print_help() {
    println!(
        "Usage: edgeweave [options]\n  --plan <path>        graph plan (JSON); defaults to a built-in demo\n  --obj <path>         write the output objects as OBJ\n  --save <path>        save the built project (JSON)\n  --print              print the output objects as JSON\n  --log-level <level>  off, error, warn, info, debug or trace"
    );
}

pub(crate) fn run(args: &HeadlessArgs) -> Result<(), String> {
    let plan = match &args.plan_path {
        Some(path) => load_plan(path)?,
        None => default_plan(),
    };
    let (project, ids) = build_project(&plan)?;

    if let Some(path) = &args.save_path {
        project.save(path)?;
        tracing::info!("saved project to {:?}", path);
    }

    let output_name = plan
        .output
        .as_deref()
        .ok_or_else(|| "plan has no output node".to_string())?;
    let output = *ids
        .get(output_name)
        .ok_or_else(|| format!("output node {} not found", output_name))?;

    let registry = builtin_registry();
    let mut state = GraphEvalState::new();
    let result = evaluate_graph(&project.graph, output, &registry, &mut state)
        .map_err(|err| format!("evaluation failed: {:?}", err))?;
    tracing::info!(
        "evaluated {} node(s) in order {:?}",
        result.report.computed.len(),
        result.report.ordered
    );
    for (node, timing) in &result.report.node_reports {
        tracing::debug!(
            "{}: {:.3} ms{}",
            node_label(&ids, *node),
            timing.duration_ms,
            if timing.cache_hit { " (cached)" } else { "" }
        );
    }

    if !result.report.output_valid {
        let messages: Vec<String> = result
            .report
            .errors
            .iter()
            .filter_map(|err| match err {
                EvalError::Node { node, message } => {
                    Some(format!("{}: {}", node_label(&ids, *node), message))
                }
                EvalError::Upstream { .. } => None,
            })
            .collect();
        return Err(messages.join("; "));
    }

    for (index, object) in result.output.iter().enumerate() {
        tracing::debug!(
            "object {}: {} vertices, {} edges, bounds {:?}",
            index,
            object.vertices.len(),
            object.edges.len(),
            object.bounds()
        );
    }

    if let Some(path) = &args.obj_path {
        write_obj(&path.to_string_lossy(), &result.output)?;
        tracing::info!("wrote {} object(s) to {:?}", result.output.len(), path);
    }

    if args.print {
        let json = serde_json::to_string_pretty(&result.output).map_err(|err| err.to_string())?;
        println!("{json}");
    }

    tracing::info!("completed");
    Ok(())
}

fn load_plan(path: &Path) -> Result<Plan, String> {
    let data = std::fs::read(path).map_err(|err| err.to_string())?;
    serde_json::from_slice(&data).map_err(|err| err.to_string())
}

/// One recipient edge along +Z, one unit donor edge along +X.
fn default_plan() -> Plan {
    let recipient = object_in::params_for(
        vec![vec![[0.0, 0.0, 0.0], [0.0, 0.0, 2.0]]],
        vec![vec![[0, 1]]],
    );
    let donor = object_in::params_for(
        vec![vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]],
        vec![vec![[0, 1]]],
    );
    let link = |from: &str, from_pin: &str, to: &str, to_pin: &str| PlanLink {
        from: PlanEndpoint {
            node: from.to_string(),
            pin: from_pin.to_string(),
        },
        to: PlanEndpoint {
            node: to.to_string(),
            pin: to_pin.to_string(),
        },
    };

    Plan {
        nodes: vec![
            PlanNode {
                id: "recipient".to_string(),
                kind: "Object In".to_string(),
                params: recipient.values,
            },
            PlanNode {
                id: "donor".to_string(),
                kind: "Object In".to_string(),
                params: donor.values,
            },
            PlanNode {
                id: "adaptive".to_string(),
                kind: "Adaptive Edges".to_string(),
                params: BTreeMap::new(),
            },
            PlanNode {
                id: "viewer".to_string(),
                kind: "Viewer".to_string(),
                params: BTreeMap::new(),
            },
        ],
        links: vec![
            link("recipient", "Vertices", "adaptive", "VersR"),
            link("recipient", "Edges", "adaptive", "EdgeR"),
            link("donor", "Vertices", "adaptive", "VersD"),
            link("donor", "Edges", "adaptive", "EdgeD"),
            link("adaptive", "Vertices", "viewer", "Vertices"),
            link("adaptive", "Edges", "viewer", "Edges"),
        ],
        output: Some("viewer".to_string()),
    }
}

fn build_project(plan: &Plan) -> Result<(Project, HashMap<String, NodeId>), String> {
    let registry = builtin_registry();
    let mut project = Project::default();
    let mut ids = HashMap::new();

    for node in &plan.nodes {
        let kind = builtin_kind_from_name(&node.kind)
            .ok_or_else(|| format!("unknown node kind {}", node.kind))?;
        let node_id = registry.add_node(&mut project.graph, kind)?;
        for (key, value) in &node.params {
            project
                .graph
                .set_param(node_id, key.clone(), value.clone())
                .map_err(|err| format!("param error: {:?}", err))?;
        }
        if ids.insert(node.id.clone(), node_id).is_some() {
            return Err(format!("duplicate node id {}", node.id));
        }
    }

    for link in &plan.links {
        let from_node = ids
            .get(&link.from.node)
            .ok_or_else(|| format!("unknown node {}", link.from.node))?;
        let to_node = ids
            .get(&link.to.node)
            .ok_or_else(|| format!("unknown node {}", link.to.node))?;

        let from_pin = project
            .graph
            .output_pin(*from_node, &link.from.pin)
            .ok_or_else(|| format!("unknown output pin {}", link.from.pin))?;
        let to_pin = project
            .graph
            .input_pin(*to_node, &link.to.pin)
            .ok_or_else(|| format!("unknown input pin {}", link.to.pin))?;

        project
            .graph
            .add_link(from_pin, to_pin)
            .map_err(|err| format!("link error: {:?}", err))?;
    }

    Ok((project, ids))
}

fn node_label(ids: &HashMap<String, NodeId>, node: NodeId) -> String {
    ids.iter()
        .find(|(_, id)| **id == node)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| format!("{:?}", node))
}
