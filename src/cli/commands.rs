//! CLI Command Implementations
//!
//! Each command renders its report as a string; `main` prints it.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::bridge::{MemoryBackend, Reconciler};
use crate::codec;
use crate::config::Config;
use crate::error::{GraphError, Result};
use crate::graph::{create_graph, AudioGraph, Connection};
use crate::node::{AudioNode, NodeType};

/// List every node type name, one per line.
pub fn list_types() -> String {
    NodeType::ALL
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the default node for a type name.
pub fn template(node_type: &str, config: &Config) -> Result<String> {
    let node_type: NodeType = node_type.parse()?;
    let node = AudioNode::new(node_type);
    codec::render(&codec::encode_node(&node), config.pretty)
}

/// Build the oscillator-to-destination graph.
pub fn demo_graph(config: &Config) -> AudioGraph {
    create_graph()
        .set_node("osc", AudioNode::new(NodeType::Oscillator))
        .add_connection(Connection::channel("osc", 0, &config.destination_id, 0))
}

/// Render the demo graph.
pub fn demo(config: &Config) -> Result<String> {
    codec::to_string(&demo_graph(config), config.pretty)
}

/// Decode a graph file and summarize it.
pub fn inspect(path: &Path, config: &Config) -> Result<String> {
    info!("Inspecting graph: {}", path.display());

    let graph = load_graph(path)?;
    let destination = if graph.get_node(&config.destination_id).is_some() {
        "present"
    } else {
        "absent"
    };

    let mut lines = vec![
        format!("Nodes: {}", graph.len()),
        format!("Connections: {}", graph.connections().len()),
        format!("Fingerprint: {}", codec::fingerprint(&graph)),
        format!("Destination ({}): {}", config.destination_id, destination),
    ];

    let dangling = graph.dangling_connections();
    if !dangling.is_empty() {
        lines.push("Dangling connections:".to_string());
        lines.extend(dangling.iter().map(|c| format!("  {}", c)));
    }

    Ok(lines.join("\n"))
}

/// Apply `prev` then `next` to an in-memory backend and list the calls made
/// for `next`.
pub fn diff(prev: &Path, next: &Path, config: &Config) -> Result<String> {
    info!("Diffing {} -> {}", prev.display(), next.display());

    let prev = load_graph(prev)?;
    let next = load_graph(next)?;

    let mut reconciler = Reconciler::with_config(MemoryBackend::new(), config);
    reconciler.receive(prev)?;
    let report = reconciler.receive(next)?;
    debug!("Delivery kind: {:?}", report.kind);

    if report.plan.is_empty() && report.plan.skipped.is_empty() {
        return Ok("No changes.".to_string());
    }

    let lines: Vec<String> = report
        .plan
        .ops
        .iter()
        .map(|op| op.to_string())
        .chain(
            report
                .plan
                .skipped
                .iter()
                .map(|c| format!("skipped {} (missing endpoint)", c)),
        )
        .collect();

    Ok(lines.join("\n"))
}

fn load_graph(path: &Path) -> Result<AudioGraph> {
    let content = fs::read_to_string(path).map_err(|e| GraphError::FileNotFound {
        path: path.display().to_string(),
        source: Some(e),
    })?;
    codec::from_str(&content)
}
