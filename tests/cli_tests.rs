//! CLI Tests
//!
//! Command implementations against files on disk.

use std::fs;
use std::path::PathBuf;

use audiograph::cli::commands;
use audiograph::codec;
use audiograph::{AudioNode, Config, Connection, NodeType, Value};
use tempfile::TempDir;

fn write_graph(dir: &TempDir, name: &str, graph: &audiograph::AudioGraph) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, codec::to_string(graph, true).unwrap()).unwrap();
    path
}

#[test]
fn test_types_lists_all_sixteen() {
    let listing = commands::list_types();
    assert_eq!(listing.lines().count(), 16);
    assert!(listing.lines().any(|l| l == "IIRFilter"));
}

#[test]
fn test_template_for_known_and_unknown_types() {
    let config = Config::default();
    let json = commands::template("ChannelSplitter", &config).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["numOutputs"], serde_json::json!(6));

    let err = commands::template("Splitter", &config).unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_NODE_TYPE");
}

#[test]
fn test_demo_uses_configured_destination() {
    let config = Config {
        destination_id: "speakers".to_string(),
        pretty: false,
        ..Config::default()
    };
    let out = commands::demo(&config).unwrap();
    assert!(!out.contains('\n'));
    let graph = codec::from_str(&out).unwrap();
    assert!(graph.contains_connection(&Connection::channel("osc", 0, "speakers", 0)));
}

#[test]
fn test_inspect_reports_dangling_connections() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let path = write_graph(&dir, "demo.json", &commands::demo_graph(&config));

    let report = commands::inspect(&path, &config).unwrap();
    assert!(report.contains("Nodes: 1"));
    assert!(report.contains("Connections: 1"));
    assert!(report.contains("Destination (__destination): absent"));
    assert!(report.contains("Dangling connections:"));
}

#[test]
fn test_inspect_missing_file() {
    let err = commands::inspect(PathBuf::from("/nonexistent/graph.json").as_path(), &Config::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "FILE_NOT_FOUND");
}

#[test]
fn test_diff_lists_backend_calls() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let prev = commands::demo_graph(&config)
        .set_node("__destination", AudioNode::new(NodeType::AudioDestination));
    let osc = AudioNode::new(NodeType::Oscillator).update_param("frequency", Value::hertz(6.0));
    let next = prev.set_node("osc", osc);

    let prev_path = write_graph(&dir, "prev.json", &prev);
    let next_path = write_graph(&dir, "next.json", &next);

    let out = commands::diff(&prev_path, &next_path, &config).unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with("set param osc.frequency = Hertz(6.0)"));

    let unchanged = commands::diff(&prev_path, &prev_path, &config).unwrap();
    assert_eq!(unchanged.trim(), "No changes.");
}

#[test]
fn test_diff_reports_skipped_connections() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let prev = commands::demo_graph(&config);
    let osc = AudioNode::new(NodeType::Oscillator).update_param("frequency", Value::hertz(6.0));
    let next = prev.set_node("osc", osc);

    let prev_path = write_graph(&dir, "prev.json", &prev);
    let next_path = write_graph(&dir, "next.json", &next);

    let out = commands::diff(&prev_path, &next_path, &config).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "set param osc.frequency = Hertz(6.0)",
            "skipped osc[0] -> __destination channel 0 (missing endpoint)",
        ]
    );
}
