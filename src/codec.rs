//! Graph Codec
//!
//! Canonical JSON encoding of an [`AudioGraph`] for the runtime engine:
//!
//! ```text
//! { "nodes": { "<id>": { "type", "params", "properties", "inputs", "numOutputs" } },
//!   "connections": [ { "outputNode", "outputChannel", "inputNode", "inputDestination" } ] }
//! ```
//!
//! Encoding is total. Node ids are emitted in sorted order, so two equal
//! graphs always produce identical bytes and the same [`fingerprint`].
//! Decoding recovers value tags from the catalog, since the wire values
//! themselves are untagged.
//!
//! A round trip therefore returns an equal graph only when every value
//! carries its catalog kind. Node updates do not check kinds, so a
//! `Number` stored under `frequency` comes back as `Hertz` with the same
//! magnitude. Labels the catalog does not know are inferred from the JSON
//! shape instead.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Map, Value as Json};
use sha2::{Digest, Sha256};

use crate::catalog;
use crate::error::{GraphError, Result};
use crate::graph::{AudioGraph, Connection};
use crate::node::{AudioNode, AudioParam, NodeInput, NodeProperty, NodeType};
use crate::value::{Value, ValueKind};

// ============================================================================
// Encoding
// ============================================================================

/// Encode a graph as a JSON tree
pub fn to_json(graph: &AudioGraph) -> Json {
    let nodes: Map<String, Json> = graph
        .nodes()
        .iter()
        .map(|(id, node)| (id.clone(), encode_node(node)))
        .collect();
    let connections: Vec<Json> = graph.connections().iter().map(encode_connection).collect();

    json!({
        "nodes": nodes,
        "connections": connections,
    })
}

/// Encode a graph as a JSON string
pub fn to_string(graph: &AudioGraph, pretty: bool) -> Result<String> {
    render(&to_json(graph), pretty)
}

/// Render any encoded tree, compact or indented
pub fn render(tree: &Json, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(tree)?)
    } else {
        Ok(tree.to_string())
    }
}

/// Lowercase hex SHA-256 of the compact canonical encoding
pub fn fingerprint(graph: &AudioGraph) -> String {
    let hash = Sha256::digest(to_json(graph).to_string().as_bytes());
    format!("{:x}", hash)
}

/// Encode a single node
pub fn encode_node(node: &AudioNode) -> Json {
    let params: Vec<Json> = node
        .params
        .iter()
        .map(|p| encode_slot(&p.label, &p.value))
        .collect();
    let properties: Vec<Json> = node
        .properties
        .iter()
        .map(|p| encode_slot(&p.label, &p.value))
        .collect();
    let inputs: Vec<Json> = node.inputs.iter().map(encode_input).collect();

    json!({
        "type": node.node_type.name(),
        "params": params,
        "properties": properties,
        "inputs": inputs,
        "numOutputs": node.num_outputs,
    })
}

/// Encode a single value
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Attribute(flag) => Json::Bool(*flag),
        Value::Buffer(s) | Value::Coefficients(s) | Value::WaveshaperCurve(s) => {
            Json::Array(s.iter().copied().map(Json::from).collect())
        }
        Value::Cents(x) | Value::Decibels(x) | Value::Hertz(x) | Value::Number(x) => {
            Json::from(*x)
        }
        Value::FftSize(n) => Json::from(*n),
        Value::Midi(n) => Json::from(*n),
        Value::DistanceModel(m) => Json::from(m.as_str()),
        Value::FilterType(t) => Json::from(t.as_str()),
        Value::Oversample(o) => Json::from(o.as_str()),
        Value::PanningModel(m) => Json::from(m.as_str()),
        Value::Waveform(w) => Json::from(w.as_str()),
    }
}

fn encode_slot(label: &str, value: &Value) -> Json {
    json!({ "label": label, "value": encode_value(value) })
}

fn encode_input(input: &NodeInput) -> Json {
    match input {
        NodeInput::Channel { channel } => json!({ "type": "channel", "channel": channel }),
        NodeInput::Param { param } => json!({ "type": "param", "param": param }),
    }
}

fn encode_connection(connection: &Connection) -> Json {
    json!({
        "outputNode": connection.output_node,
        "outputChannel": connection.output_channel,
        "inputNode": connection.input_node,
        "inputDestination": encode_input(&connection.input_destination),
    })
}

// ============================================================================
// Decoding
// ============================================================================

#[derive(Deserialize)]
struct GraphRecord {
    nodes: BTreeMap<String, NodeRecord>,
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    #[serde(rename = "type")]
    node_type: String,
    params: Vec<SlotRecord>,
    properties: Vec<SlotRecord>,
    inputs: Vec<NodeInput>,
    num_outputs: u32,
}

#[derive(Deserialize)]
struct SlotRecord {
    label: String,
    value: Json,
}

/// Decode a graph from a JSON tree
///
/// # Errors
/// - `UnknownNodeType` if a node names a type outside the catalog
/// - `InvalidValue` if a value does not fit the kind its label expects
/// - `Decode` if the document does not have the graph shape
pub fn from_json(json: &Json) -> Result<AudioGraph> {
    let record = GraphRecord::deserialize(json).map_err(|e| GraphError::Decode {
        reason: e.to_string(),
    })?;

    let nodes = record
        .nodes
        .into_iter()
        .map(|(id, node)| -> Result<(String, AudioNode)> { Ok((id, decode_node(node)?)) })
        .collect::<Result<BTreeMap<String, AudioNode>>>()?;

    Ok(AudioGraph::from_parts(nodes, record.connections))
}

/// Decode a graph from a JSON string
pub fn from_str(input: &str) -> Result<AudioGraph> {
    let json: Json = serde_json::from_str(input).map_err(|e| GraphError::Decode {
        reason: e.to_string(),
    })?;
    from_json(&json)
}

fn decode_node(record: NodeRecord) -> Result<AudioNode> {
    let node_type: NodeType = record.node_type.parse()?;

    let params = record
        .params
        .into_iter()
        .map(|s| -> Result<AudioParam> {
            let value = decode_slot(node_type, &s)?;
            Ok(AudioParam::new(s.label, value))
        })
        .collect::<Result<Vec<_>>>()?;
    let properties = record
        .properties
        .into_iter()
        .map(|s| -> Result<NodeProperty> {
            let value = decode_slot(node_type, &s)?;
            Ok(NodeProperty::new(s.label, value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AudioNode {
        node_type,
        params,
        properties,
        inputs: record.inputs,
        num_outputs: record.num_outputs,
    })
}

fn decode_slot(node_type: NodeType, slot: &SlotRecord) -> Result<Value> {
    let kind = match catalog::slot_kind(node_type, &slot.label) {
        Some(kind) => kind,
        None => ValueKind::infer(&slot.label, &slot.value)?,
    };
    Value::decode(kind, &slot.label, &slot.value)
}
