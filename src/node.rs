//! Audio Nodes
//!
//! A node describes one native processing unit: which kind it is, its
//! modulatable params, its fixed properties, the inputs other nodes may
//! connect to and how many outputs it exposes.
//!
//! Nodes are values. `update_param` and `update_property` hand back a new
//! node and leave the original untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::{GraphError, Result};
use crate::value::Value;

/// Which native processor a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeType {
    Analyser,
    AudioBufferSource,
    AudioDestination,
    BiquadFilter,
    ChannelMerger,
    ChannelSplitter,
    ConstantSource,
    Convolver,
    Delay,
    DynamicsCompressor,
    Gain,
    #[serde(rename = "IIRFilter")]
    IirFilter,
    Oscillator,
    Panner,
    StereoPanner,
    WaveShaper,
}

impl NodeType {
    /// All node types in wire-name order
    pub const ALL: [NodeType; 16] = [
        NodeType::Analyser,
        NodeType::AudioBufferSource,
        NodeType::AudioDestination,
        NodeType::BiquadFilter,
        NodeType::ChannelMerger,
        NodeType::ChannelSplitter,
        NodeType::ConstantSource,
        NodeType::Convolver,
        NodeType::Delay,
        NodeType::DynamicsCompressor,
        NodeType::Gain,
        NodeType::IirFilter,
        NodeType::Oscillator,
        NodeType::Panner,
        NodeType::StereoPanner,
        NodeType::WaveShaper,
    ];

    /// Name used on the wire and by the runtime engine
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Analyser => "Analyser",
            NodeType::AudioBufferSource => "AudioBufferSource",
            NodeType::AudioDestination => "AudioDestination",
            NodeType::BiquadFilter => "BiquadFilter",
            NodeType::ChannelMerger => "ChannelMerger",
            NodeType::ChannelSplitter => "ChannelSplitter",
            NodeType::ConstantSource => "ConstantSource",
            NodeType::Convolver => "Convolver",
            NodeType::Delay => "Delay",
            NodeType::DynamicsCompressor => "DynamicsCompressor",
            NodeType::Gain => "Gain",
            NodeType::IirFilter => "IIRFilter",
            NodeType::Oscillator => "Oscillator",
            NodeType::Panner => "Panner",
            NodeType::StereoPanner => "StereoPanner",
            NodeType::WaveShaper => "WaveShaper",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| GraphError::UnknownNodeType {
                name: s.to_string(),
            })
    }
}

/// A modulatable control; other nodes may connect to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioParam {
    pub label: String,
    pub value: Value,
}

impl AudioParam {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A fixed setting; assigned directly, never connected to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeProperty {
    pub label: String,
    pub value: Value,
}

impl NodeProperty {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Destination of a connection on the receiving node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeInput {
    /// Zero-indexed audio channel input
    Channel { channel: u32 },
    /// One of the node's own params, by label
    Param { param: String },
}

impl NodeInput {
    pub fn channel(channel: u32) -> Self {
        NodeInput::Channel { channel }
    }

    pub fn param(label: impl Into<String>) -> Self {
        NodeInput::Param {
            param: label.into(),
        }
    }
}

impl fmt::Display for NodeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeInput::Channel { channel } => write!(f, "channel {}", channel),
            NodeInput::Param { param } => write!(f, "param '{}'", param),
        }
    }
}

/// One audio processing unit in a graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub params: Vec<AudioParam>,
    pub properties: Vec<NodeProperty>,
    pub inputs: Vec<NodeInput>,
    pub num_outputs: u32,
}

impl AudioNode {
    /// Create a node populated with the catalog defaults for `node_type`
    pub fn new(node_type: NodeType) -> Self {
        catalog::default_node(node_type)
    }

    /// Return a copy with the value of every param labelled `label` replaced.
    ///
    /// An unknown label leaves the node unchanged. The replacement's kind
    /// is not checked against the current value.
    #[must_use]
    pub fn update_param(&self, label: &str, value: Value) -> AudioNode {
        let mut node = self.clone();
        for param in node.params.iter_mut().filter(|p| p.label == label) {
            param.value = value.clone();
        }
        node
    }

    /// Return a copy with the value of every property labelled `label` replaced.
    ///
    /// Same semantics as [`AudioNode::update_param`].
    #[must_use]
    pub fn update_property(&self, label: &str, value: Value) -> AudioNode {
        let mut node = self.clone();
        for property in node.properties.iter_mut().filter(|p| p.label == label) {
            property.value = value.clone();
        }
        node
    }

    /// Get a param value by label
    pub fn param(&self, label: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|p| p.label == label)
            .map(|p| &p.value)
    }

    /// Get a property value by label
    pub fn property(&self, label: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.label == label)
            .map(|p| &p.value)
    }

    /// Check whether `input` is declared on this node
    pub fn has_input(&self, input: &NodeInput) -> bool {
        self.inputs.contains(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Waveform;

    #[test]
    fn test_node_type_names_round_trip() {
        for node_type in NodeType::ALL {
            assert_eq!(node_type.name().parse::<NodeType>().unwrap(), node_type);
        }
        assert_eq!(NodeType::IirFilter.to_string(), "IIRFilter");
    }

    #[test]
    fn test_unknown_node_type() {
        let err = "Reverb".parse::<NodeType>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_NODE_TYPE");
        assert!("oscillator".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_update_param_replaces_only_matching_label() {
        let osc = AudioNode::new(NodeType::Oscillator);
        let updated = osc.update_param("frequency", Value::hertz(6.0));

        assert_eq!(updated.param("frequency"), Some(&Value::hertz(6.0)));
        assert_eq!(updated.param("detune"), osc.param("detune"));
        assert_eq!(updated.properties, osc.properties);
        assert_eq!(updated.inputs, osc.inputs);
        // Original untouched
        assert_eq!(osc.param("frequency"), Some(&Value::hertz(350.0)));
    }

    #[test]
    fn test_update_missing_label_is_noop() {
        let gain = AudioNode::new(NodeType::Gain);
        assert_eq!(gain.update_param("volume", Value::number(0.5)), gain);
        assert_eq!(gain.update_property("gain", Value::number(0.5)), gain);
    }

    #[test]
    fn test_update_property() {
        let osc = AudioNode::new(NodeType::Oscillator);
        let square = osc.update_property("type", Value::waveform(Waveform::Square));
        assert_eq!(square.property("type"), Some(&Value::waveform(Waveform::Square)));
        assert_eq!(square.params, osc.params);
    }

    #[test]
    fn test_input_equality_needs_same_tag() {
        assert_eq!(NodeInput::channel(0), NodeInput::channel(0));
        assert_ne!(NodeInput::channel(0), NodeInput::param("0"));
        assert_ne!(NodeInput::param("gain"), NodeInput::param("pan"));
    }

    #[test]
    fn test_input_wire_form() {
        assert_eq!(
            serde_json::to_value(NodeInput::channel(2)).unwrap(),
            serde_json::json!({"type": "channel", "channel": 2})
        );
        let parsed: NodeInput =
            serde_json::from_value(serde_json::json!({"type": "param", "param": "gain"})).unwrap();
        assert_eq!(parsed, NodeInput::param("gain"));
    }
}
