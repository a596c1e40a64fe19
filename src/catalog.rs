//! Node Catalog
//!
//! One static template per [`NodeType`], mirroring the constructor defaults
//! of the matching Web Audio node. Every node is built by the single
//! generic [`default_node`] constructor from this table.
//!
//! Inputs are derived from the template: channel inputs `0..channel_inputs`
//! first, then one param input per param, in param order.

use std::borrow::Cow;

use crate::node::{AudioNode, AudioParam, NodeInput, NodeProperty, NodeType};
use crate::value::{
    DistanceModel, FilterType, Oversample, PanningModel, Value, ValueKind, Waveform,
};

/// A labelled default value in a template
#[derive(Debug)]
pub struct Slot {
    pub label: &'static str,
    pub value: Value,
}

/// Default signature of one node type
#[derive(Debug)]
pub struct NodeTemplate {
    pub params: &'static [Slot],
    pub properties: &'static [Slot],
    /// Number of numbered audio inputs
    pub channel_inputs: u32,
    pub num_outputs: u32,
}

const fn slot(label: &'static str, value: Value) -> Slot {
    Slot { label, value }
}

const EMPTY: Cow<'static, [f64]> = Cow::Borrowed(&[]);
const UNIT: Cow<'static, [f64]> = Cow::Borrowed(&[1.0]);

// ============================================================================
// Templates
// ============================================================================

static ANALYSER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[
        slot("fftSize", Value::FftSize(2048)),
        slot("minDecibels", Value::Decibels(-100.0)),
        slot("maxDecibels", Value::Decibels(-30.0)),
        slot("smoothingTimeConstant", Value::Number(0.8)),
    ],
    channel_inputs: 1,
    num_outputs: 1,
};

static AUDIO_BUFFER_SOURCE: NodeTemplate = NodeTemplate {
    params: &[
        slot("playbackRate", Value::Number(1.0)),
        slot("detune", Value::Cents(0.0)),
    ],
    properties: &[
        slot("buffer", Value::Buffer(EMPTY)),
        slot("loop", Value::Attribute(false)),
        slot("loopStart", Value::Number(0.0)),
        slot("loopEnd", Value::Number(0.0)),
    ],
    channel_inputs: 0,
    num_outputs: 1,
};

static AUDIO_DESTINATION: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[],
    channel_inputs: 1,
    num_outputs: 0,
};

static BIQUAD_FILTER: NodeTemplate = NodeTemplate {
    params: &[
        slot("frequency", Value::Hertz(350.0)),
        slot("detune", Value::Cents(0.0)),
        slot("Q", Value::Number(1.0)),
        slot("gain", Value::Decibels(0.0)),
    ],
    properties: &[slot("type", Value::FilterType(FilterType::Lowpass))],
    channel_inputs: 1,
    num_outputs: 1,
};

static CHANNEL_MERGER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[],
    channel_inputs: 6,
    num_outputs: 1,
};

static CHANNEL_SPLITTER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[],
    channel_inputs: 1,
    num_outputs: 6,
};

static CONSTANT_SOURCE: NodeTemplate = NodeTemplate {
    params: &[slot("offset", Value::Number(1.0))],
    properties: &[],
    channel_inputs: 0,
    num_outputs: 1,
};

static CONVOLVER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[
        slot("buffer", Value::Buffer(EMPTY)),
        slot("normalize", Value::Attribute(true)),
    ],
    channel_inputs: 1,
    num_outputs: 1,
};

static DELAY: NodeTemplate = NodeTemplate {
    params: &[slot("delayTime", Value::Number(0.0))],
    properties: &[slot("maxDelayTime", Value::Number(1.0))],
    channel_inputs: 1,
    num_outputs: 1,
};

static DYNAMICS_COMPRESSOR: NodeTemplate = NodeTemplate {
    params: &[
        slot("threshold", Value::Decibels(-24.0)),
        slot("knee", Value::Decibels(30.0)),
        slot("ratio", Value::Number(12.0)),
        slot("attack", Value::Number(0.003)),
        slot("release", Value::Number(0.25)),
    ],
    properties: &[],
    channel_inputs: 1,
    num_outputs: 1,
};

static GAIN: NodeTemplate = NodeTemplate {
    params: &[slot("gain", Value::Number(1.0))],
    properties: &[],
    channel_inputs: 1,
    num_outputs: 1,
};

static IIR_FILTER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[
        slot("feedforward", Value::Coefficients(UNIT)),
        slot("feedback", Value::Coefficients(UNIT)),
    ],
    channel_inputs: 1,
    num_outputs: 1,
};

static OSCILLATOR: NodeTemplate = NodeTemplate {
    params: &[
        slot("frequency", Value::Hertz(350.0)),
        slot("detune", Value::Cents(0.0)),
    ],
    properties: &[slot("type", Value::Waveform(Waveform::Sine))],
    channel_inputs: 0,
    num_outputs: 1,
};

static PANNER: NodeTemplate = NodeTemplate {
    params: &[
        slot("positionX", Value::Number(0.0)),
        slot("positionY", Value::Number(0.0)),
        slot("positionZ", Value::Number(0.0)),
        slot("orientationX", Value::Number(1.0)),
        slot("orientationY", Value::Number(0.0)),
        slot("orientationZ", Value::Number(0.0)),
    ],
    properties: &[
        slot("panningModel", Value::PanningModel(PanningModel::EqualPower)),
        slot("distanceModel", Value::DistanceModel(DistanceModel::Inverse)),
        slot("refDistance", Value::Number(1.0)),
        slot("maxDistance", Value::Number(10000.0)),
        slot("rolloffFactor", Value::Number(1.0)),
        slot("coneInnerAngle", Value::Number(360.0)),
        slot("coneOuterAngle", Value::Number(360.0)),
        slot("coneOuterGain", Value::Number(0.0)),
    ],
    channel_inputs: 1,
    num_outputs: 1,
};

static STEREO_PANNER: NodeTemplate = NodeTemplate {
    params: &[slot("pan", Value::Number(0.0))],
    properties: &[],
    channel_inputs: 1,
    num_outputs: 1,
};

static WAVE_SHAPER: NodeTemplate = NodeTemplate {
    params: &[],
    properties: &[
        slot("curve", Value::WaveshaperCurve(EMPTY)),
        slot("oversample", Value::Oversample(Oversample::None)),
    ],
    channel_inputs: 1,
    num_outputs: 1,
};

// ============================================================================
// Lookup
// ============================================================================

/// Get the template for a node type
pub fn template(node_type: NodeType) -> &'static NodeTemplate {
    match node_type {
        NodeType::Analyser => &ANALYSER,
        NodeType::AudioBufferSource => &AUDIO_BUFFER_SOURCE,
        NodeType::AudioDestination => &AUDIO_DESTINATION,
        NodeType::BiquadFilter => &BIQUAD_FILTER,
        NodeType::ChannelMerger => &CHANNEL_MERGER,
        NodeType::ChannelSplitter => &CHANNEL_SPLITTER,
        NodeType::ConstantSource => &CONSTANT_SOURCE,
        NodeType::Convolver => &CONVOLVER,
        NodeType::Delay => &DELAY,
        NodeType::DynamicsCompressor => &DYNAMICS_COMPRESSOR,
        NodeType::Gain => &GAIN,
        NodeType::IirFilter => &IIR_FILTER,
        NodeType::Oscillator => &OSCILLATOR,
        NodeType::Panner => &PANNER,
        NodeType::StereoPanner => &STEREO_PANNER,
        NodeType::WaveShaper => &WAVE_SHAPER,
    }
}

/// Build a node carrying the template defaults for `node_type`
pub fn default_node(node_type: NodeType) -> AudioNode {
    let template = template(node_type);

    let params = template
        .params
        .iter()
        .map(|s| AudioParam::new(s.label, s.value.clone()))
        .collect();
    let properties = template
        .properties
        .iter()
        .map(|s| NodeProperty::new(s.label, s.value.clone()))
        .collect();
    let inputs = (0..template.channel_inputs)
        .map(NodeInput::channel)
        .chain(template.params.iter().map(|s| NodeInput::param(s.label)))
        .collect();

    AudioNode {
        node_type,
        params,
        properties,
        inputs,
        num_outputs: template.num_outputs,
    }
}

/// Expected value kind of a param or property label on a node type
pub fn slot_kind(node_type: NodeType, label: &str) -> Option<ValueKind> {
    let template = template(node_type);
    template
        .params
        .iter()
        .chain(template.properties.iter())
        .find(|s| s.label == label)
        .map(|s| s.value.kind())
}
