//! Value Model
//!
//! Every param and property carries a `Value`: a primitive tagged with the
//! unit it is measured in. Tags never mix. A `Hertz` value is not a
//! `Number`, even when both hold `350.0`.
//!
//! The wire encoding is untagged (a frequency is just a JSON number), so
//! decoding needs the expected [`ValueKind`] up front. The catalog supplies
//! it for every known `(node type, label)` pair.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as Json;

use crate::error::{GraphError, Result};

/// Sample and coefficient sequences.
///
/// Borrowed for the static catalog defaults, owned once a caller supplies
/// data.
pub type Samples = Cow<'static, [f64]>;

// ============================================================================
// Enumerated payloads
// ============================================================================

/// Declares a closed enum whose wire form is a fixed string literal.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $lit:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $lit)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire literal for this variant
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $lit),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = GraphError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($lit => Ok($name::$variant),)+
                    other => Err(GraphError::InvalidValue {
                        label: $kind.to_string(),
                        expected: format!("one of {:?}", [$($lit),+]),
                        found: format!("{:?}", other),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Response curve of a biquad filter
    FilterType as "filter type" {
        Lowpass => "lowpass",
        Highpass => "highpass",
        Bandpass => "bandpass",
        Lowshelf => "lowshelf",
        Highshelf => "highshelf",
        Peaking => "peaking",
        Notch => "notch",
        Allpass => "allpass",
    }
}

wire_enum! {
    /// Periodic waveform produced by an oscillator
    Waveform as "waveform" {
        Sine => "sine",
        Triangle => "triangle",
        Sawtooth => "sawtooth",
        Square => "square",
    }
}

wire_enum! {
    /// Volume attenuation law for a panner moving away from the listener
    DistanceModel as "distance model" {
        Linear => "linear",
        Inverse => "inverse",
        Exponential => "exponential",
    }
}

wire_enum! {
    /// Spatialisation algorithm of a panner
    PanningModel as "panning model" {
        EqualPower => "equalpower",
        /// Head-related transfer function; the API mandates upper case.
        Hrtf => "HRTF",
    }
}

wire_enum! {
    /// Oversampling applied by a waveshaper
    Oversample as "oversample" {
        None => "none",
        X2 => "2x",
        X4 => "4x",
    }
}

// ============================================================================
// Value
// ============================================================================

/// A strongly typed param or property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// On/off flag
    Attribute(bool),
    /// Audio buffer samples
    Buffer(Samples),
    /// IIR filter coefficients
    Coefficients(Samples),
    /// Pitch offset in cents
    Cents(f64),
    /// Level in decibels
    Decibels(f64),
    DistanceModel(DistanceModel),
    FilterType(FilterType),
    /// FFT window size in samples
    FftSize(u32),
    /// Frequency in hertz
    Hertz(f64),
    /// MIDI note or controller value
    Midi(i32),
    Oversample(Oversample),
    PanningModel(PanningModel),
    Waveform(Waveform),
    /// Waveshaper transfer curve
    WaveshaperCurve(Samples),
    /// Dimensionless number
    Number(f64),
}

/// The tag of a [`Value`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Attribute,
    Buffer,
    Coefficients,
    Cents,
    Decibels,
    DistanceModel,
    FilterType,
    FftSize,
    Hertz,
    Midi,
    Oversample,
    PanningModel,
    Waveform,
    WaveshaperCurve,
    Number,
}

impl ValueKind {
    /// Human-readable name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Attribute => "attribute (boolean)",
            ValueKind::Buffer => "buffer (array of numbers)",
            ValueKind::Coefficients => "coefficients (array of numbers)",
            ValueKind::Cents => "cents (number)",
            ValueKind::Decibels => "decibels (number)",
            ValueKind::DistanceModel => "distance model",
            ValueKind::FilterType => "filter type",
            ValueKind::FftSize => "FFT size (unsigned integer)",
            ValueKind::Hertz => "hertz (number)",
            ValueKind::Midi => "MIDI value (integer)",
            ValueKind::Oversample => "oversample",
            ValueKind::PanningModel => "panning model",
            ValueKind::Waveform => "waveform",
            ValueKind::WaveshaperCurve => "waveshaper curve (array of numbers)",
            ValueKind::Number => "number",
        }
    }

    /// Guess the kind of an untagged wire value.
    ///
    /// Only used for labels the catalog does not know. Booleans become
    /// attributes, numbers become plain numbers, arrays become buffers and
    /// strings must match one of the enum literals.
    pub fn infer(label: &str, json: &Json) -> Result<ValueKind> {
        match json {
            Json::Bool(_) => Ok(ValueKind::Attribute),
            Json::Number(_) => Ok(ValueKind::Number),
            Json::Array(_) => Ok(ValueKind::Buffer),
            Json::String(s) => {
                if s.parse::<FilterType>().is_ok() {
                    Ok(ValueKind::FilterType)
                } else if s.parse::<Waveform>().is_ok() {
                    Ok(ValueKind::Waveform)
                } else if s.parse::<DistanceModel>().is_ok() {
                    Ok(ValueKind::DistanceModel)
                } else if s.parse::<PanningModel>().is_ok() {
                    Ok(ValueKind::PanningModel)
                } else if s.parse::<Oversample>().is_ok() {
                    Ok(ValueKind::Oversample)
                } else {
                    Err(mismatch(label, "a known enum literal", json))
                }
            }
            Json::Null | Json::Object(_) => Err(mismatch(
                label,
                "boolean, number, array or enum literal",
                json,
            )),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn attribute(flag: bool) -> Self {
        Value::Attribute(flag)
    }

    pub fn buffer(samples: impl Into<Vec<f64>>) -> Self {
        Value::Buffer(Cow::Owned(samples.into()))
    }

    pub fn coefficients(coefficients: impl Into<Vec<f64>>) -> Self {
        Value::Coefficients(Cow::Owned(coefficients.into()))
    }

    pub fn cents(cents: f64) -> Self {
        Value::Cents(cents)
    }

    pub fn decibels(db: f64) -> Self {
        Value::Decibels(db)
    }

    pub fn distance_model(model: DistanceModel) -> Self {
        Value::DistanceModel(model)
    }

    pub fn filter_type(filter: FilterType) -> Self {
        Value::FilterType(filter)
    }

    pub fn fft_size(size: u32) -> Self {
        Value::FftSize(size)
    }

    pub fn hertz(hz: f64) -> Self {
        Value::Hertz(hz)
    }

    pub fn midi(value: i32) -> Self {
        Value::Midi(value)
    }

    pub fn oversample(oversample: Oversample) -> Self {
        Value::Oversample(oversample)
    }

    pub fn panning_model(model: PanningModel) -> Self {
        Value::PanningModel(model)
    }

    pub fn waveform(waveform: Waveform) -> Self {
        Value::Waveform(waveform)
    }

    pub fn waveshaper_curve(curve: impl Into<Vec<f64>>) -> Self {
        Value::WaveshaperCurve(Cow::Owned(curve.into()))
    }

    pub fn number(value: f64) -> Self {
        Value::Number(value)
    }

    /// Get the tag of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Attribute(_) => ValueKind::Attribute,
            Value::Buffer(_) => ValueKind::Buffer,
            Value::Coefficients(_) => ValueKind::Coefficients,
            Value::Cents(_) => ValueKind::Cents,
            Value::Decibels(_) => ValueKind::Decibels,
            Value::DistanceModel(_) => ValueKind::DistanceModel,
            Value::FilterType(_) => ValueKind::FilterType,
            Value::FftSize(_) => ValueKind::FftSize,
            Value::Hertz(_) => ValueKind::Hertz,
            Value::Midi(_) => ValueKind::Midi,
            Value::Oversample(_) => ValueKind::Oversample,
            Value::PanningModel(_) => ValueKind::PanningModel,
            Value::Waveform(_) => ValueKind::Waveform,
            Value::WaveshaperCurve(_) => ValueKind::WaveshaperCurve,
            Value::Number(_) => ValueKind::Number,
        }
    }

    /// Float payload of `Cents`, `Decibels`, `Hertz` and `Number` values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Cents(x) | Value::Decibels(x) | Value::Hertz(x) | Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Flag of an `Attribute` value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Attribute(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Integer payload of `FftSize` and `Midi` values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::FftSize(n) => Some(i64::from(*n)),
            Value::Midi(n) => Some(i64::from(*n)),
            _ => None,
        }
    }

    /// Sequence payload of `Buffer`, `Coefficients` and `WaveshaperCurve` values
    pub fn as_samples(&self) -> Option<&[f64]> {
        match self {
            Value::Buffer(s) | Value::Coefficients(s) | Value::WaveshaperCurve(s) => Some(&**s),
            _ => None,
        }
    }

    /// Decode an untagged wire value as the given kind.
    ///
    /// `label` only feeds the error message.
    pub fn decode(kind: ValueKind, label: &str, json: &Json) -> Result<Value> {
        let fail = || mismatch(label, kind.name(), json);
        let value = match kind {
            ValueKind::Attribute => Value::Attribute(json.as_bool().ok_or_else(fail)?),
            ValueKind::Buffer => Value::Buffer(decode_samples(json).ok_or_else(fail)?),
            ValueKind::Coefficients => Value::Coefficients(decode_samples(json).ok_or_else(fail)?),
            ValueKind::WaveshaperCurve => {
                Value::WaveshaperCurve(decode_samples(json).ok_or_else(fail)?)
            }
            ValueKind::Cents => Value::Cents(json.as_f64().ok_or_else(fail)?),
            ValueKind::Decibels => Value::Decibels(json.as_f64().ok_or_else(fail)?),
            ValueKind::Hertz => Value::Hertz(json.as_f64().ok_or_else(fail)?),
            ValueKind::Number => Value::Number(json.as_f64().ok_or_else(fail)?),
            ValueKind::FftSize => Value::FftSize(
                json.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(fail)?,
            ),
            ValueKind::Midi => Value::Midi(
                json.as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(fail)?,
            ),
            ValueKind::DistanceModel => Value::DistanceModel(decode_literal(label, json)?),
            ValueKind::FilterType => Value::FilterType(decode_literal(label, json)?),
            ValueKind::Oversample => Value::Oversample(decode_literal(label, json)?),
            ValueKind::PanningModel => Value::PanningModel(decode_literal(label, json)?),
            ValueKind::Waveform => Value::Waveform(decode_literal(label, json)?),
        };
        Ok(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Attribute(flag) => serializer.serialize_bool(*flag),
            Value::Buffer(s) | Value::Coefficients(s) | Value::WaveshaperCurve(s) => {
                s.serialize(serializer)
            }
            Value::Cents(x) | Value::Decibels(x) | Value::Hertz(x) | Value::Number(x) => {
                serializer.serialize_f64(*x)
            }
            Value::FftSize(n) => serializer.serialize_u32(*n),
            Value::Midi(n) => serializer.serialize_i32(*n),
            Value::DistanceModel(m) => serializer.serialize_str(m.as_str()),
            Value::FilterType(t) => serializer.serialize_str(t.as_str()),
            Value::Oversample(o) => serializer.serialize_str(o.as_str()),
            Value::PanningModel(m) => serializer.serialize_str(m.as_str()),
            Value::Waveform(w) => serializer.serialize_str(w.as_str()),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn decode_samples(json: &Json) -> Option<Samples> {
    json.as_array()?
        .iter()
        .map(Json::as_f64)
        .collect::<Option<Vec<f64>>>()
        .map(Cow::Owned)
}

fn decode_literal<T>(label: &str, json: &Json) -> Result<T>
where
    T: FromStr<Err = GraphError>,
{
    let literal = json
        .as_str()
        .ok_or_else(|| mismatch(label, "string literal", json))?;
    literal.parse::<T>().map_err(|err| match err {
        GraphError::InvalidValue { expected, found, .. } => GraphError::InvalidValue {
            label: label.to_string(),
            expected,
            found,
        },
        other => other,
    })
}

fn mismatch(label: &str, expected: &str, json: &Json) -> GraphError {
    let found = match json {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("boolean {}", b),
        Json::Number(n) => format!("number {}", n),
        Json::String(s) => format!("string {:?}", s),
        Json::Array(items) => format!("array of {} items", items.len()),
        Json::Object(_) => "object".to_string(),
    };
    GraphError::InvalidValue {
        label: label.to_string(),
        expected: expected.to_string(),
        found,
    }
}
