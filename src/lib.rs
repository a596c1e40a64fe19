//! Audiograph - Typed Audio Processing Graphs
//!
//! Audiograph describes an audio processing graph as plain data: nodes
//! (oscillators, filters, gains, ...) keyed by id, plus the connections
//! between them. The graph is serialized to JSON and handed to a runtime
//! audio engine, which does the actual signal processing.
//!
//! # Architecture
//!
//! - `value`: unit-tagged param and property values
//! - `node` / `catalog`: node types and their default signatures
//! - `graph`: the persistent graph value and a mutable builder
//! - `codec`: canonical JSON encoding, decoding and fingerprints
//! - `bridge`: reconciliation of successive snapshots against a native backend
//!
//! Everything up to and including the codec's encoder is total: no
//! operation fails. Errors only arise when decoding snapshots or talking to
//! a backend.

pub mod bridge;
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod graph;
pub mod node;
pub mod value;

pub use config::{Config, DESTINATION_ID};
pub use error::{GraphError, Result};
pub use graph::{create_graph, AudioGraph, Connection, GraphBuilder};
pub use node::{AudioNode, AudioParam, NodeInput, NodeProperty, NodeType};
pub use value::{
    DistanceModel, FilterType, Oversample, PanningModel, Value, ValueKind, Waveform,
};
