//! Audio Graph
//!
//! `AudioGraph` is a persistent value: every mutator takes `&self` and
//! returns a new graph, so a snapshot handed to the bridge can never change
//! under it. Nothing here fails. Connections may point at ids that do not
//! exist and replacement values are not kind-checked; the runtime bridge
//! deals with both.
//!
//! `GraphBuilder` wraps the same semantics in a mutable API for call sites
//! that build a graph step by step.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::{AudioNode, NodeInput, NodeType};
use crate::value::Value;

/// Directed edge from a node output to a channel or param input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub output_node: String,
    pub output_channel: u32,
    pub input_node: String,
    pub input_destination: NodeInput,
}

impl Connection {
    /// Connect an output channel to a numbered input channel
    pub fn channel(
        output_node: impl Into<String>,
        output_channel: u32,
        input_node: impl Into<String>,
        input_channel: u32,
    ) -> Self {
        Self {
            output_node: output_node.into(),
            output_channel,
            input_node: input_node.into(),
            input_destination: NodeInput::channel(input_channel),
        }
    }

    /// Connect an output channel to a param of the receiving node
    pub fn param(
        output_node: impl Into<String>,
        output_channel: u32,
        input_node: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            output_node: output_node.into(),
            output_channel,
            input_node: input_node.into(),
            input_destination: NodeInput::param(param),
        }
    }

    /// Check whether either end of this connection is `id`
    pub fn touches(&self, id: &str) -> bool {
        self.output_node == id || self.input_node == id
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] -> {} {}",
            self.output_node, self.output_channel, self.input_node, self.input_destination
        )
    }
}

/// The complete set of nodes (by id) and connections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioGraph {
    nodes: BTreeMap<String, AudioNode>,
    connections: Vec<Connection>,
}

/// Create an empty graph
pub fn create_graph() -> AudioGraph {
    AudioGraph::new()
}

impl AudioGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from parts, keeping the connection order as given
    pub fn from_parts(nodes: BTreeMap<String, AudioNode>, connections: Vec<Connection>) -> Self {
        Self { nodes, connections }
    }

    /// Return a graph with `node` stored under `id`, replacing any previous node
    #[must_use]
    pub fn set_node(&self, id: impl Into<String>, node: AudioNode) -> AudioGraph {
        let mut graph = self.clone();
        graph.nodes.insert(id.into(), node);
        graph
    }

    /// Get a node by id
    pub fn get_node(&self, id: &str) -> Option<&AudioNode> {
        self.nodes.get(id)
    }

    /// Return a graph without the node `id`.
    ///
    /// Connections touching `id` are kept.
    #[must_use]
    pub fn remove_node(&self, id: &str) -> AudioGraph {
        let mut graph = self.clone();
        graph.nodes.remove(id);
        graph
    }

    /// Return a graph with `connection` at the front of the connection list.
    ///
    /// If a structurally equal connection already exists the graph is
    /// returned unchanged.
    #[must_use]
    pub fn add_connection(&self, connection: Connection) -> AudioGraph {
        if self.contains_connection(&connection) {
            return self.clone();
        }
        let mut graph = self.clone();
        graph.connections.insert(0, connection);
        graph
    }

    /// Return a graph without any connection equal to `connection`
    #[must_use]
    pub fn remove_connection(&self, connection: &Connection) -> AudioGraph {
        let mut graph = self.clone();
        graph.connections.retain(|c| c != connection);
        graph
    }

    /// Check whether a structurally equal connection exists
    pub fn contains_connection(&self, connection: &Connection) -> bool {
        self.connections.iter().any(|c| c == connection)
    }

    /// Nodes keyed by id, in id order
    pub fn nodes(&self) -> &BTreeMap<String, AudioNode> {
        &self.nodes
    }

    /// Connections, most recently added first
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has neither nodes nor connections
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    /// Connections with an endpoint that is not a node of this graph.
    ///
    /// Purely informational; graph operations never consult it.
    pub fn dangling_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| {
                !self.nodes.contains_key(&c.output_node) || !self.nodes.contains_key(&c.input_node)
            })
            .collect()
    }
}

/// Mutable front end over [`AudioGraph`] semantics
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    graph: AudioGraph,
}

impl GraphBuilder {
    /// Start from an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing graph
    pub fn from_graph(graph: AudioGraph) -> Self {
        Self { graph }
    }

    /// Insert or replace a node
    pub fn insert(&mut self, id: impl Into<String>, node: AudioNode) -> &mut Self {
        self.graph.nodes.insert(id.into(), node);
        self
    }

    /// Insert a catalog default node of `node_type`
    pub fn insert_default(&mut self, id: impl Into<String>, node_type: NodeType) -> &mut Self {
        self.insert(id, AudioNode::new(node_type))
    }

    /// Insert a node under a generated id and return that id
    pub fn insert_auto(&mut self, node: AudioNode) -> String {
        let id = format!("{}-{}", node.node_type, Uuid::new_v4());
        self.graph.nodes.insert(id.clone(), node);
        id
    }

    /// Remove a node; connections touching it are kept
    pub fn remove(&mut self, id: &str) -> Option<AudioNode> {
        self.graph.nodes.remove(id)
    }

    /// Add a connection unless an equal one exists
    pub fn connect(&mut self, connection: Connection) -> &mut Self {
        if !self.graph.contains_connection(&connection) {
            self.graph.connections.insert(0, connection);
        }
        self
    }

    /// Remove every connection equal to `connection`
    pub fn disconnect(&mut self, connection: &Connection) -> &mut Self {
        self.graph.connections.retain(|c| c != connection);
        self
    }

    /// Replace a param value on node `id`; no-op if either is missing
    pub fn update_param(&mut self, id: &str, label: &str, value: Value) -> &mut Self {
        if let Some(node) = self.graph.nodes.get_mut(id) {
            *node = node.update_param(label, value);
        }
        self
    }

    /// Replace a property value on node `id`; no-op if either is missing
    pub fn update_property(&mut self, id: &str, label: &str, value: Value) -> &mut Self {
        if let Some(node) = self.graph.nodes.get_mut(id) {
            *node = node.update_property(label, value);
        }
        self
    }

    /// Borrow the graph built so far
    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    /// Finish building
    pub fn build(self) -> AudioGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osc_to_destination() -> Connection {
        Connection::channel("osc", 0, "__destination", 0)
    }

    #[test]
    fn test_create_graph_is_empty() {
        let graph = create_graph();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let osc = AudioNode::new(NodeType::Oscillator);
        let graph = create_graph().set_node("osc", osc.clone());
        assert_eq!(graph.get_node("osc"), Some(&osc));
        assert_eq!(graph.get_node("gain"), None);
    }

    #[test]
    fn test_set_node_replaces() {
        let graph = create_graph()
            .set_node("n", AudioNode::new(NodeType::Oscillator))
            .set_node("n", AudioNode::new(NodeType::Gain));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get_node("n").unwrap().node_type, NodeType::Gain);
    }

    #[test]
    fn test_mutators_leave_original_untouched() {
        let base = create_graph().set_node("osc", AudioNode::new(NodeType::Oscillator));
        let _ = base.remove_node("osc");
        let _ = base.add_connection(osc_to_destination());
        assert!(base.get_node("osc").is_some());
        assert!(base.connections().is_empty());
    }

    #[test]
    fn test_remove_absent_node_is_noop() {
        let graph = create_graph().set_node("osc", AudioNode::new(NodeType::Oscillator));
        assert_eq!(graph.remove_node("missing"), graph);
    }

    #[test]
    fn test_add_connection_prepends() {
        let first = osc_to_destination();
        let second = Connection::param("lfo", 0, "osc", "frequency");
        let graph = create_graph()
            .add_connection(first.clone())
            .add_connection(second.clone());
        assert_eq!(graph.connections(), &[second, first][..]);
    }

    #[test]
    fn test_add_connection_twice_keeps_one() {
        let graph = create_graph()
            .add_connection(osc_to_destination())
            .add_connection(osc_to_destination());
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn test_channel_and_param_destinations_differ() {
        let graph = create_graph()
            .add_connection(Connection::channel("a", 0, "b", 0))
            .add_connection(Connection::param("a", 0, "b", "0"));
        assert_eq!(graph.connections().len(), 2);
    }

    #[test]
    fn test_remove_connection_round_trip() {
        let base = create_graph().add_connection(Connection::channel("a", 0, "b", 0));
        let graph = base
            .add_connection(osc_to_destination())
            .remove_connection(&osc_to_destination());
        assert_eq!(graph.connections(), base.connections());
        assert_eq!(graph.remove_connection(&osc_to_destination()), graph);
    }

    #[test]
    fn test_dangling_connections() {
        let graph = create_graph()
            .set_node("osc", AudioNode::new(NodeType::Oscillator))
            .add_connection(osc_to_destination());
        let dangling = graph.dangling_connections();
        assert_eq!(dangling, vec![&osc_to_destination()]);

        let fixed = graph.set_node("__destination", AudioNode::new(NodeType::AudioDestination));
        assert!(fixed.dangling_connections().is_empty());
    }

    #[test]
    fn test_connection_display() {
        assert_eq!(
            osc_to_destination().to_string(),
            "osc[0] -> __destination channel 0"
        );
        assert_eq!(
            Connection::param("lfo", 0, "osc", "frequency").to_string(),
            "lfo[0] -> osc param 'frequency'"
        );
    }

    #[test]
    fn test_builder_matches_persistent_api() {
        let mut builder = GraphBuilder::new();
        builder
            .insert_default("osc", NodeType::Oscillator)
            .connect(osc_to_destination())
            .connect(osc_to_destination())
            .update_param("osc", "frequency", Value::hertz(6.0));
        let built = builder.build();

        let expected = create_graph()
            .set_node(
                "osc",
                AudioNode::new(NodeType::Oscillator).update_param("frequency", Value::hertz(6.0)),
            )
            .add_connection(osc_to_destination());
        assert_eq!(built, expected);
    }

    #[test]
    fn test_builder_auto_ids_are_unique() {
        let mut builder = GraphBuilder::new();
        let a = builder.insert_auto(AudioNode::new(NodeType::Gain));
        let b = builder.insert_auto(AudioNode::new(NodeType::Gain));
        assert_ne!(a, b);
        assert!(a.starts_with("Gain-"));
        assert_eq!(builder.graph().len(), 2);
    }
}
