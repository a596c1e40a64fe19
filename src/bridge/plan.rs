//! Reconcile Plans
//!
//! A plan is the ordered list of backend calls that moves a native graph
//! from one snapshot to the next. Planning is pure; nothing touches a
//! backend until [`ReconcilePlan::apply`].
//!
//! Update order:
//! 1. Disconnect connections that disappeared, plus every old connection
//!    touching a node that is deleted or recreated
//! 2. Delete removed nodes
//! 3. Delete and recreate nodes whose signature (type, inputs, outputs,
//!    param and property labels) changed
//! 4. Create new nodes
//! 5. Set changed params and properties on the remaining nodes
//! 6. Connect new connections, plus every connection touching a recreated node

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::NativeBackend;
use crate::error::{GraphError, Result};
use crate::graph::{AudioGraph, Connection};
use crate::node::AudioNode;
use crate::value::Value;

/// What to do with a connection whose endpoint is not a node of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointPolicy {
    /// Leave it out of the plan and log a warning
    #[default]
    Skip,
    /// Fail planning with `DanglingEndpoint`
    Reject,
}

/// A single backend call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BridgeOp {
    Disconnect { connection: Connection },
    DeleteNode { id: String },
    CreateNode { id: String, node: AudioNode },
    SetParam { id: String, label: String, value: Value },
    SetProperty { id: String, label: String, value: Value },
    Connect { connection: Connection },
}

impl BridgeOp {
    /// Perform this call on a backend
    pub fn apply<B: NativeBackend + ?Sized>(&self, backend: &mut B) -> Result<()> {
        match self {
            BridgeOp::Disconnect { connection } => backend.disconnect(connection),
            BridgeOp::DeleteNode { id } => backend.delete_node(id),
            BridgeOp::CreateNode { id, node } => backend.create_node(id, node),
            BridgeOp::SetParam { id, label, value } => backend.set_param(id, label, value),
            BridgeOp::SetProperty { id, label, value } => backend.set_property(id, label, value),
            BridgeOp::Connect { connection } => backend.connect(connection),
        }
    }

    /// The graph a backend holds after this call succeeds on a backend
    /// holding `graph`
    pub fn mirror(&self, graph: &AudioGraph) -> AudioGraph {
        match self {
            BridgeOp::Disconnect { connection } => graph.remove_connection(connection),
            BridgeOp::DeleteNode { id } => graph.remove_node(id),
            BridgeOp::CreateNode { id, node } => graph.set_node(id.as_str(), node.clone()),
            BridgeOp::SetParam { id, label, value } => match graph.get_node(id) {
                Some(node) => graph.set_node(id.as_str(), node.update_param(label, value.clone())),
                None => graph.clone(),
            },
            BridgeOp::SetProperty { id, label, value } => match graph.get_node(id) {
                Some(node) => {
                    graph.set_node(id.as_str(), node.update_property(label, value.clone()))
                }
                None => graph.clone(),
            },
            BridgeOp::Connect { connection } => graph.add_connection(connection.clone()),
        }
    }
}

impl fmt::Display for BridgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeOp::Disconnect { connection } => write!(f, "disconnect {}", connection),
            BridgeOp::DeleteNode { id } => write!(f, "delete {}", id),
            BridgeOp::CreateNode { id, node } => write!(f, "create {} ({})", id, node.node_type),
            BridgeOp::SetParam { id, label, value } => {
                write!(f, "set param {}.{} = {:?}", id, label, value)
            }
            BridgeOp::SetProperty { id, label, value } => {
                write!(f, "set property {}.{} = {:?}", id, label, value)
            }
            BridgeOp::Connect { connection } => write!(f, "connect {}", connection),
        }
    }
}

/// Ordered backend calls plus the connections left out of them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcilePlan {
    pub ops: Vec<BridgeOp>,
    /// Connections with a missing endpoint, skipped under `EndpointPolicy::Skip`
    pub skipped: Vec<Connection>,
}

impl ReconcilePlan {
    /// Plan a full build of `graph` on an empty backend
    pub fn initial(graph: &AudioGraph, policy: EndpointPolicy) -> Result<Self> {
        let mut skipped = Vec::new();
        let live = live_connections(graph, policy, &mut skipped)?;

        let mut ops: Vec<BridgeOp> = graph
            .nodes()
            .iter()
            .map(|(id, node)| BridgeOp::CreateNode {
                id: id.clone(),
                node: node.clone(),
            })
            .collect();
        ops.extend(live.into_iter().map(|c| BridgeOp::Connect {
            connection: c.clone(),
        }));

        debug!(ops = ops.len(), skipped = skipped.len(), "planned initial build");
        Ok(Self { ops, skipped })
    }

    /// Plan the calls that move a backend holding `prev` to `next`
    pub fn update(prev: &AudioGraph, next: &AudioGraph, policy: EndpointPolicy) -> Result<Self> {
        let mut skipped = Vec::new();
        // Anything dangling in `prev` was never wired, so it is never unwired.
        let before = live_connections(prev, EndpointPolicy::Skip, &mut Vec::new())?;
        let after = live_connections(next, policy, &mut skipped)?;

        let removed: BTreeSet<&str> = prev
            .nodes()
            .keys()
            .filter(|id| next.get_node(id).is_none())
            .map(String::as_str)
            .collect();
        let recreated: BTreeSet<&str> = prev
            .nodes()
            .iter()
            .filter(|(id, old)| {
                next.get_node(id)
                    .map(|new| !same_signature(old, new))
                    .unwrap_or(false)
            })
            .map(|(id, _)| id.as_str())
            .collect();
        let touches_rebuilt =
            |c: &Connection| removed.iter().chain(recreated.iter()).any(|id| c.touches(id));

        let after_set: HashSet<&Connection> = after.iter().copied().collect();
        let before_set: HashSet<&Connection> = before.iter().copied().collect();

        let mut ops = Vec::new();

        // 1. Disconnect
        ops.extend(
            before
                .iter()
                .filter(|c| !after_set.contains(*c) || touches_rebuilt(**c))
                .map(|c| BridgeOp::Disconnect {
                    connection: (*c).clone(),
                }),
        );

        // 2. Delete removed
        ops.extend(removed.iter().map(|id| BridgeOp::DeleteNode {
            id: (*id).to_string(),
        }));

        // 3. Recreate
        for id in &recreated {
            if let Some(node) = next.get_node(id) {
                ops.push(BridgeOp::DeleteNode {
                    id: (*id).to_string(),
                });
                ops.push(BridgeOp::CreateNode {
                    id: (*id).to_string(),
                    node: node.clone(),
                });
            }
        }

        // 4. Create new, 5. Update in place
        for (id, node) in next.nodes() {
            match prev.get_node(id) {
                None => ops.push(BridgeOp::CreateNode {
                    id: id.clone(),
                    node: node.clone(),
                }),
                Some(old) if !recreated.contains(id.as_str()) => {
                    ops.extend(value_changes(id, old, node));
                }
                Some(_) => {}
            }
        }

        // 6. Connect
        ops.extend(
            after
                .iter()
                .filter(|c| !before_set.contains(*c) || touches_rebuilt(**c))
                .map(|c| BridgeOp::Connect {
                    connection: (*c).clone(),
                }),
        );

        debug!(
            ops = ops.len(),
            removed = removed.len(),
            recreated = recreated.len(),
            skipped = skipped.len(),
            "planned update"
        );
        Ok(Self { ops, skipped })
    }

    /// Perform every call in order, stopping at the first failure.
    ///
    /// `held` starts as the graph the backend holds and is advanced past
    /// each call that succeeds, so after a failure it still describes the
    /// backend.
    pub fn apply<B: NativeBackend + ?Sized>(
        &self,
        backend: &mut B,
        held: &mut AudioGraph,
    ) -> Result<()> {
        for op in &self.ops {
            op.apply(backend)?;
            *held = op.mirror(held);
        }
        Ok(())
    }

    /// Number of backend calls
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the plan makes no backend calls
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Connections of `graph` with both endpoints present, deduplicated, in list order
fn live_connections<'a>(
    graph: &'a AudioGraph,
    policy: EndpointPolicy,
    skipped: &mut Vec<Connection>,
) -> Result<Vec<&'a Connection>> {
    let mut seen: HashSet<&Connection> = HashSet::new();
    let mut live = Vec::new();

    for connection in graph.connections() {
        let missing = [&connection.output_node, &connection.input_node]
            .into_iter()
            .find(|id| graph.get_node(id).is_none());

        if let Some(node_id) = missing {
            match policy {
                EndpointPolicy::Reject => {
                    return Err(GraphError::DanglingEndpoint {
                        node_id: node_id.clone(),
                    })
                }
                EndpointPolicy::Skip => {
                    warn!(node_id = %node_id, "skipping connection with missing endpoint");
                    skipped.push(connection.clone());
                    continue;
                }
            }
        }

        if seen.insert(connection) {
            live.push(connection);
        }
    }

    Ok(live)
}

/// Nodes with the same signature can be moved from one to the other with
/// value assignments alone. A param or property that disappears has nothing
/// to be assigned, so the label lists count too.
fn same_signature(a: &AudioNode, b: &AudioNode) -> bool {
    a.node_type == b.node_type
        && a.inputs == b.inputs
        && a.num_outputs == b.num_outputs
        && a.params.iter().map(|p| &p.label).eq(b.params.iter().map(|p| &p.label))
        && a.properties
            .iter()
            .map(|p| &p.label)
            .eq(b.properties.iter().map(|p| &p.label))
}

fn value_changes(id: &str, old: &AudioNode, new: &AudioNode) -> Vec<BridgeOp> {
    let params = new
        .params
        .iter()
        .filter(|p| old.param(&p.label) != Some(&p.value))
        .map(|p| BridgeOp::SetParam {
            id: id.to_string(),
            label: p.label.clone(),
            value: p.value.clone(),
        });
    let properties = new
        .properties
        .iter()
        .filter(|p| old.property(&p.label) != Some(&p.value))
        .map(|p| BridgeOp::SetProperty {
            id: id.to_string(),
            label: p.label.clone(),
            value: p.value.clone(),
        });
    params.chain(properties).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::create_graph;
    use crate::node::{NodeProperty, NodeType};

    fn base() -> AudioGraph {
        create_graph()
            .set_node("osc", AudioNode::new(NodeType::Oscillator))
            .set_node("out", AudioNode::new(NodeType::AudioDestination))
            .add_connection(Connection::channel("osc", 0, "out", 0))
    }

    #[test]
    fn test_initial_creates_before_connecting() {
        let plan = ReconcilePlan::initial(&base(), EndpointPolicy::Skip).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(matches!(plan.ops[0], BridgeOp::CreateNode { .. }));
        assert!(matches!(plan.ops[1], BridgeOp::CreateNode { .. }));
        assert!(matches!(plan.ops[2], BridgeOp::Connect { .. }));
    }

    #[test]
    fn test_identical_snapshots_plan_nothing() {
        let plan = ReconcilePlan::update(&base(), &base(), EndpointPolicy::Skip).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_param_change_is_set_in_place() {
        let next = base().set_node(
            "osc",
            AudioNode::new(NodeType::Oscillator).update_param("frequency", Value::hertz(6.0)),
        );
        let plan = ReconcilePlan::update(&base(), &next, EndpointPolicy::Skip).unwrap();
        assert_eq!(
            plan.ops,
            vec![BridgeOp::SetParam {
                id: "osc".to_string(),
                label: "frequency".to_string(),
                value: Value::hertz(6.0),
            }]
        );
    }

    #[test]
    fn test_removed_node_is_unwired_then_deleted() {
        let next = base().remove_node("osc");
        let plan = ReconcilePlan::update(&base(), &next, EndpointPolicy::Skip).unwrap();
        assert_eq!(
            plan.ops,
            vec![
                BridgeOp::Disconnect {
                    connection: Connection::channel("osc", 0, "out", 0)
                },
                BridgeOp::DeleteNode {
                    id: "osc".to_string()
                },
            ]
        );
        // The connection still in `next` dangles and is skipped
        assert_eq!(plan.skipped.len(), 1);
    }

    #[test]
    fn test_type_change_recreates_and_rewires() {
        let next = base().set_node("osc", AudioNode::new(NodeType::ConstantSource));
        let plan = ReconcilePlan::update(&base(), &next, EndpointPolicy::Skip).unwrap();
        let edge = Connection::channel("osc", 0, "out", 0);
        assert_eq!(
            plan.ops,
            vec![
                BridgeOp::Disconnect {
                    connection: edge.clone()
                },
                BridgeOp::DeleteNode {
                    id: "osc".to_string()
                },
                BridgeOp::CreateNode {
                    id: "osc".to_string(),
                    node: AudioNode::new(NodeType::ConstantSource),
                },
                BridgeOp::Connect { connection: edge },
            ]
        );
    }

    #[test]
    fn test_dropped_property_recreates_node() {
        let mut old = AudioNode::new(NodeType::Gain);
        old.properties
            .push(NodeProperty::new("muted", Value::attribute(true)));
        let prev = base().set_node("gain", old);
        let next = base().set_node("gain", AudioNode::new(NodeType::Gain));

        let plan = ReconcilePlan::update(&prev, &next, EndpointPolicy::Skip).unwrap();
        assert_eq!(
            plan.ops,
            vec![
                BridgeOp::DeleteNode {
                    id: "gain".to_string()
                },
                BridgeOp::CreateNode {
                    id: "gain".to_string(),
                    node: AudioNode::new(NodeType::Gain),
                },
            ]
        );
    }

    #[test]
    fn test_mirror_tracks_applied_calls() {
        let ops = ReconcilePlan::initial(&base(), EndpointPolicy::Skip).unwrap().ops;
        let held = ops
            .iter()
            .fold(AudioGraph::new(), |graph, op| op.mirror(&graph));
        assert_eq!(held, base());

        let set = BridgeOp::SetParam {
            id: "osc".to_string(),
            label: "frequency".to_string(),
            value: Value::hertz(6.0),
        };
        assert_eq!(
            set.mirror(&held).get_node("osc").and_then(|n| n.param("frequency")),
            Some(&Value::hertz(6.0))
        );
    }

    #[test]
    fn test_reject_policy_fails_on_dangling() {
        let graph = base().add_connection(Connection::channel("lfo", 0, "osc", 0));
        let err = ReconcilePlan::initial(&graph, EndpointPolicy::Reject).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEndpoint { node_id } if node_id == "lfo"));
    }
}
