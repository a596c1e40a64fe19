//! Snapshot Reconciler
//!
//! Receives graph snapshots and keeps a backend in step with them. The
//! first delivery is a full build; that latch never resets on its own, so
//! every later delivery is applied as a diff against the graph the backend
//! holds.
//!
//! When a backend call fails partway through a delivery, the calls before
//! it stay applied. The reconciler records the graph those calls produced
//! and diffs the next delivery against it.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::plan::{EndpointPolicy, ReconcilePlan};
use super::NativeBackend;
use crate::codec;
use crate::config::Config;
use crate::error::Result;
use crate::graph::AudioGraph;

/// The graph a backend holds
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub graph: AudioGraph,
    /// SHA-256 of the canonical encoding
    pub fingerprint: String,
    /// False when a delivery stopped partway and `graph` is what it left behind
    pub complete: bool,
    pub applied_at: DateTime<Utc>,
}

impl Snapshot {
    fn new(graph: AudioGraph, fingerprint: String, complete: bool) -> Self {
        Self {
            graph,
            fingerprint,
            complete,
            applied_at: Utc::now(),
        }
    }
}

/// How a delivery was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// First snapshot, built from scratch
    Initial,
    /// Applied as a diff against the previous snapshot
    Update,
    /// Same content as the previous snapshot; nothing to do
    Unchanged,
}

/// Outcome of one delivery
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub kind: DeliveryKind,
    pub plan: ReconcilePlan,
    pub fingerprint: String,
}

/// Applies snapshots to a [`NativeBackend`]
#[derive(Debug)]
pub struct Reconciler<B> {
    backend: B,
    policy: EndpointPolicy,
    current: Option<Snapshot>,
}

impl<B: NativeBackend> Reconciler<B> {
    /// Create a reconciler that skips dangling connections
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: EndpointPolicy::default(),
            current: None,
        }
    }

    /// Create a reconciler using the endpoint policy from `config`
    pub fn with_config(backend: B, config: &Config) -> Self {
        Self {
            backend,
            policy: config.endpoint_policy(),
            current: None,
        }
    }

    /// Bring the backend in line with `graph`.
    ///
    /// # Errors
    /// Planning errors (`DanglingEndpoint` under the reject policy) leave
    /// the backend untouched. A backend error stops the delivery where it
    /// happened and is returned as is; the current snapshot becomes the
    /// graph the successful calls produced, marked incomplete.
    pub fn receive(&mut self, graph: AudioGraph) -> Result<ReconcileReport> {
        let fingerprint = codec::fingerprint(&graph);

        let (kind, plan) = match &self.current {
            Some(previous) if previous.fingerprint == fingerprint => {
                debug!(%fingerprint, "snapshot unchanged");
                (DeliveryKind::Unchanged, ReconcilePlan::default())
            }
            Some(previous) => (
                DeliveryKind::Update,
                ReconcilePlan::update(&previous.graph, &graph, self.policy)?,
            ),
            None => {
                info!(nodes = graph.len(), "building initial graph");
                (
                    DeliveryKind::Initial,
                    ReconcilePlan::initial(&graph, self.policy)?,
                )
            }
        };

        let mut held = self
            .current
            .as_ref()
            .map(|s| s.graph.clone())
            .unwrap_or_default();
        if let Err(err) = plan.apply(&mut self.backend, &mut held) {
            warn!(error = %err, "delivery stopped partway");
            let held_fingerprint = codec::fingerprint(&held);
            self.current = Some(Snapshot::new(held, held_fingerprint, false));
            return Err(err);
        }

        if kind != DeliveryKind::Unchanged {
            self.current = Some(Snapshot::new(graph, fingerprint.clone(), true));
        }

        Ok(ReconcileReport {
            kind,
            plan,
            fingerprint,
        })
    }

    /// Decode a serialized snapshot and apply it
    ///
    /// # Errors
    /// An unknown node type or malformed document is returned before the
    /// backend is touched.
    pub fn receive_json(&mut self, input: &str) -> Result<ReconcileReport> {
        let graph = codec::from_str(input)?;
        self.receive(graph)
    }

    /// The graph the backend holds, if anything was delivered
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Forget the applied snapshot so the next delivery is a full build.
    ///
    /// The caller is responsible for clearing the backend first.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeOp, MemoryBackend};
    use crate::graph::{create_graph, Connection};
    use crate::node::{AudioNode, NodeType};

    fn graph() -> AudioGraph {
        create_graph()
            .set_node("osc", AudioNode::new(NodeType::Oscillator))
            .set_node("out", AudioNode::new(NodeType::AudioDestination))
            .add_connection(Connection::channel("osc", 0, "out", 0))
    }

    #[test]
    fn test_first_delivery_is_initial() {
        let mut reconciler = Reconciler::new(MemoryBackend::new());
        let report = reconciler.receive(graph()).unwrap();
        assert_eq!(report.kind, DeliveryKind::Initial);
        assert_eq!(report.plan.len(), 3);
        assert_eq!(reconciler.backend().node_count(), 2);
    }

    #[test]
    fn test_latch_holds_after_first_delivery() {
        let mut reconciler = Reconciler::new(MemoryBackend::new());
        reconciler.receive(create_graph()).unwrap();
        let report = reconciler.receive(graph()).unwrap();
        assert_eq!(report.kind, DeliveryKind::Update);
    }

    #[test]
    fn test_same_content_is_unchanged() {
        let mut reconciler = Reconciler::new(MemoryBackend::new());
        reconciler.receive(graph()).unwrap();
        let report = reconciler.receive(graph()).unwrap();
        assert_eq!(report.kind, DeliveryKind::Unchanged);
        assert!(report.plan.is_empty());
    }

    #[test]
    fn test_partial_failure_is_diffed_from_what_was_applied() {
        let mut reconciler = Reconciler::new(MemoryBackend::new());
        reconciler.receive(graph()).unwrap();

        // The gain is created before the out-of-range wire is refused
        let with_gain = graph().set_node("g", AudioNode::new(NodeType::Gain));
        let bad = with_gain.add_connection(Connection::channel("osc", 5, "g", 0));
        assert!(reconciler.receive(bad).is_err());

        let held = reconciler.current().unwrap();
        assert!(!held.complete);
        assert_eq!(held.graph, with_gain);
        assert!(reconciler.backend().unit("g").is_some());

        let good = with_gain.add_connection(Connection::channel("osc", 0, "g", 0));
        let report = reconciler.receive(good.clone()).unwrap();
        assert_eq!(report.kind, DeliveryKind::Update);
        assert_eq!(
            report.plan.ops,
            vec![BridgeOp::Connect {
                connection: Connection::channel("osc", 0, "g", 0)
            }]
        );
        assert!(reconciler.current().unwrap().complete);
        assert_eq!(reconciler.current().unwrap().graph, good);
    }

    #[test]
    fn test_failed_delivery_keeps_previous_snapshot() {
        let mut reconciler = Reconciler::new(MemoryBackend::new());
        let first = reconciler.receive(graph()).unwrap();

        // Destination has no outputs, so the backend refuses this wire
        let bad = graph().add_connection(Connection::channel("out", 0, "osc", 0));
        assert!(reconciler.receive(bad).is_err());
        assert_eq!(
            reconciler.current().map(|s| s.fingerprint.as_str()),
            Some(first.fingerprint.as_str())
        );
    }
}
