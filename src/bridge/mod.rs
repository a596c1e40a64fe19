//! Runtime Bridge
//!
//! The bridge turns successive graph snapshots into calls on a native audio
//! engine:
//! - First snapshot: create every node, then wire every connection
//! - Later snapshots: diff against the last applied snapshot and only
//!   touch what changed
//!
//! The engine itself sits behind [`NativeBackend`]. [`MemoryBackend`] is an
//! in-process stand-in that enforces the same contract a native engine
//! would (valid ids, channel indices and input names).

mod memory;
mod plan;
mod reconciler;

pub use memory::MemoryBackend;
pub use plan::{BridgeOp, EndpointPolicy, ReconcilePlan};
pub use reconciler::{DeliveryKind, ReconcileReport, Reconciler, Snapshot};

use crate::error::Result;
use crate::graph::Connection;
use crate::node::AudioNode;
use crate::value::Value;

/// Operations a native audio engine must provide to the bridge.
///
/// Any failure is reported as an error and stops the current
/// reconciliation; the bridge never retries.
pub trait NativeBackend {
    /// Instantiate a processing unit for `node` under `id`
    fn create_node(&mut self, id: &str, node: &AudioNode) -> Result<()>;

    /// Assign a param on an existing unit
    fn set_param(&mut self, id: &str, label: &str, value: &Value) -> Result<()>;

    /// Assign a property on an existing unit
    fn set_property(&mut self, id: &str, label: &str, value: &Value) -> Result<()>;

    /// Disconnect and destroy the unit `id`
    fn delete_node(&mut self, id: &str) -> Result<()>;

    /// Wire an output to a channel or param input
    fn connect(&mut self, connection: &Connection) -> Result<()>;

    /// Remove a previously wired connection
    fn disconnect(&mut self, connection: &Connection) -> Result<()>;
}
