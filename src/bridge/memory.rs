//! In-Memory Backend
//!
//! Simulates a native engine: keeps one unit per node id and the set of
//! live wires, and refuses calls a real engine would refuse.

use std::collections::BTreeMap;

use super::plan::BridgeOp;
use super::NativeBackend;
use crate::error::{GraphError, Result};
use crate::graph::Connection;
use crate::node::AudioNode;
use crate::value::Value;

/// Native graph simulation used by tests and CLI dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    units: BTreeMap<String, AudioNode>,
    wires: Vec<Connection>,
    journal: Vec<BridgeOp>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the unit state for `id`
    pub fn unit(&self, id: &str) -> Option<&AudioNode> {
        self.units.get(id)
    }

    /// Number of live units
    pub fn node_count(&self) -> usize {
        self.units.len()
    }

    /// Live wires, in the order they were connected
    pub fn wires(&self) -> &[Connection] {
        &self.wires
    }

    /// Check whether a wire is live
    pub fn is_wired(&self, connection: &Connection) -> bool {
        self.wires.contains(connection)
    }

    /// Every call that succeeded, in order
    pub fn journal(&self) -> &[BridgeOp] {
        &self.journal
    }

    /// Drop all units, wires and journal entries
    pub fn clear(&mut self) {
        self.units.clear();
        self.wires.clear();
        self.journal.clear();
    }

    fn unit_mut(&mut self, operation: &str, id: &str) -> Result<&mut AudioNode> {
        self.units
            .get_mut(id)
            .ok_or_else(|| GraphError::backend(operation, format!("no unit with id '{}'", id)))
    }
}

impl NativeBackend for MemoryBackend {
    fn create_node(&mut self, id: &str, node: &AudioNode) -> Result<()> {
        if self.units.contains_key(id) {
            return Err(GraphError::backend(
                "create_node",
                format!("unit '{}' already exists", id),
            ));
        }
        self.units.insert(id.to_string(), node.clone());
        self.journal.push(BridgeOp::CreateNode {
            id: id.to_string(),
            node: node.clone(),
        });
        Ok(())
    }

    fn set_param(&mut self, id: &str, label: &str, value: &Value) -> Result<()> {
        let unit = self.unit_mut("set_param", id)?;
        if unit.param(label).is_none() {
            return Err(GraphError::backend(
                "set_param",
                format!("unit '{}' has no param '{}'", id, label),
            ));
        }
        *unit = unit.update_param(label, value.clone());
        self.journal.push(BridgeOp::SetParam {
            id: id.to_string(),
            label: label.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn set_property(&mut self, id: &str, label: &str, value: &Value) -> Result<()> {
        let unit = self.unit_mut("set_property", id)?;
        if unit.property(label).is_none() {
            return Err(GraphError::backend(
                "set_property",
                format!("unit '{}' has no property '{}'", id, label),
            ));
        }
        *unit = unit.update_property(label, value.clone());
        self.journal.push(BridgeOp::SetProperty {
            id: id.to_string(),
            label: label.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn delete_node(&mut self, id: &str) -> Result<()> {
        if self.units.remove(id).is_none() {
            return Err(GraphError::backend(
                "delete_node",
                format!("no unit with id '{}'", id),
            ));
        }
        self.wires.retain(|w| !w.touches(id));
        self.journal.push(BridgeOp::DeleteNode { id: id.to_string() });
        Ok(())
    }

    fn connect(&mut self, connection: &Connection) -> Result<()> {
        let source = self.units.get(&connection.output_node).ok_or_else(|| {
            GraphError::backend(
                "connect",
                format!("no unit with id '{}'", connection.output_node),
            )
        })?;
        if connection.output_channel >= source.num_outputs {
            return Err(GraphError::backend(
                "connect",
                format!(
                    "output channel {} out of range for '{}' ({} outputs)",
                    connection.output_channel, connection.output_node, source.num_outputs
                ),
            ));
        }

        let target = self.units.get(&connection.input_node).ok_or_else(|| {
            GraphError::backend(
                "connect",
                format!("no unit with id '{}'", connection.input_node),
            )
        })?;
        if !target.has_input(&connection.input_destination) {
            return Err(GraphError::backend(
                "connect",
                format!(
                    "'{}' has no input {}",
                    connection.input_node, connection.input_destination
                ),
            ));
        }

        if self.is_wired(connection) {
            return Err(GraphError::backend("connect", "connection already wired"));
        }
        self.wires.push(connection.clone());
        self.journal.push(BridgeOp::Connect {
            connection: connection.clone(),
        });
        Ok(())
    }

    fn disconnect(&mut self, connection: &Connection) -> Result<()> {
        let index = self
            .wires
            .iter()
            .position(|w| w == connection)
            .ok_or_else(|| GraphError::backend("disconnect", "connection is not wired"))?;
        self.wires.remove(index);
        self.journal.push(BridgeOp::Disconnect {
            connection: connection.clone(),
        });
        Ok(())
    }
}
