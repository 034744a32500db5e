//! Design graph
//!
//! [`Design`] owns the three entity collections (devices, nodes, nets) and the
//! physical topology matrix. It is filled by four loaders which must run in
//! order: info, placement, nets, topology.

pub mod loader;
pub mod schema;

use std::collections::HashMap;
use std::fmt;

use crate::parser::ScanError;
pub use schema::*;

#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("load the {requires} file before the {stage} file")]
    LoadOrder { stage: LoadStage, requires: LoadStage },
    #[error("net {net} references node {node}, which is not placed on any device")]
    UnresolvedNode { node: NodeId, net: u32 },
    #[error("design is incomplete: {0}")]
    Incomplete(&'static str),
}

/// One of the four design files, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Info,
    Placement,
    Nets,
    Topology,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Info => ".info",
            LoadStage::Placement => ".fpga.out",
            LoadStage::Nets => ".net",
            LoadStage::Topology => ".topo",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Design {
    devices: Vec<Device>,
    nodes: HashMap<NodeId, Node>,
    nets: Vec<Net>,
    topology: SquareMatrix,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devices indexed by `id - 1`. Gaps hold placeholder devices.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.index())
    }

    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Device slot a node is placed on.
    pub fn device_of(&self, id: NodeId) -> Option<DeviceId> {
        self.nodes.get(&id).and_then(|node| node.device)
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn topology(&self) -> &SquareMatrix {
        &self.topology
    }

    fn contains_device(&self, id: u32) -> bool {
        id > 0 && id as usize <= self.devices.len()
    }
}
