//! Design data model
//!
//! Cross references are handles, not pointers: a [`Node`] names its device by
//! [`DeviceId`] (an index into the device sequence) and a [`Net`] names its
//! endpoints by [`NodeId`] (a key into the node map).

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based physical FPGA identifier, `F<n>` in the design files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// Position of this device in the device sequence.
    pub fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }

    pub fn from_index(index: usize) -> Self {
        DeviceId(index as u32 + 1)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Logical gate identifier, `g<n>` in the design files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// A physical FPGA.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// `None` for placeholder slots no info record filled.
    pub id: Option<DeviceId>,
    /// Maximum external I/O channels. Advisory only.
    pub max_io: u32,
    /// Nodes placed on this device, in placement file order.
    pub nodes: Vec<NodeId>,
}

impl Device {
    pub fn new(id: DeviceId, max_io: u32) -> Self {
        Self {
            id: Some(id),
            max_io,
            nodes: Vec::new(),
        }
    }

    /// Fills a gap in the device id range.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }
}

/// A logical gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Device slot this node is placed on.
    pub device: Option<DeviceId>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self { id, device: None }
    }
}

/// A hyperedge from one source node to its sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    /// 1-based ordinal of the record in the net file.
    pub id: u32,
    pub source: NodeId,
    /// Sinks in file order. Duplicates are kept.
    pub sinks: Vec<NodeId>,
    /// Weight column of the record (always 1 in practice).
    pub weight: u32,
}

/// Dense square grid of counts indexed by zero-based device position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquareMatrix {
    size: usize,
    cells: Vec<u32>,
}

impl SquareMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.size + col] = value;
    }

    pub fn increment(&mut self, row: usize, col: usize) {
        self.cells[row * self.size + col] += 1;
    }

    pub fn row(&self, row: usize) -> &[u32] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        // chunks() rejects a zero chunk size
        self.cells.chunks(self.size.max(1))
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

impl Serialize for SquareMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.rows())
    }
}
