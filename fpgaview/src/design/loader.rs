//! Record loops for the four design file grammars
//!
//! | File | Record |
//! |---|---|
//! | `.info` | `F<id> <max_io>` |
//! | `.fpga.out` | `F<id>: g<id> g<id> ...` |
//! | `.net` | `g<source> <weight> g<sink> g<sink> ...` |
//! | `.topo` | `F<id>: <c0>,<c1>,...,<cN-1>` |
//!
//! None of the loops look at line structure. A record ends where the next
//! token's leading byte says a new record begins.

use std::path::Path;

use super::{Design, DesignError, Device, DeviceId, LoadStage, Net, Node, NodeId, SquareMatrix};
use crate::parser::{Cursor, DEVICE_MARKER, NODE_MARKER};

impl Design {
    /// Load device resource limits. Sizes the device sequence to the largest id seen
    /// and discards anything loaded before.
    pub fn load_info(&mut self, path: &Path) -> Result<(), DesignError> {
        self.read_info(Cursor::open(path)?)
    }

    pub fn load_info_bytes(&mut self, input: impl Into<Vec<u8>>) -> Result<(), DesignError> {
        self.read_info(Cursor::new(input))
    }

    /// Load the node-to-device placement. Requires the info file.
    pub fn load_placement(&mut self, path: &Path) -> Result<(), DesignError> {
        self.require_devices(LoadStage::Placement)?;
        self.read_placement(Cursor::open(path)?)
    }

    pub fn load_placement_bytes(&mut self, input: impl Into<Vec<u8>>) -> Result<(), DesignError> {
        self.require_devices(LoadStage::Placement)?;
        self.read_placement(Cursor::new(input))
    }

    /// Load the netlist. Requires the placement file.
    pub fn load_nets(&mut self, path: &Path) -> Result<(), DesignError> {
        self.require_nodes()?;
        self.read_nets(Cursor::open(path)?)
    }

    pub fn load_nets_bytes(&mut self, input: impl Into<Vec<u8>>) -> Result<(), DesignError> {
        self.require_nodes()?;
        self.read_nets(Cursor::new(input))
    }

    /// Load the physical channel matrix. Requires the info file.
    pub fn load_topology(&mut self, path: &Path) -> Result<(), DesignError> {
        self.require_devices(LoadStage::Topology)?;
        self.read_topology(Cursor::open(path)?)
    }

    pub fn load_topology_bytes(&mut self, input: impl Into<Vec<u8>>) -> Result<(), DesignError> {
        self.require_devices(LoadStage::Topology)?;
        self.read_topology(Cursor::new(input))
    }

    fn require_devices(&self, stage: LoadStage) -> Result<(), DesignError> {
        if self.devices.is_empty() {
            return Err(DesignError::LoadOrder {
                stage,
                requires: LoadStage::Info,
            });
        }
        Ok(())
    }

    fn require_nodes(&self) -> Result<(), DesignError> {
        if self.nodes.is_empty() {
            return Err(DesignError::LoadOrder {
                stage: LoadStage::Nets,
                requires: LoadStage::Placement,
            });
        }
        Ok(())
    }

    fn read_info(&mut self, mut cursor: Cursor) -> Result<(), DesignError> {
        let mut records = Vec::new();
        let mut max_id = 0;

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }
            let start = cursor.position();
            let id = cursor.parse_prefixed_id(DEVICE_MARKER);
            let max_io = cursor.parse_unsigned();
            cursor.ensure_progress(start)?;

            if id == 0 {
                tracing::warn!(offset = start, "ignoring info record with device id 0");
                continue;
            }
            max_id = max_id.max(id);
            records.push((DeviceId(id), max_io));
        }

        // Everything downstream is indexed by the device range, so a new info
        // file starts a new design.
        *self = Design::new();
        self.devices = vec![Device::placeholder(); max_id as usize];
        for (id, max_io) in &records {
            self.devices[id.index()] = Device::new(*id, *max_io);
        }

        tracing::debug!(
            records = records.len(),
            devices = self.devices.len(),
            "loaded device info"
        );
        Ok(())
    }

    fn read_placement(&mut self, mut cursor: Cursor) -> Result<(), DesignError> {
        // Applied only once the whole file scanned cleanly.
        let mut placements: Vec<(NodeId, DeviceId)> = Vec::new();

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }
            let start = cursor.position();
            let raw_id = cursor.parse_prefixed_id(DEVICE_MARKER);
            cursor.skip_delimiter(b':');
            cursor.ensure_progress(start)?;

            let device = self.contains_device(raw_id).then_some(DeviceId(raw_id));
            if device.is_none() {
                tracing::warn!(
                    device = raw_id,
                    "placement record names a device outside the info range, discarding its nodes"
                );
            }

            // Node ids run until the next device marker or end of input.
            while let Some(next) = cursor.peek_significant() {
                if next == DEVICE_MARKER {
                    break;
                }
                cursor.skip_whitespace();
                let before = cursor.position();
                let node = NodeId(cursor.parse_prefixed_id(NODE_MARKER));
                cursor.ensure_progress(before)?;

                if let Some(device) = device {
                    placements.push((node, device));
                }
            }
        }

        let placed = placements.len();
        for (node, device) in placements {
            self.place(node, device);
        }

        tracing::debug!(placed, nodes = self.nodes.len(), "loaded placement");
        Ok(())
    }

    /// A repeated node id moves the node and is appended to the new device again.
    fn place(&mut self, id: NodeId, device: DeviceId) {
        self.nodes.entry(id).or_insert_with(|| Node::new(id)).device = Some(device);
        self.devices[device.index()].nodes.push(id);
    }

    fn read_nets(&mut self, mut cursor: Cursor) -> Result<(), DesignError> {
        let mut nets = Vec::new();

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }
            let id = nets.len() as u32 + 1;
            let start = cursor.position();
            let source = NodeId(cursor.parse_prefixed_id(NODE_MARKER));
            let weight = cursor.parse_unsigned();
            cursor.ensure_progress(start)?;
            let source = self.resolve(source, id)?;

            let mut sinks = Vec::new();
            while at_sink(&cursor) {
                let sink = NodeId(cursor.parse_prefixed_id(NODE_MARKER));
                sinks.push(self.resolve(sink, id)?);
            }

            nets.push(Net {
                id,
                source,
                sinks,
                weight,
            });
        }

        tracing::debug!(nets = nets.len(), "loaded nets");
        self.nets = nets;
        Ok(())
    }

    fn resolve(&self, node: NodeId, net: u32) -> Result<NodeId, DesignError> {
        if self.nodes.contains_key(&node) {
            Ok(node)
        } else {
            Err(DesignError::UnresolvedNode { node, net })
        }
    }

    fn read_topology(&mut self, mut cursor: Cursor) -> Result<(), DesignError> {
        let size = self.devices.len();
        let mut topology = SquareMatrix::new(size);
        let mut rows = 0usize;

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }
            let start = cursor.position();
            let raw_id = cursor.parse_prefixed_id(DEVICE_MARKER);
            cursor.skip_delimiter(b':');

            let row = self
                .contains_device(raw_id)
                .then(|| DeviceId(raw_id).index());
            if row.is_none() {
                tracing::warn!(
                    device = raw_id,
                    "topology row names a device outside the info range, discarding it"
                );
            }

            // The values are consumed even for a discarded row so the next
            // record starts at its device id.
            for col in 0..size {
                let channels = cursor.parse_unsigned();
                if col + 1 < size {
                    cursor.skip_delimiter(b',');
                }
                if let Some(row) = row {
                    topology.set(row, col, channels);
                }
            }
            cursor.ensure_progress(start)?;
            rows += usize::from(row.is_some());
        }

        tracing::debug!(rows, size, "loaded topology");
        self.topology = topology;
        Ok(())
    }
}

/// Whether the next token is a sink of the current net.
///
/// Sinks are node ids. A node id followed by a bare number is the source and
/// weight of the next record instead.
fn at_sink(cursor: &Cursor) -> bool {
    cursor.peek_significant() == Some(NODE_MARKER)
        && !cursor
            .peek_second_significant()
            .is_some_and(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScanError;

    fn placed_design(info: &str, placement: &str) -> Design {
        let mut design = Design::new();
        design.load_info_bytes(info).unwrap();
        design.load_placement_bytes(placement).unwrap();
        design
    }

    #[test]
    fn test_info_sizes_to_max_id() {
        let mut design = Design::new();
        design.load_info_bytes("F1 4\nF3 8\n").unwrap();

        assert_eq!(design.device_count(), 3);
        assert_eq!(design.devices()[0], Device::new(DeviceId(1), 4));
        assert!(design.devices()[1].is_placeholder());
        assert_eq!(design.devices()[2].max_io, 8);
    }

    #[test]
    fn test_info_ignores_zero_id() {
        let mut design = Design::new();
        design.load_info_bytes("F0 99 F2 5").unwrap();

        assert_eq!(design.device_count(), 2);
        assert!(design.devices()[0].is_placeholder());
        assert_eq!(design.devices()[1].id, Some(DeviceId(2)));
    }

    #[test]
    fn test_info_reload_starts_over() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1");
        design.load_info_bytes("F1 2").unwrap();
        assert_eq!(design.device_count(), 1);
        assert!(design.nodes().is_empty());
    }

    #[test]
    fn test_info_does_not_need_newlines() {
        let mut design = Design::new();
        design.load_info_bytes("F1 4 F2 6").unwrap();
        assert_eq!(design.devices()[1].max_io, 6);
    }

    #[test]
    fn test_placement_requires_info() {
        let mut design = Design::new();
        let err = design.load_placement_bytes("F1: g1").unwrap_err();
        assert!(matches!(
            err,
            DesignError::LoadOrder {
                stage: LoadStage::Placement,
                requires: LoadStage::Info
            }
        ));
    }

    #[test]
    fn test_placement_assigns_devices() {
        let design = placed_design("F1 4\nF2 4", "F1: g1 g2\nF2: g3\n");

        assert_eq!(design.nodes().len(), 3);
        assert_eq!(design.device_of(NodeId(1)), Some(DeviceId(1)));
        assert_eq!(design.device_of(NodeId(3)), Some(DeviceId(2)));
        assert_eq!(design.devices()[0].nodes, vec![NodeId(1), NodeId(2)]);
        assert_eq!(design.devices()[1].nodes, vec![NodeId(3)]);
    }

    #[test]
    fn test_placement_repeated_node_moves_and_appends() {
        let design = placed_design("F1 4\nF2 4", "F1: g1\nF2: g1 g1");

        assert_eq!(design.device_of(NodeId(1)), Some(DeviceId(2)));
        assert_eq!(design.devices()[0].nodes, vec![NodeId(1)]);
        assert_eq!(design.devices()[1].nodes, vec![NodeId(1), NodeId(1)]);
    }

    #[test]
    fn test_placement_discards_out_of_range_record() {
        let design = placed_design("F1 4\nF2 4", "F7: g5 g6\nF2: g3\nF0: g8");

        assert!(design.node(NodeId(5)).is_none());
        assert!(design.node(NodeId(8)).is_none());
        assert_eq!(design.device_of(NodeId(3)), Some(DeviceId(2)));
    }

    #[test]
    fn test_placement_empty_record_at_end() {
        let design = placed_design("F1 4\nF2 4", "F1: g1\nF2:");
        assert_eq!(design.nodes().len(), 1);
        assert!(design.devices()[1].nodes.is_empty());
    }

    #[test]
    fn test_placement_on_gap_slot() {
        let design = placed_design("F1 4\nF3 4", "F2: g1");
        assert_eq!(design.device_of(NodeId(1)), Some(DeviceId(2)));
        assert!(design.devices()[1].is_placeholder());
    }

    #[test]
    fn test_placement_stalls_on_garbage() {
        let mut design = Design::new();
        design.load_info_bytes("F1 4").unwrap();
        let err = design.load_placement_bytes("F1: g1 , g2").unwrap_err();
        assert!(matches!(
            err,
            DesignError::Scan(ScanError::Stalled { byte: b',', .. })
        ));
    }

    #[test]
    fn test_nets_require_placement() {
        let mut design = Design::new();
        design.load_info_bytes("F1 4").unwrap();
        let err = design.load_nets_bytes("g1 1 g2").unwrap_err();
        assert!(matches!(
            err,
            DesignError::LoadOrder {
                stage: LoadStage::Nets,
                requires: LoadStage::Placement
            }
        ));
    }

    #[test]
    fn test_nets_are_numbered_by_record() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g10 g20\nF2: g30");
        design
            .load_nets_bytes("g30 1 g10 g20\ng10 1 g30\ng20 1\n")
            .unwrap();

        let nets = design.nets();
        assert_eq!(nets.len(), 3);
        for (i, net) in nets.iter().enumerate() {
            assert_eq!(net.id, i as u32 + 1);
        }
        assert_eq!(nets[0].source, NodeId(30));
        assert_eq!(nets[0].sinks, vec![NodeId(10), NodeId(20)]);
        assert_eq!(nets[0].weight, 1);
        assert!(nets[2].sinks.is_empty());
    }

    #[test]
    fn test_nets_on_one_line() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1 g2\nF2: g3");
        design.load_nets_bytes("g1 1 g3 g2 1 g3 g1").unwrap();

        let nets = design.nets();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].sinks, vec![NodeId(3)]);
        assert_eq!(nets[1].source, NodeId(2));
        assert_eq!(nets[1].sinks, vec![NodeId(3), NodeId(1)]);
    }

    #[test]
    fn test_nets_keep_duplicate_sinks() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1\nF2: g2");
        design.load_nets_bytes("g1 1 g2 g2").unwrap();
        assert_eq!(design.nets()[0].sinks, vec![NodeId(2), NodeId(2)]);
    }

    #[test]
    fn test_nets_unresolved_sink_is_fatal() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1\nF2: g2");
        let err = design.load_nets_bytes("g1 1 g2\ng2 1 g9").unwrap_err();
        match err {
            DesignError::UnresolvedNode { node, net } => {
                assert_eq!(node, NodeId(9));
                assert_eq!(net, 2);
            }
            other => panic!("Expected unresolved node, got {:?}", other),
        }
    }

    #[test]
    fn test_nets_unresolved_source_is_fatal() {
        let mut design = placed_design("F1 4", "F1: g1");
        let err = design.load_nets_bytes("g4 1 g1").unwrap_err();
        assert!(matches!(err, DesignError::UnresolvedNode { node: NodeId(4), net: 1 }));
    }

    #[test]
    fn test_topology_rows() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1");
        design.load_topology_bytes("F1: 0,2\nF2: 2,0\n").unwrap();

        let topo = design.topology();
        assert_eq!(topo.size(), 2);
        assert_eq!(topo.get(0, 1), 2);
        assert_eq!(topo.get(1, 0), 2);
        assert_eq!(topo.get(0, 0), 0);
    }

    #[test]
    fn test_topology_requires_info() {
        let mut design = Design::new();
        let err = design.load_topology_bytes("F1: 0").unwrap_err();
        assert!(matches!(
            err,
            DesignError::LoadOrder {
                stage: LoadStage::Topology,
                requires: LoadStage::Info
            }
        ));
    }

    #[test]
    fn test_topology_out_of_range_row_keeps_sync() {
        let mut design = placed_design("F1 4\nF2 4", "F1: g1");
        design
            .load_topology_bytes("F9: 5,5\nF2: 3,0\nF1: 0,3")
            .unwrap();

        let topo = design.topology();
        assert_eq!(topo.get(1, 0), 3);
        assert_eq!(topo.get(0, 1), 3);
        assert_eq!(topo.row(0), &[0, 3]);
    }

    #[test]
    fn test_topology_missing_rows_default_to_zero() {
        let mut design = placed_design("F1 4\nF2 4\nF3 4", "F1: g1");
        design.load_topology_bytes("F2: 1,0,4").unwrap();

        let topo = design.topology();
        assert_eq!(topo.row(0), &[0, 0, 0]);
        assert_eq!(topo.row(1), &[1, 0, 4]);
        assert!(!topo.is_symmetric());
    }

    #[test]
    fn test_failed_placement_leaves_design_unplaced() {
        let mut design = Design::new();
        design.load_info_bytes("F1 4\nF2 4").unwrap();

        let err = design
            .load_placement_bytes("F1: g1 g2\nF2: g3 # g4")
            .unwrap_err();
        assert!(matches!(
            err,
            DesignError::Scan(ScanError::Stalled { offset: 17, byte: b'#' })
        ));

        assert!(design.nodes().is_empty());
        assert!(design.devices().iter().all(|d| d.nodes.is_empty()));
        assert!(matches!(
            design.load_nets_bytes("g1 1 g3"),
            Err(DesignError::LoadOrder { .. })
        ));
    }
}
