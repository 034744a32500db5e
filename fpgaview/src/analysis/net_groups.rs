//! Net grouping by device fan-out signature
//!
//! Two nets share a signature when they have the same source device and
//! reach the same set of other devices with the same number of sink nodes on
//! each. Sinks on the source device are not part of the signature.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::design::{Design, DeviceId, Net};

/// Number of a net's sink nodes placed on one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SinkFanout {
    pub device: DeviceId,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NetSignature {
    pub source: DeviceId,
    /// Ascending by device id.
    pub sinks: Vec<SinkFanout>,
}

impl NetSignature {
    /// Textual key, `src:dev(count),dev(count)`.
    pub fn key(&self) -> String {
        let mut key = format!("{}:", self.source.0);
        for (i, fanout) in self.sinks.iter().enumerate() {
            if i > 0 {
                key.push(',');
            }
            let _ = write!(key, "{}({})", fanout.device.0, fanout.count);
        }
        key
    }

    pub fn sink_devices(&self) -> Vec<DeviceId> {
        self.sinks.iter().map(|fanout| fanout.device).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetGroup {
    pub signature: NetSignature,
    /// Net ids in file order.
    pub nets: Vec<u32>,
}

/// Order in which [`Design::group_nets`] returns groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// String order of [`NetSignature::key`]. `10` sorts before `2`.
    #[default]
    Lexicographic,
    /// Source device, then sink `(device, count)` pairs, compared as numbers.
    Numeric,
}

impl Design {
    /// Fan-out signature of a net, or `None` when its source is not placed.
    pub fn net_signature(&self, net: &Net) -> Option<NetSignature> {
        let source = self.device_of(net.source)?;

        let mut counts: BTreeMap<DeviceId, u32> = BTreeMap::new();
        for sink in &net.sinks {
            match self.device_of(*sink) {
                Some(device) if device != source => *counts.entry(device).or_insert(0) += 1,
                _ => {}
            }
        }

        Some(NetSignature {
            source,
            sinks: counts
                .into_iter()
                .map(|(device, count)| SinkFanout { device, count })
                .collect(),
        })
    }

    /// Partition nets by signature. Nets whose source is unplaced are left out.
    pub fn group_nets(&self, order: GroupOrder) -> Vec<NetGroup> {
        let mut by_signature: HashMap<NetSignature, Vec<u32>> = HashMap::new();
        for net in self.nets() {
            if let Some(signature) = self.net_signature(net) {
                by_signature.entry(signature).or_default().push(net.id);
            }
        }

        let mut groups: Vec<NetGroup> = by_signature
            .into_iter()
            .map(|(signature, nets)| NetGroup { signature, nets })
            .collect();

        match order {
            GroupOrder::Lexicographic => groups.sort_by_cached_key(|g| g.signature.key()),
            GroupOrder::Numeric => groups.sort_by(|a, b| a.signature.cmp(&b.signature)),
        }

        tracing::debug!(groups = groups.len(), ?order, "grouped nets by signature");
        groups
    }
}

/// Groups merged on source device and sink device set, ignoring counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedGroup {
    pub source: DeviceId,
    pub sink_devices: Vec<DeviceId>,
    /// Number of signature groups merged into this one.
    pub merged_groups: usize,
    pub nets: Vec<u32>,
}

/// Merge signature groups that differ only in per-device sink counts.
///
/// Consolidated groups keep the order in which their first member appears.
/// Sink devices are listed by name (`F10` before `F2`) under
/// [`GroupOrder::Lexicographic`] and by id under [`GroupOrder::Numeric`].
pub fn consolidate_groups(groups: &[NetGroup], order: GroupOrder) -> Vec<ConsolidatedGroup> {
    let mut consolidated: Vec<ConsolidatedGroup> = Vec::new();
    let mut index: HashMap<(DeviceId, Vec<DeviceId>), usize> = HashMap::new();

    for group in groups {
        let mut sinks = group.signature.sink_devices();
        if order == GroupOrder::Lexicographic {
            sinks.sort_by_cached_key(DeviceId::to_string);
        }
        let key = (group.signature.source, sinks);
        let slot = *index.entry(key).or_insert_with_key(|(source, sinks)| {
            consolidated.push(ConsolidatedGroup {
                source: *source,
                sink_devices: sinks.clone(),
                merged_groups: 0,
                nets: Vec::new(),
            });
            consolidated.len() - 1
        });

        let target = &mut consolidated[slot];
        target.merged_groups += 1;
        target.nets.extend_from_slice(&group.nets);
    }

    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fanout(device: u32, count: u32) -> SinkFanout {
        SinkFanout {
            device: DeviceId(device),
            count,
        }
    }

    fn design(devices: u32, placement: &str, nets: &str) -> Design {
        let info: String = (1..=devices).map(|i| format!("F{} 8\n", i)).collect();
        let mut design = Design::new();
        design.load_info_bytes(info).unwrap();
        design.load_placement_bytes(placement).unwrap();
        design.load_nets_bytes(nets).unwrap();
        design
    }

    #[test]
    fn test_signature_counts_sinks_per_device() {
        let d = design(3, "F1: g1 g2\nF2: g3 g4\nF3: g5", "g1 1 g5 g3 g2 g4");
        let signature = d.net_signature(&d.nets()[0]).unwrap();

        assert_eq!(signature.source, DeviceId(1));
        assert_eq!(signature.sinks, vec![fanout(2, 2), fanout(3, 1)]);
        assert_eq!(signature.key(), "1:2(2),3(1)");
    }

    #[test]
    fn test_local_net_has_empty_signature() {
        let d = design(2, "F1: g1 g2\nF2: g3", "g1 1 g2");
        let signature = d.net_signature(&d.nets()[0]).unwrap();
        assert!(signature.sinks.is_empty());
        assert_eq!(signature.key(), "1:");
    }

    #[test]
    fn test_groups_partition_nets() {
        let d = design(
            2,
            "F1: g1 g2\nF2: g3 g4",
            "g1 1 g3\ng2 1 g4\ng3 1 g1\ng1 1 g2\ng2 1 g3 g4",
        );
        let groups = d.group_nets(GroupOrder::Lexicographic);

        let mut ids: Vec<u32> = groups.iter().flat_map(|g| g.nets.clone()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let keys: Vec<String> = groups.iter().map(|g| g.signature.key()).collect();
        assert_eq!(keys, vec!["1:", "1:2(1)", "1:2(2)", "2:1(1)"]);
        assert_eq!(groups[1].nets, vec![1, 2]);
    }

    #[test]
    fn test_lexicographic_order_misplaces_wide_ids() {
        let placement: String = (1..=10).map(|i| format!("F{}: g{}\n", i, i)).collect();
        let d = design(10, &placement, "g1 1 g10\ng1 1 g2");

        let lexicographic = d.group_nets(GroupOrder::Lexicographic);
        assert_eq!(lexicographic[0].signature.key(), "1:10(1)");

        let numeric = d.group_nets(GroupOrder::Numeric);
        assert_eq!(numeric[0].signature.key(), "1:2(1)");
        assert_eq!(numeric[1].signature.key(), "1:10(1)");
    }

    #[test]
    fn test_consolidate_ignores_counts() {
        let groups = vec![
            NetGroup {
                signature: NetSignature {
                    source: DeviceId(1),
                    sinks: vec![fanout(2, 1), fanout(3, 1)],
                },
                nets: vec![1, 4],
            },
            NetGroup {
                signature: NetSignature {
                    source: DeviceId(2),
                    sinks: vec![],
                },
                nets: vec![2],
            },
            NetGroup {
                signature: NetSignature {
                    source: DeviceId(1),
                    sinks: vec![fanout(2, 3), fanout(3, 1)],
                },
                nets: vec![3],
            },
        ];

        let consolidated = consolidate_groups(&groups, GroupOrder::Lexicographic);
        assert_eq!(consolidated.len(), 2);
        assert_eq!(consolidated[0].source, DeviceId(1));
        assert_eq!(consolidated[0].sink_devices, vec![DeviceId(2), DeviceId(3)]);
        assert_eq!(consolidated[0].merged_groups, 2);
        assert_eq!(consolidated[0].nets, vec![1, 4, 3]);
        assert_eq!(consolidated[1].nets, vec![2]);
    }

    #[test]
    fn test_consolidated_sink_devices_follow_order() {
        let groups = vec![NetGroup {
            signature: NetSignature {
                source: DeviceId(1),
                sinks: vec![fanout(2, 1), fanout(10, 1)],
            },
            nets: vec![1],
        }];

        let by_name = consolidate_groups(&groups, GroupOrder::Lexicographic);
        assert_eq!(by_name[0].sink_devices, vec![DeviceId(10), DeviceId(2)]);

        let by_id = consolidate_groups(&groups, GroupOrder::Numeric);
        assert_eq!(by_id[0].sink_devices, vec![DeviceId(2), DeviceId(10)]);
    }
}
