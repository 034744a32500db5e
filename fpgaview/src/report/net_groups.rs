//! Plain text net-group reports

use std::io::{self, Write};

use crate::analysis::{ConsolidatedGroup, NetGroup};
use crate::design::DeviceId;

const UNKNOWN: &str = "unknown";

/// One line per group: `Group [n]: F1 -> F2 (1),F3 (2) -> [net1, net4]`.
pub fn write_net_group_report<W: Write>(groups: &[NetGroup], mut out: W) -> io::Result<()> {
    writeln!(out, "# Net Groups by FPGA Connection Pattern")?;
    writeln!(
        out,
        "# Format: Group [group_number]: Source_FPGA -> Sink_FPGA1(count),Sink_FPGA2(count) -> [net_id1, net_id2, ...]"
    )?;
    writeln!(out)?;

    for (i, group) in groups.iter().enumerate() {
        let sinks = if group.signature.sinks.is_empty() {
            UNKNOWN.to_string()
        } else {
            group
                .signature
                .sinks
                .iter()
                .map(|fanout| format!("{} ({})", fanout.device, fanout.count))
                .collect::<Vec<_>>()
                .join(",")
        };
        writeln!(
            out,
            "Group [{}]: {} -> {} -> [{}]",
            i + 1,
            group.signature.source,
            sinks,
            net_list(&group.nets)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "# Statistics:")?;
    writeln!(out, "# Total net groups: {}", groups.len())?;
    writeln!(
        out,
        "# Total nets: {}",
        groups.iter().map(|g| g.nets.len()).sum::<usize>()
    )?;
    Ok(())
}

/// One line per consolidated group: `Consolidated_Group [n]: F1 -> F2,F3 -> [net1, net3]`.
pub fn write_consolidated_report<W: Write>(
    groups: &[ConsolidatedGroup],
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "# Consolidated Net Groups by FPGA Connection Pattern")?;
    writeln!(
        out,
        "# Format: Consolidated_Group: Source_FPGA -> Sink_FPGA1,Sink_FPGA2 -> [net_id1, net_id2, ...]"
    )?;
    writeln!(out)?;

    for (i, group) in groups.iter().enumerate() {
        let sinks = if group.sink_devices.is_empty() {
            UNKNOWN.to_string()
        } else {
            device_list(&group.sink_devices)
        };
        writeln!(
            out,
            "Consolidated_Group [{}]: {} -> {} -> [{}]",
            i + 1,
            group.source,
            sinks,
            net_list(&group.nets)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "# Statistics:")?;
    writeln!(
        out,
        "# Original groups: {}",
        groups.iter().map(|g| g.merged_groups).sum::<usize>()
    )?;
    writeln!(out, "# Consolidated groups: {}", groups.len())?;
    writeln!(
        out,
        "# Total nets: {}",
        groups.iter().map(|g| g.nets.len()).sum::<usize>()
    )?;
    Ok(())
}

fn net_list(nets: &[u32]) -> String {
    nets.iter()
        .map(|id| format!("net{}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn device_list(devices: &[DeviceId]) -> String {
    devices
        .iter()
        .map(DeviceId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
