//! JSON data for the device-graph visualization

use serde::Serialize;
use std::io::Write;

use crate::analysis::{DeviceGraph, Link};
use crate::design::{Design, DesignError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizationNode {
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalLink {
    pub source: u32,
    pub target: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalLink {
    pub source: u32,
    pub target: u32,
    /// Nets crossing the pair, each crossing counted once.
    pub demand: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualizationData {
    pub nodes: Vec<VisualizationNode>,
    pub physical_links: Vec<PhysicalLink>,
    pub logical_links: Vec<LogicalLink>,
}

impl VisualizationData {
    /// Requires devices, nets and topology to be loaded.
    pub fn from_design(design: &Design) -> Result<Self, DesignError> {
        if design.devices().is_empty() || design.nets().is_empty() || design.topology().is_empty()
        {
            return Err(DesignError::Incomplete(
                "visualization needs the info, net and topology files",
            ));
        }
        Ok(Self::from_graph(&DeviceGraph::build(
            design.topology(),
            &design.demand_matrix(),
        )))
    }

    pub fn from_graph(graph: &DeviceGraph) -> Self {
        let mut data = VisualizationData {
            nodes: graph
                .devices()
                .map(|id| VisualizationNode { id: id.0 })
                .collect(),
            physical_links: Vec::new(),
            logical_links: Vec::new(),
        };

        for (source, target, link) in graph.links() {
            let (source, target) = (source.0, target.0);
            match link {
                Link::Physical { channels } => data.physical_links.push(PhysicalLink {
                    source,
                    target,
                    channels,
                }),
                // A single crossing halves to zero; the pair is still listed.
                Link::Logical { demand } => data.logical_links.push(LogicalLink {
                    source,
                    target,
                    demand,
                }),
            }
        }

        data
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}
