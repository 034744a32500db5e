//! Load and analysis entry points shared by the CLI and library users.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analysis::{consolidate_groups, ConsolidatedGroup, GroupOrder, NetGroup};
use crate::design::{Design, DesignError, DeviceId, NodeId, SquareMatrix};
use crate::report::{write_net_group_report, VisualizationData};

#[derive(Debug, thiserror::Error)]
pub enum FpgaViewError {
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths of the four design files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignFiles {
    pub info: PathBuf,
    pub placement: PathBuf,
    pub nets: PathBuf,
    pub topology: PathBuf,
}

impl DesignFiles {
    pub const INFO: &'static str = "design.info";
    pub const PLACEMENT: &'static str = "design.fpga.out";
    pub const NETS: &'static str = "design.net";
    pub const TOPOLOGY: &'static str = "design.topo";

    /// The conventional file names inside a benchmark directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            info: dir.join(Self::INFO),
            placement: dir.join(Self::PLACEMENT),
            nets: dir.join(Self::NETS),
            topology: dir.join(Self::TOPOLOGY),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub group_order: GroupOrder,
}

/// Derived views of a loaded design.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Symmetric, each crossing counted in both directions.
    pub demand: SquareMatrix,
    pub groups: Vec<NetGroup>,
    pub order: GroupOrder,
}

impl Analysis {
    pub fn consolidated(&self) -> Vec<ConsolidatedGroup> {
        consolidate_groups(&self.groups, self.order)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceSummary {
    pub id: DeviceId,
    pub max_io: u32,
    pub node_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetSummary {
    pub id: u32,
    pub source: NodeId,
    pub sink_count: usize,
}

/// Counts for a quick sanity check of a load.
#[derive(Debug, Clone, Serialize)]
pub struct DesignStats {
    pub device_count: usize,
    /// Devices with an info record; placeholder slots are left out.
    pub devices: Vec<DeviceSummary>,
    pub node_count: usize,
    /// First few nodes by id with their device.
    pub sample_nodes: Vec<(NodeId, DeviceId)>,
    pub net_count: usize,
    pub first_net: Option<NetSummary>,
    pub topology: SquareMatrix,
}

const SAMPLE_NODES: usize = 5;

impl DesignStats {
    pub fn from_design(design: &Design) -> Self {
        let devices = design
            .devices()
            .iter()
            .filter_map(|device| {
                device.id.map(|id| DeviceSummary {
                    id,
                    max_io: device.max_io,
                    node_count: device.nodes.len(),
                })
            })
            .collect();

        let mut placed: Vec<(NodeId, DeviceId)> = design
            .nodes()
            .values()
            .filter_map(|node| node.device.map(|device| (node.id, device)))
            .collect();
        placed.sort_unstable();
        placed.truncate(SAMPLE_NODES);

        Self {
            device_count: design.device_count(),
            devices,
            node_count: design.nodes().len(),
            sample_nodes: placed,
            net_count: design.nets().len(),
            first_net: design.nets().first().map(|net| NetSummary {
                id: net.id,
                source: net.source,
                sink_count: net.sinks.len(),
            }),
            topology: design.topology().clone(),
        }
    }
}

/// Files written by [`FpgaViewCore::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub load_time: Duration,
    pub visualization: PathBuf,
    pub net_groups: PathBuf,
    pub group_count: usize,
}

pub struct FpgaViewCore;

impl FpgaViewCore {
    pub const VISUALIZATION_FILE: &'static str = "visualization_data.json";
    pub const NET_GROUPS_FILE: &'static str = "net_groups.txt";

    /// Load the four design files in dependency order.
    pub fn load(files: &DesignFiles) -> Result<Design, FpgaViewError> {
        let start = Instant::now();
        let mut design = Design::new();

        tracing::info!("Loading {}", files.info.display());
        design.load_info(&files.info)?;
        tracing::info!("Loading {}", files.placement.display());
        design.load_placement(&files.placement)?;
        tracing::info!("Loading {}", files.nets.display());
        design.load_nets(&files.nets)?;
        tracing::info!("Loading {}", files.topology.display());
        design.load_topology(&files.topology)?;

        tracing::info!(
            devices = design.device_count(),
            nodes = design.nodes().len(),
            nets = design.nets().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "design loaded"
        );
        Ok(design)
    }

    pub fn analyze(design: &Design, options: &AnalysisOptions) -> Analysis {
        Analysis {
            demand: design.demand_matrix(),
            groups: design.group_nets(options.group_order),
            order: options.group_order,
        }
    }

    /// Write the visualization JSON to `path`.
    pub fn write_visualization(design: &Design, path: &Path) -> Result<(), FpgaViewError> {
        let data = VisualizationData::from_design(design)?;
        let mut writer = BufWriter::new(File::create(path)?);
        data.write_json(&mut writer)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the net-group text report to `path`.
    pub fn write_net_groups(groups: &[NetGroup], path: &Path) -> Result<(), FpgaViewError> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_net_group_report(groups, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a design and write both reports into `out_dir`.
    pub fn run(
        files: &DesignFiles,
        out_dir: &Path,
        options: &AnalysisOptions,
    ) -> Result<RunSummary, FpgaViewError> {
        let start = Instant::now();
        let design = Self::load(files)?;
        let load_time = start.elapsed();

        std::fs::create_dir_all(out_dir)?;
        let visualization = out_dir.join(Self::VISUALIZATION_FILE);
        Self::write_visualization(&design, &visualization)?;

        let groups = design.group_nets(options.group_order);
        let net_groups = out_dir.join(Self::NET_GROUPS_FILE);
        Self::write_net_groups(&groups, &net_groups)?;
        tracing::info!("Net groups written to {}", net_groups.display());

        Ok(RunSummary {
            load_time,
            visualization,
            net_groups,
            group_count: groups.len(),
        })
    }
}
