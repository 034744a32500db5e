//! FpgaView - multi-FPGA design loader and communication analysis
//!
//! This library reads the four text files describing a multi-FPGA design
//! (device limits, node placement, netlist, device interconnect) into a
//! [`Design`] and derives two views from it: the inter-device demand matrix
//! and the grouping of nets by device fan-out signature.
//!
//! # Quick Start
//!
//! ```no_run
//! use fpgaview::{AnalysisOptions, DesignFiles, FpgaViewCore};
//! use std::path::Path;
//!
//! let files = DesignFiles::from_dir(Path::new("benchmarks/case03"));
//! let design = FpgaViewCore::load(&files).unwrap();
//! let analysis = FpgaViewCore::analyze(&design, &AnalysisOptions::default());
//!
//! for group in &analysis.groups {
//!     println!("{} -> {:?}", group.signature.key(), group.nets);
//! }
//! ```
//!
//! # File order
//!
//! Loaders depend on each other: `.info` sizes the device list, `.fpga.out`
//! creates the nodes, `.net` references them and `.topo` needs the device
//! count. [`FpgaViewCore::load`] runs them in that order.

pub mod analysis;
pub mod core;
pub mod design;
pub mod parser;
pub mod report;

// Re-export main types
pub use crate::core::{
    Analysis, AnalysisOptions, DesignFiles, DesignStats, FpgaViewCore, FpgaViewError, RunSummary,
};
pub use analysis::{ConsolidatedGroup, GroupOrder, NetGroup, NetSignature};
pub use design::{Design, DesignError, Device, DeviceId, Net, Node, NodeId, SquareMatrix};
pub use report::VisualizationData;

/// Load a design from a benchmark directory (convenience wrapper).
pub fn load_dir(dir: &std::path::Path) -> Result<Design, FpgaViewError> {
    FpgaViewCore::load(&DesignFiles::from_dir(dir))
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Analysis, AnalysisOptions, Design, DesignFiles, DesignStats, FpgaViewCore,
        FpgaViewError, GroupOrder, NetGroup,
    };
}
