//! Writers for the derived views
//!
//! Writers take any `io::Write` so the CLI can target files or stdout.

pub mod net_groups;
pub mod visualization;

pub use net_groups::{write_consolidated_report, write_net_group_report};
pub use visualization::{LogicalLink, PhysicalLink, VisualizationData};
