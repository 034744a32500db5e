//! Derived views over a loaded [`Design`](crate::design::Design)
//!
//! All analyses are read-only traversals and are recomputed on every call.

pub mod demand;
pub mod device_graph;
pub mod net_groups;

pub use device_graph::{DeviceGraph, Link};
pub use net_groups::{
    consolidate_groups, ConsolidatedGroup, GroupOrder, NetGroup, NetSignature, SinkFanout,
};
