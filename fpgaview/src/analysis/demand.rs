//! Inter-device logical communication demand

use crate::design::{Design, SquareMatrix};

impl Design {
    /// Count net endpoint crossings between every pair of devices.
    ///
    /// Each source-to-sink crossing increments both `[src][dst]` and
    /// `[dst][src]`, so the result is symmetric and every undirected
    /// interaction is counted twice. Halve the entries when reporting demand
    /// per device pair.
    pub fn demand_matrix(&self) -> SquareMatrix {
        let mut demand = SquareMatrix::new(self.device_count());

        for net in self.nets() {
            let Some(src) = self.device_of(net.source) else {
                continue;
            };
            for sink in &net.sinks {
                let Some(dst) = self.device_of(*sink) else {
                    continue;
                };
                if src != dst {
                    demand.increment(src.index(), dst.index());
                    demand.increment(dst.index(), src.index());
                }
            }
        }

        demand
    }
}
