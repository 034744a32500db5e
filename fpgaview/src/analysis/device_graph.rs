//! Device-level connectivity graph
//!
//! One graph node per device slot and one undirected edge per device pair
//! that shares physical channels or logical demand. Physical and logical
//! links are separate parallel edges.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::design::{DeviceId, SquareMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Channel count from the topology matrix.
    Physical { channels: u32 },
    /// Nets crossing between the pair, counted once per crossing.
    Logical { demand: u32 },
}

#[derive(Debug, Clone)]
pub struct DeviceGraph {
    graph: UnGraph<DeviceId, Link>,
}

impl DeviceGraph {
    /// Build from the topology matrix and a symmetric demand matrix.
    ///
    /// Only the upper triangle of each matrix is read. Demand entries are
    /// halved to undo the two-way counting of
    /// [`Design::demand_matrix`](crate::design::Design::demand_matrix).
    pub fn build(topology: &SquareMatrix, demand: &SquareMatrix) -> Self {
        let size = topology.size().max(demand.size());
        let mut graph = UnGraph::with_capacity(size, 0);
        for i in 0..size {
            graph.add_node(DeviceId::from_index(i));
        }

        for i in 0..topology.size() {
            for j in i + 1..topology.size() {
                let channels = topology.get(i, j);
                if channels > 0 {
                    graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), Link::Physical { channels });
                }
            }
        }

        for i in 0..demand.size() {
            for j in i + 1..demand.size() {
                let crossings = demand.get(i, j);
                if crossings > 0 {
                    graph.add_edge(
                        NodeIndex::new(i),
                        NodeIndex::new(j),
                        Link::Logical {
                            demand: crossings / 2,
                        },
                    );
                }
            }
        }

        Self { graph }
    }

    pub fn device_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.graph.node_indices().map(move |index| self.graph[index])
    }

    /// All links as `(lower id, higher id, link)`, physical links first, each
    /// kind in row-major order.
    pub fn links(&self) -> impl Iterator<Item = (DeviceId, DeviceId, Link)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.graph[edge.source()],
                self.graph[edge.target()],
                *edge.weight(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u32]]) -> SquareMatrix {
        let mut m = SquareMatrix::new(rows.len());
        for (i, row) in rows.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                m.set(i, j, *value);
            }
        }
        m
    }

    #[test]
    fn test_links_from_upper_triangle() {
        let topology = matrix(&[&[0, 2, 0], &[2, 0, 1], &[0, 1, 0]]);
        let demand = matrix(&[&[0, 0, 4], &[0, 0, 0], &[4, 0, 0]]);
        let graph = DeviceGraph::build(&topology, &demand);

        assert_eq!(graph.device_count(), 3);
        let links: Vec<_> = graph.links().collect();
        assert_eq!(
            links,
            vec![
                (DeviceId(1), DeviceId(2), Link::Physical { channels: 2 }),
                (DeviceId(2), DeviceId(3), Link::Physical { channels: 1 }),
                (DeviceId(1), DeviceId(3), Link::Logical { demand: 2 }),
            ]
        );
    }
}
