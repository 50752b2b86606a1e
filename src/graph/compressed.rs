//! Compressed sparse row snapshot of a proximity graph

use crate::graph::ProximityGraph;

/// Immutable CSR view of an undirected graph.
///
/// Each edge appears twice, once in each endpoint's neighbor range. Node
/// indices match positions in the source `ProximityGraph`.
#[derive(Debug, Clone)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Concatenated, sorted neighbor lists
    pub edges: Vec<u32>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count * 2),
        }
    }

    /// Snapshot the adjacency of a proximity graph
    pub fn from_proximity(graph: &ProximityGraph) -> Self {
        let node_count = graph.node_count();
        let mut compressed = Self::with_capacity(node_count, graph.edge_count());

        compressed.offsets.push(0);
        let mut offset = 0u32;
        for pos in 0..node_count {
            let list = graph.adjacency_at(pos);
            compressed.edges.extend(list.iter().map(|&(n, _)| n));
            offset += list.len() as u32;
            compressed.offsets.push(offset);
        }

        compressed.sort_adjacency_lists();
        compressed
    }

    /// Neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Sort every neighbor range so traversal order is fixed
    pub fn sort_adjacency_lists(&mut self) {
        for node in 0..self.node_count {
            let start = self.offsets[node] as usize;
            let end = self.offsets[node + 1] as usize;
            if start < end {
                self.edges[start..end].sort_unstable();
            }
        }
    }

    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn snapshot_mirrors_adjacency() {
        let mut graph = ProximityGraph::new();
        for id in 0..4 {
            graph.add_node(Node::new(id, 0.0, id as f64, 1.0)).unwrap();
        }
        graph.add_edge(0, 2, 1.0).unwrap();
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(2, 3, 1.0).unwrap();

        let csr = CompressedGraph::from_proximity(&graph);
        assert_eq!(csr.node_count, 4);
        assert_eq!(csr.edge_count(), 3);
        assert_eq!(csr.neighbors(0), &[1, 2]);
        assert_eq!(csr.degree(2), 2);
        assert_eq!(csr.neighbors(3), &[2]);
        assert!(csr.neighbors(1).iter().all(|&n| n != 3));
    }

    #[test]
    fn empty_graph_snapshot() {
        let csr = CompressedGraph::from_proximity(&ProximityGraph::new());
        assert_eq!(csr.node_count, 0);
        assert_eq!(csr.offsets, vec![0]);
        assert_eq!(csr.edge_count(), 0);
    }
}
