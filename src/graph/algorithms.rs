//! Graph algorithms for analysis

use crate::graph::{CompressedGraph, Node, ProximityGraph};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

/// Degree buckets 0..=100, the last one collecting everything above
pub const DEGREE_BUCKETS: usize = 101;

/// Connected components by breadth-first traversal.
///
/// Components are ordered by their smallest node index and members are
/// sorted ascending.
pub fn connected_components(graph: &CompressedGraph) -> Vec<Vec<usize>> {
    let mut visited = vec![false; graph.node_count];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..graph.node_count {
        if visited[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);
        let mut members = Vec::new();

        while let Some(node) = queue.pop_front() {
            members.push(node);
            for &next in graph.neighbors(node) {
                let next = next as usize;
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    components
}

/// Size of the largest connected component, 0 for an empty graph
pub fn largest_component_size(graph: &CompressedGraph) -> usize {
    connected_components(graph)
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
}

/// Number of nodes per degree, capped at the last bucket
pub fn degree_distribution(graph: &CompressedGraph) -> Vec<usize> {
    let mut distribution = vec![0; DEGREE_BUCKETS];
    for node in 0..graph.node_count {
        let bucket = std::cmp::min(graph.degree(node), DEGREE_BUCKETS - 1);
        distribution[bucket] += 1;
    }
    distribution
}

/// Headline statistics for one resolution level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub largest_component_size: usize,
    pub total_intensity: f64,
    pub mean_degree: f64,
    pub degree_std_dev: f64,
    pub degree_distribution: Vec<usize>,
}

/// Compute the summary of a proximity graph
pub fn summarize(graph: &ProximityGraph) -> GraphSummary {
    let compressed = CompressedGraph::from_proximity(graph);
    let components = connected_components(&compressed);

    let degrees: Vec<f64> = (0..compressed.node_count)
        .map(|node| compressed.degree(node) as f64)
        .collect();

    // statrs yields NaN on empty input (and std-dev on a single sample)
    let mean_degree = if degrees.is_empty() { 0.0 } else { degrees.iter().mean() };
    let degree_std_dev = if degrees.len() < 2 { 0.0 } else { degrees.iter().std_dev() };

    GraphSummary {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        component_count: components.len(),
        largest_component_size: components.iter().map(Vec::len).max().unwrap_or(0),
        total_intensity: graph.total_intensity(),
        mean_degree,
        degree_std_dev,
        degree_distribution: degree_distribution(&compressed),
    }
}

/// Convert into a petgraph undirected graph, node weights carrying attributes.
///
/// Node indices in the result follow the insertion order of `graph`.
pub fn to_petgraph(graph: &ProximityGraph) -> UnGraph<Node, f64> {
    let mut out = UnGraph::with_capacity(graph.node_count(), graph.edge_count());
    for node in graph.nodes() {
        out.add_node(node.clone());
    }

    for edge in graph.edges() {
        // Both endpoints come from the graph's own edge list
        if let (Some(u), Some(v)) = (graph.index_of(edge.u), graph.index_of(edge.v)) {
            out.add_edge(NodeIndex::new(u), NodeIndex::new(v), edge.weight);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn path_plus_isolated() -> ProximityGraph {
        let mut graph = ProximityGraph::new();
        for id in 0..5 {
            graph.add_node(Node::new(id, 0.0, id as f64, 1.5)).unwrap();
        }
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(1, 2, 1.0).unwrap();
        graph.add_edge(3, 4, 2.0).unwrap();
        graph
    }

    #[test]
    fn components_are_ordered() {
        let mut graph = path_plus_isolated();
        graph.add_node(Node::new(5, 9.0, 9.0, 1.0)).unwrap();
        let csr = CompressedGraph::from_proximity(&graph);

        assert_eq!(connected_components(&csr), vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        assert_eq!(largest_component_size(&csr), 3);
    }

    #[test]
    fn summary_counts() {
        let summary = summarize(&path_plus_isolated());
        assert_eq!(summary.node_count, 5);
        assert_eq!(summary.edge_count, 3);
        assert_eq!(summary.component_count, 2);
        assert_eq!(summary.largest_component_size, 3);
        assert_abs_diff_eq!(summary.total_intensity, 7.5);
        assert_abs_diff_eq!(summary.mean_degree, 1.2);
        assert_eq!(summary.degree_distribution[1], 4);
        assert_eq!(summary.degree_distribution[2], 1);
    }

    #[test]
    fn summary_of_empty_graph() {
        let summary = summarize(&ProximityGraph::new());
        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.largest_component_size, 0);
        assert_eq!(summary.mean_degree, 0.0);
        assert_eq!(summary.degree_std_dev, 0.0);
    }

    #[test]
    fn petgraph_export_agrees() {
        let graph = path_plus_isolated();
        let exported = to_petgraph(&graph);

        assert_eq!(exported.node_count(), 5);
        assert_eq!(exported.edge_count(), 3);
        assert_eq!(petgraph::algo::connected_components(&exported), 2);
        assert_eq!(exported[NodeIndex::new(3)].id, 3);
    }
}
