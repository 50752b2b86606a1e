//! Component statistics and metrics

use crate::cluster::ComponentSummary;
use crate::geo::{mean_position, GeoPoint};
use crate::graph::algorithms::connected_components;
use crate::graph::{CompressedGraph, Node, ProximityGraph};

/// Calculate density (actual edges / potential edges) of an undirected member set
pub fn calculate_density(graph: &CompressedGraph, members: &[usize]) -> f32 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    let potential_edges = n * (n - 1) / 2;

    let member_set: std::collections::HashSet<u32> =
        members.iter().map(|&m| m as u32).collect();

    // Each undirected edge is seen from both endpoints
    let mut endpoint_hits = 0;
    for &node in members {
        for dst in graph.neighbors(node) {
            if member_set.contains(dst) {
                endpoint_hits += 1;
            }
        }
    }

    (endpoint_hits / 2) as f32 / potential_edges as f32
}

/// Summaries of all connected components, largest first
pub fn component_summaries(graph: &ProximityGraph) -> Vec<ComponentSummary> {
    let compressed = CompressedGraph::from_proximity(graph);
    let nodes = graph.nodes();

    let mut summaries: Vec<ComponentSummary> = connected_components(&compressed)
        .into_iter()
        .map(|members| {
            let density = calculate_density(&compressed, &members);
            let centroid = mean_position(members.iter().map(|&m| nodes[m].position()))
                .unwrap_or(GeoPoint::new(0.0, 0.0));

            ComponentSummary {
                rank: 0,
                size: members.len(),
                total_intensity: members.iter().map(|&m| nodes[m].intensity).sum(),
                density,
                centroid,
                members: members.iter().map(|&m| nodes[m].id).collect(),
            }
        })
        .collect();

    // Stable sort keeps traversal order among equal sizes
    summaries.sort_by(|a, b| b.size.cmp(&a.size));
    for (rank, summary) in summaries.iter_mut().enumerate() {
        summary.rank = rank as u32;
    }

    summaries
}

/// Node with the highest intensity, first one on ties
pub fn hottest_node(graph: &ProximityGraph) -> Option<&Node> {
    graph
        .nodes()
        .iter()
        .reduce(|best, n| if n.intensity > best.intensity { n } else { best })
}
