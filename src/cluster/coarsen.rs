//! Collapse connected components into the next resolution level

use crate::cluster::aggregate_nodes;
use crate::error::GraphResult;
use crate::graph::algorithms::connected_components;
use crate::graph::{CompressedGraph, NodeId, ProximityGraph};

/// Replace every connected component by one aggregate node.
///
/// Aggregates get ids `0..k` in order of each component's first node. The
/// result carries no edges; the next level's edges come from a fresh
/// distance pass.
pub fn coarsen_components(graph: &ProximityGraph) -> GraphResult<ProximityGraph> {
    let compressed = CompressedGraph::from_proximity(graph);
    let components = connected_components(&compressed);

    log::info!(
        "Coarsening {} nodes in {} components",
        graph.node_count(),
        components.len()
    );

    let nodes = graph.nodes();
    let mut coarse = ProximityGraph::with_capacity(components.len());

    for (id, members) in components.iter().enumerate() {
        if let Some(node) = aggregate_nodes(id as NodeId, members.iter().map(|&m| &nodes[m])) {
            coarse.add_node(node)?;
        }
    }

    if let Some(largest) = components.iter().map(Vec::len).max() {
        log::info!("Largest component has {} nodes", largest);
    }

    Ok(coarse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use approx::assert_abs_diff_eq;

    #[test]
    fn components_become_single_nodes() {
        let mut graph = ProximityGraph::new();
        graph.add_node(Node::new(10, 0.0, 0.0, 1.0)).unwrap();
        graph.add_node(Node::new(11, 0.0, 0.2, 2.0)).unwrap();
        graph.add_node(Node::new(12, 3.0, 3.0, 4.0)).unwrap();
        graph.add_edge(10, 11, 22.0).unwrap();

        let coarse = coarsen_components(&graph).unwrap();

        assert_eq!(coarse.node_count(), 2);
        assert_eq!(coarse.edge_count(), 0);

        let first = coarse.node(0).unwrap();
        assert_abs_diff_eq!(first.longitude, 0.1);
        assert_eq!(first.intensity, 3.0);
        assert_eq!(first.provenance, vec![10, 11]);

        let isolated = coarse.node(1).unwrap();
        assert_eq!(isolated.position(), graph.node(12).unwrap().position());
        assert_eq!(isolated.provenance, vec![12]);
    }

    #[test]
    fn edge_free_graph_keeps_node_count() {
        let mut graph = ProximityGraph::new();
        for id in 0..4 {
            graph.add_node(Node::new(id, id as f64, 0.0, 1.0)).unwrap();
        }
        let coarse = coarsen_components(&graph).unwrap();
        assert_eq!(coarse.node_count(), 4);
        assert_eq!(coarse.total_intensity(), graph.total_intensity());
    }

    #[test]
    fn empty_graph() {
        assert!(coarsen_components(&ProximityGraph::new()).unwrap().is_empty());
    }
}
