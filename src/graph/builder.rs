//! Graph construction module

use crate::data::records::{validate_records, EventRecord};
use crate::error::{check_threshold, GraphResult};
use crate::geo::{haversine_km, GeoPoint};
use crate::graph::{Node, NodeId, ProximityGraph};
use itertools::Itertools;
use rayon::prelude::*;

/// Node count from which pair scans run on the rayon pool
pub const PARALLEL_SCAN_THRESHOLD: usize = 1000;

/// Builder turning an ordered record table into graph nodes
pub struct GraphBuilder {
    /// Next id to hand out (ids follow input order)
    next_id: NodeId,

    graph: ProximityGraph,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: 0,
            graph: ProximityGraph::with_capacity(capacity),
        }
    }

    /// Add one record as a node, returning the id it was given
    pub fn push_record(&mut self, record: &EventRecord) -> GraphResult<NodeId> {
        record.validate()?;

        let id = self.next_id;
        self.graph
            .add_node(Node::new(id, record.latitude, record.longitude, record.frp))?;
        self.next_id += 1;

        Ok(id)
    }

    /// Build the edge-free graph
    pub fn build(self) -> ProximityGraph {
        self.graph
    }
}

/// Build an edge-free graph from records, assigning ids 0..n by input order.
///
/// The whole batch is validated before any node is created.
pub fn graph_from_records(records: &[EventRecord]) -> GraphResult<ProximityGraph> {
    validate_records(records)?;

    let mut builder = GraphBuilder::with_capacity(records.len());
    for record in records {
        builder.push_record(record)?;
    }

    let graph = builder.build();
    log::info!("Created {} nodes from input records", graph.node_count());
    Ok(graph)
}

/// All index pairs (i < j) closer than `threshold_km`, with their distance.
///
/// Pairs come back in lexicographic order whether or not the scan runs in
/// parallel.
pub(crate) fn scan_close_pairs(points: &[GeoPoint], threshold_km: f64) -> Vec<(usize, usize, f64)> {
    let n = points.len();

    if n < PARALLEL_SCAN_THRESHOLD {
        return (0..n)
            .tuple_combinations()
            .filter_map(|(i, j)| {
                let d = haversine_km(points[i], points[j]);
                (d < threshold_km).then_some((i, j, d))
            })
            .collect();
    }

    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            (i + 1..n).filter_map(move |j| {
                let d = haversine_km(points[i], points[j]);
                (d < threshold_km).then_some((i, j, d))
            })
        })
        .collect()
}

/// Connect every pair of nodes closer than `threshold_km`, weighted by distance.
///
/// Pre-existing edges are left in place. Returns the number of edges created.
pub fn add_edges_by_distance(graph: &mut ProximityGraph, threshold_km: f64) -> GraphResult<usize> {
    check_threshold("edge distance", threshold_km)?;
    log::info!(
        "Adding edges between {} nodes closer than {} km",
        graph.node_count(),
        threshold_km
    );

    let pairs = scan_close_pairs(&graph.positions(), threshold_km);

    let mut added = 0;
    for (i, j, distance) in pairs {
        if graph.connect_positions(i, j, distance) {
            added += 1;
        }
    }

    log::info!("Added {} edges", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    fn records() -> Vec<EventRecord> {
        vec![
            EventRecord::new(0.0, 0.0, 1.0),
            EventRecord::new(0.0, 0.018, 2.0), // ~2 km east
            EventRecord::new(0.018, 0.0, 3.0), // ~2 km north
            EventRecord::new(1.0, 1.0, 4.0),   // far away
        ]
    }

    #[test]
    fn ids_follow_input_order() {
        let graph = graph_from_records(&records()).unwrap();
        let ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(graph.node(2).unwrap().intensity, 3.0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn invalid_record_creates_nothing() {
        let mut rows = records();
        rows.push(EventRecord::new(f64::NAN, 0.0, 1.0));
        assert!(matches!(graph_from_records(&rows), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn edges_only_below_threshold() {
        let mut graph = graph_from_records(&records()).unwrap();
        let added = add_edges_by_distance(&mut graph, 5.0).unwrap();

        // 0-1, 0-2 and 1-2 (~2.8 km) are close, 3 is isolated
        assert_eq!(added, 3);
        assert_eq!(graph.degree(3), Some(0));
        for edge in graph.edges() {
            assert!(edge.weight < 5.0);
        }
    }

    #[test]
    fn threshold_is_strict() {
        let mut graph = graph_from_records(&records()).unwrap();
        let d = graph.node(0).unwrap().position().distance_km(&graph.node(1).unwrap().position());

        add_edges_by_distance(&mut graph, d).unwrap();
        assert!(!graph.has_edge(0, 1));
    }

    #[test]
    fn rejects_bad_threshold() {
        let mut graph = graph_from_records(&records()).unwrap();
        assert!(add_edges_by_distance(&mut graph, 0.0).is_err());
        assert!(add_edges_by_distance(&mut graph, -3.0).is_err());
        assert!(add_edges_by_distance(&mut graph, f64::NAN).is_err());
    }

    #[test]
    fn tiny_graphs_have_no_edges() {
        let mut empty = ProximityGraph::new();
        assert_eq!(add_edges_by_distance(&mut empty, 10.0).unwrap(), 0);

        let mut single = graph_from_records(&records()[..1]).unwrap();
        assert_eq!(add_edges_by_distance(&mut single, 10.0).unwrap(), 0);
    }

    #[test]
    fn parallel_scan_matches_sequential_order() {
        let points: Vec<GeoPoint> = (0..PARALLEL_SCAN_THRESHOLD + 10)
            .map(|i| GeoPoint::new((i % 40) as f64 * 0.01, (i / 40) as f64 * 0.01))
            .collect();

        let parallel = scan_close_pairs(&points, 1.5);
        let sequential: Vec<(usize, usize, f64)> = (0..points.len())
            .tuple_combinations()
            .filter_map(|(i, j)| {
                let d = haversine_km(points[i], points[j]);
                (d < 1.5).then_some((i, j, d))
            })
            .collect();

        assert_eq!(parallel, sequential);
    }
}
