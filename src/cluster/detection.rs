//! Proximity merging of near-duplicate events

use crate::cluster::aggregate_nodes;
use crate::error::{check_threshold, GraphResult};
use crate::graph::builder::scan_close_pairs;
use crate::graph::ProximityGraph;
use std::collections::BTreeMap;

/// Union-Find data structure for grouping node positions
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Point every node on the path straight at the root
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }

        root
    }

    /// Union the sets containing x and y, returning the new root
    pub fn union(&mut self, x: u32, y: u32) -> u32 {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return root_x; // Already in the same set
        }

        // Union by size: attach smaller tree under root of larger tree
        let size_x = self.size[root_x as usize];
        let size_y = self.size[root_y as usize];

        if size_x >= size_y {
            self.parent[root_y as usize] = root_x;
            self.size[root_x as usize] += size_y;
            root_x
        } else {
            self.parent[root_x as usize] = root_y;
            self.size[root_y as usize] += size_x;
            root_y
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// Partition of node positions produced by proximity clustering
#[derive(Debug, Clone, PartialEq)]
pub struct MergeGroups {
    /// representative[p] is the position of the node that survives for p
    pub representative: Vec<usize>,

    /// Clusters with two or more members, ordered by their first member
    pub clusters: Vec<Vec<usize>>,
}

impl MergeGroups {
    /// Number of positions absorbed into another node
    pub fn absorbed_count(&self) -> usize {
        self.clusters.iter().map(|c| c.len() - 1).sum()
    }
}

/// Single-linkage clustering of nodes closer than `threshold_km`.
///
/// Two nodes share a cluster when a chain of sub-threshold pairs connects
/// them. Each cluster is represented by its member at the lowest position.
pub fn find_merge_groups(graph: &ProximityGraph, threshold_km: f64) -> GraphResult<MergeGroups> {
    check_threshold("merge distance", threshold_km)?;

    let node_count = graph.node_count();
    let pairs = scan_close_pairs(&graph.positions(), threshold_km);
    log::debug!("Found {} close pairs below {} km", pairs.len(), threshold_km);

    let mut sets = DisjointSets::new(node_count);
    for &(i, j, _) in &pairs {
        sets.union(i as u32, j as u32);
    }

    // The first position seen for each root becomes the representative
    let mut root_to_rep: Vec<Option<usize>> = vec![None; node_count];
    let mut representative = Vec::with_capacity(node_count);
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for pos in 0..node_count {
        let root = sets.find(pos as u32) as usize;
        let rep = *root_to_rep[root].get_or_insert(pos);
        representative.push(rep);
        members.entry(rep).or_default().push(pos);
    }

    let clusters = members
        .into_values()
        .filter(|group| group.len() > 1)
        .collect();

    Ok(MergeGroups {
        representative,
        clusters,
    })
}

/// Merge nodes closer than `threshold_km` into aggregate nodes.
///
/// Each cluster keeps the id of its representative, the mean member position
/// and the summed intensity. Existing edges are re-homed onto representatives:
/// edges inside a cluster are dropped, and when several edges land on the
/// same pair of representatives the minimum weight wins.
pub fn merge_close_nodes(graph: ProximityGraph, threshold_km: f64) -> GraphResult<ProximityGraph> {
    log::info!(
        "Merging {} nodes closer than {} km",
        graph.node_count(),
        threshold_km
    );

    let groups = find_merge_groups(&graph, threshold_km)?;
    let nodes = graph.nodes();

    let mut cluster_of_rep: BTreeMap<usize, &[usize]> = BTreeMap::new();
    for cluster in &groups.clusters {
        cluster_of_rep.insert(cluster[0], cluster);
    }

    // Old representative position -> new position
    let mut new_position = vec![usize::MAX; nodes.len()];
    let mut merged = ProximityGraph::with_capacity(nodes.len() - groups.absorbed_count());

    for (pos, node) in nodes.iter().enumerate() {
        if groups.representative[pos] != pos {
            continue;
        }

        let survivor = match cluster_of_rep.get(&pos) {
            Some(cluster) => aggregate_nodes(node.id, cluster.iter().map(|&m| &nodes[m]))
                .unwrap_or_else(|| node.clone()),
            None => node.clone(),
        };

        new_position[pos] = merged.add_node(survivor)?;
    }

    // Re-home edges onto representatives, minimum weight per pair
    let mut rehomed: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for pu in 0..nodes.len() {
        for &(pv, weight) in graph.adjacency_at(pu) {
            let pv = pv as usize;
            if pu >= pv {
                continue;
            }

            let ru = groups.representative[pu];
            let rv = groups.representative[pv];
            if ru == rv {
                continue;
            }

            let key = (ru.min(rv), ru.max(rv));
            rehomed
                .entry(key)
                .and_modify(|w| *w = w.min(weight))
                .or_insert(weight);
        }
    }

    for ((ru, rv), weight) in rehomed {
        merged.connect_positions(new_position[ru], new_position[rv], weight);
    }

    log::info!(
        "Merged {} nodes into {} clusters, {} nodes remain",
        groups.absorbed_count() + groups.clusters.len(),
        groups.clusters.len(),
        merged.node_count()
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeId};

    fn graph_of(points: &[(f64, f64, f64)]) -> ProximityGraph {
        let mut graph = ProximityGraph::new();
        for (id, &(lat, lon, frp)) in points.iter().enumerate() {
            graph.add_node(Node::new(id as NodeId, lat, lon, frp)).unwrap();
        }
        graph
    }

    #[test]
    fn disjoint_sets_track_sizes() {
        let mut sets = DisjointSets::new(6);
        sets.union(0, 1);
        sets.union(2, 3);
        sets.union(1, 3);

        assert_eq!(sets.find(0), sets.find(2));
        assert_ne!(sets.find(0), sets.find(4));
        assert_eq!(sets.size(3), 4);
        assert_eq!(sets.size(5), 1);
    }

    #[test]
    fn close_pair_collapses() {
        let graph = graph_of(&[(0.0, 0.0, 2.0), (0.0, 0.005, 3.0)]);
        let merged = merge_close_nodes(graph, 1.0).unwrap();

        assert_eq!(merged.node_count(), 1);
        let node = &merged.nodes()[0];
        assert_eq!(node.id, 0);
        assert_eq!(node.latitude, 0.0);
        assert_eq!(node.longitude, 0.0025);
        assert_eq!(node.intensity, 5.0);
        assert_eq!(node.provenance, vec![0, 1]);
    }

    #[test]
    fn chains_merge_transitively() {
        // Consecutive points ~0.67 km apart, ends ~1.33 km apart
        let graph = graph_of(&[(0.0, 0.0, 1.0), (0.0, 0.006, 1.0), (0.0, 0.012, 1.0), (5.0, 5.0, 1.0)]);
        let groups = find_merge_groups(&graph, 1.0).unwrap();

        assert_eq!(groups.clusters, vec![vec![0, 1, 2]]);
        assert_eq!(groups.representative, vec![0, 0, 0, 3]);
    }

    #[test]
    fn grouping_ignores_input_order() {
        let forward = graph_of(&[(0.0, 0.0, 1.0), (0.0, 0.006, 1.0), (0.0, 0.012, 1.0)]);
        let backward = graph_of(&[(0.0, 0.012, 1.0), (0.0, 0.006, 1.0), (0.0, 0.0, 1.0)]);

        assert_eq!(find_merge_groups(&forward, 1.0).unwrap().clusters, vec![vec![0, 1, 2]]);
        assert_eq!(find_merge_groups(&backward, 1.0).unwrap().clusters, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn edges_are_rehomed_with_minimum_weight() {
        // 0 and 1 merge, 2 and 3 merge, 4 stays alone
        let mut graph = graph_of(&[
            (0.0, 0.0, 1.0),
            (0.0, 0.001, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 0.001, 1.0),
            (2.0, 0.0, 1.0),
        ]);
        graph.add_edge(0, 1, 0.1).unwrap(); // internal, dropped
        graph.add_edge(0, 2, 30.0).unwrap();
        graph.add_edge(1, 3, 20.0).unwrap();
        graph.add_edge(1, 2, 25.0).unwrap();
        graph.add_edge(3, 4, 40.0).unwrap();

        let merged = merge_close_nodes(graph, 1.0).unwrap();

        assert_eq!(merged.node_count(), 3);
        assert_eq!(merged.edge_count(), 2);
        assert_eq!(merged.edge_weight(0, 2), Some(20.0));
        assert_eq!(merged.edge_weight(2, 4), Some(40.0));
        assert!(!merged.has_edge(0, 0));
    }

    #[test]
    fn unmerged_nodes_keep_identity() {
        let graph = graph_of(&[(0.0, 0.0, 1.0), (1.0, 1.0, 2.0)]);
        let merged = merge_close_nodes(graph.clone(), 1.0).unwrap();
        assert_eq!(merged.nodes(), graph.nodes());
    }

    #[test]
    fn empty_graph_merges_to_empty() {
        let merged = merge_close_nodes(ProximityGraph::new(), 1.0).unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn rejects_non_positive_threshold() {
        assert!(merge_close_nodes(graph_of(&[(0.0, 0.0, 1.0)]), 0.0).is_err());
    }
}
