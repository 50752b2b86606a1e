//! Arena-backed undirected graph of geolocated events

use crate::error::{GraphError, GraphResult};
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque node identifier, unique within one graph
pub type NodeId = u64;

/// A geolocated event, or an aggregate of several events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub latitude: f64,
    pub longitude: f64,

    /// Fire radiative power, summed when nodes aggregate
    pub intensity: f64,

    /// Original ids this node aggregates (empty for un-merged nodes)
    pub provenance: Vec<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, latitude: f64, longitude: f64, intensity: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            intensity,
            provenance: Vec::new(),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Ids of the original events behind this node
    pub fn origin_ids(&self) -> Vec<NodeId> {
        if self.provenance.is_empty() {
            vec![self.id]
        } else {
            self.provenance.clone()
        }
    }

    fn validate(&self) -> GraphResult<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(GraphError::InvalidArgument(format!(
                "node {} has a non-finite position ({}, {})",
                self.id, self.latitude, self.longitude
            )));
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(GraphError::InvalidArgument(format!(
                "node {} has invalid intensity {}",
                self.id, self.intensity
            )));
        }
        Ok(())
    }
}

/// An undirected weighted edge, weight in kilometers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub weight: f64,
}

/// Undirected graph stored as a node arena plus adjacency lists.
///
/// Nodes live in a dense vector; adjacency entries refer to positions in
/// that vector, never to other heap objects.
#[derive(Debug, Clone, Default)]
pub struct ProximityGraph {
    /// Node attributes, indexed by position
    nodes: Vec<Node>,

    /// adjacency[i] holds (neighbor position, weight) pairs for node i
    adjacency: Vec<Vec<(u32, f64)>>,

    /// Mapping from node ids to positions
    index: HashMap<NodeId, u32>,

    edge_count: usize,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `node_count` nodes
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            adjacency: Vec::with_capacity(node_count),
            index: HashMap::with_capacity(node_count),
            edge_count: 0,
        }
    }

    /// Insert a node, returning its position
    pub fn add_node(&mut self, node: Node) -> GraphResult<usize> {
        node.validate()?;
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }

        let pos = self.nodes.len();
        self.index.insert(node.id, pos as u32);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());

        Ok(pos)
    }

    /// Insert an undirected edge between two existing nodes.
    ///
    /// If the pair is already connected the smaller weight is kept.
    /// Returns true when a new edge was created.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) -> GraphResult<bool> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        let pu = self.index_of(u).ok_or(GraphError::UnknownNode(u))?;
        let pv = self.index_of(v).ok_or(GraphError::UnknownNode(v))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidArgument(format!(
                "edge ({}, {}) has invalid weight {}",
                u, v, weight
            )));
        }

        Ok(self.connect_positions(pu, pv, weight))
    }

    /// Edge insertion by position; callers guarantee pu != pv and both in range
    pub(crate) fn connect_positions(&mut self, pu: usize, pv: usize, weight: f64) -> bool {
        debug_assert_ne!(pu, pv);

        if let Some(entry) = self.adjacency[pu].iter_mut().find(|(n, _)| *n as usize == pv) {
            if weight < entry.1 {
                entry.1 = weight;
                if let Some(back) = self.adjacency[pv].iter_mut().find(|(n, _)| *n as usize == pu) {
                    back.1 = weight;
                }
            }
            return false;
        }

        self.adjacency[pu].push((pv as u32, weight));
        self.adjacency[pv].push((pu as u32, weight));
        self.edge_count += 1;
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|pos| &self.nodes[pos])
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).map(|&pos| pos as usize)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Every edge exactly once, the endpoint inserted first reported as `u`
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(pu, list)| {
            list.iter()
                .filter(move |(pv, _)| pu < *pv as usize)
                .map(move |&(pv, weight)| Edge {
                    u: self.nodes[pu].id,
                    v: self.nodes[pv as usize].id,
                    weight,
                })
        })
    }

    pub fn degree(&self, id: NodeId) -> Option<usize> {
        self.index_of(id).map(|pos| self.adjacency[pos].len())
    }

    /// Neighbor ids of a node, `None` if the node is unknown
    pub fn neighbors(&self, id: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        let pos = self.index_of(id)?;
        Some(
            self.adjacency[pos]
                .iter()
                .map(move |&(n, _)| self.nodes[n as usize].id),
        )
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_weight(u, v).is_some()
    }

    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        let pu = self.index_of(u)?;
        let pv = self.index_of(v)? as u32;
        self.adjacency[pu]
            .iter()
            .find(|(n, _)| *n == pv)
            .map(|&(_, w)| w)
    }

    /// Maximal connected components as sets of node ids
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let compressed = crate::graph::CompressedGraph::from_proximity(self);
        crate::graph::algorithms::connected_components(&compressed)
            .into_iter()
            .map(|members| members.into_iter().map(|pos| self.nodes[pos].id).collect())
            .collect()
    }

    /// Sum of intensity over all nodes
    pub fn total_intensity(&self) -> f64 {
        self.nodes.iter().map(|n| n.intensity).sum()
    }

    pub(crate) fn adjacency_at(&self, pos: usize) -> &[(u32, f64)] {
        &self.adjacency[pos]
    }

    pub(crate) fn positions(&self) -> Vec<GeoPoint> {
        self.nodes.iter().map(Node::position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ProximityGraph {
        let mut graph = ProximityGraph::new();
        graph.add_node(Node::new(10, 0.0, 0.0, 1.0)).unwrap();
        graph.add_node(Node::new(20, 0.0, 0.1, 2.0)).unwrap();
        graph.add_node(Node::new(30, 0.1, 0.0, 3.0)).unwrap();
        graph.add_edge(10, 20, 5.0).unwrap();
        graph.add_edge(20, 30, 7.0).unwrap();
        graph
    }

    #[test]
    fn degree_and_neighbors() {
        let graph = triangle();
        assert_eq!(graph.degree(20), Some(2));
        assert_eq!(graph.degree(30), Some(1));
        assert_eq!(graph.degree(99), None);

        let mut around: Vec<NodeId> = graph.neighbors(20).unwrap().collect();
        around.sort_unstable();
        assert_eq!(around, vec![10, 30]);
        assert!(graph.neighbors(99).is_none());
    }

    #[test]
    fn edges_are_reported_once() {
        let graph = triangle();
        let edges: Vec<Edge> = graph.edges().collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(30, 20));
    }

    #[test]
    fn parallel_edge_keeps_minimum_weight() {
        let mut graph = triangle();
        assert!(!graph.add_edge(20, 10, 3.0).unwrap());
        assert!(!graph.add_edge(10, 20, 9.0).unwrap());
        assert_eq!(graph.edge_weight(10, 20), Some(3.0));
        assert_eq!(graph.edge_weight(20, 10), Some(3.0));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn rejects_invalid_mutations() {
        let mut graph = triangle();
        assert!(matches!(graph.add_edge(10, 10, 1.0), Err(GraphError::SelfLoop(10))));
        assert!(matches!(graph.add_edge(10, 99, 1.0), Err(GraphError::UnknownNode(99))));
        assert!(matches!(
            graph.add_node(Node::new(10, 0.0, 0.0, 1.0)),
            Err(GraphError::DuplicateNode(10))
        ));
        assert!(matches!(
            graph.add_node(Node::new(40, f64::NAN, 0.0, 1.0)),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            graph.add_node(Node::new(41, 0.0, 0.0, -1.0)),
            Err(GraphError::InvalidArgument(_))
        ));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn components_and_intensity() {
        let mut graph = triangle();
        graph.add_node(Node::new(40, 5.0, 5.0, 4.0)).unwrap();

        let mut components = graph.connected_components();
        components.iter_mut().for_each(|c| c.sort_unstable());
        components.sort();
        assert_eq!(components, vec![vec![10, 20, 30], vec![40]]);
        assert_eq!(graph.total_intensity(), 10.0);
    }
}
