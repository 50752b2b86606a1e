//! Network robustness under sequential node removal

pub mod centrality;

use crate::cluster::detection::DisjointSets;
use crate::error::{GraphError, GraphResult};
use crate::graph::{CompressedGraph, NodeId, ProximityGraph};
use centrality::{Betweenness, CentralityMeasure};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative difference below which two centrality scores tie
const SCORE_TOLERANCE: f64 = 1e-9;

/// Order in which nodes are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalStrategy {
    /// Decreasing betweenness centrality, computed once on the initial graph
    Targeted,

    /// Uniform shuffle driven by an explicit seed
    Random { seed: u64 },
}

impl RemovalStrategy {
    /// Parse a strategy name; `random` requires a seed
    pub fn parse(name: &str, seed: Option<u64>) -> GraphResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "targeted" => Ok(RemovalStrategy::Targeted),
            "random" => match seed {
                Some(seed) => Ok(RemovalStrategy::Random { seed }),
                None => Err(GraphError::InvalidArgument(
                    "random removal requires an explicit seed".to_string(),
                )),
            },
            other => Err(GraphError::InvalidArgument(format!(
                "unknown removal strategy '{}', expected 'targeted' or 'random'",
                other
            ))),
        }
    }
}

impl fmt::Display for RemovalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalStrategy::Targeted => write!(f, "targeted"),
            RemovalStrategy::Random { seed } => write!(f, "random(seed={})", seed),
        }
    }
}

/// Outcome of one removal experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub strategy: String,

    /// Largest component size before any removal
    pub initial_largest_component: usize,

    /// Node ids in removal order
    pub removal_order: Vec<NodeId>,

    /// largest_component[k] is the LCC size after removing k + 1 nodes
    pub largest_component: Vec<usize>,
}

impl RobustnessReport {
    /// Mean LCC fraction over the removal sequence, 0 for an empty graph
    pub fn robustness_index(&self) -> f64 {
        let n = self.largest_component.len();
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.largest_component.iter().sum();
        total as f64 / (n * n) as f64
    }
}

/// Remove nodes one at a time and record the largest remaining component.
///
/// The caller's graph is only read; all work happens on a snapshot.
pub fn robustness_curve(
    graph: &ProximityGraph,
    strategy: RemovalStrategy,
) -> GraphResult<RobustnessReport> {
    let compressed = CompressedGraph::from_proximity(graph);

    let order = match strategy {
        RemovalStrategy::Targeted => ranked_order(&compressed, &Betweenness),
        RemovalStrategy::Random { seed } => shuffled_order(compressed.node_count, seed),
    };

    Ok(build_report(graph, &compressed, strategy.to_string(), order))
}

/// Targeted removal ranked by an arbitrary centrality measure
pub fn robustness_curve_with(
    graph: &ProximityGraph,
    measure: &dyn CentralityMeasure,
) -> RobustnessReport {
    let compressed = CompressedGraph::from_proximity(graph);
    let order = ranked_order(&compressed, measure);
    build_report(graph, &compressed, format!("targeted({})", measure.name()), order)
}

/// Parse the strategy and run the experiment; bad names fail before any work
pub fn analyze_robustness(
    graph: &ProximityGraph,
    strategy: &str,
    seed: Option<u64>,
) -> GraphResult<RobustnessReport> {
    let strategy = RemovalStrategy::parse(strategy, seed)?;
    robustness_curve(graph, strategy)
}

/// Node indices by decreasing score, ties in index order
fn ranked_order(graph: &CompressedGraph, measure: &dyn CentralityMeasure) -> Vec<usize> {
    log::info!(
        "Ranking {} nodes by {} centrality",
        graph.node_count,
        measure.name()
    );
    let scores = measure.scores(graph);
    let tier = score_tiers(&scores);

    let mut order: Vec<usize> = (0..graph.node_count).collect();
    order.sort_by_key(|&node| tier[node]);
    order
}

/// Rank of each score among distinct values, highest first.
///
/// Scores within a relative tolerance of their predecessor share a tier, so
/// structurally equal nodes tie even when summation order left them a few
/// ulps apart.
fn score_tiers(scores: &[f64]) -> Vec<usize> {
    let mut by_score: Vec<usize> = (0..scores.len()).collect();
    by_score.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut tier = vec![0usize; scores.len()];
    let mut current = 0;
    for pair in by_score.windows(2) {
        let (prev, next) = (scores[pair[0]], scores[pair[1]]);
        if (prev - next).abs() > SCORE_TOLERANCE * prev.abs().max(next.abs()) {
            current += 1;
        }
        tier[pair[1]] = current;
    }
    tier
}

fn shuffled_order(node_count: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..node_count).collect();
    order.shuffle(&mut rng);
    order
}

/// LCC size after each removal in `order`.
///
/// Works backwards: re-inserting nodes in reverse removal order and joining
/// them to already present neighbors gives every intermediate LCC with one
/// union-find pass.
pub fn largest_component_after_removals(graph: &CompressedGraph, order: &[usize]) -> Vec<usize> {
    let n = order.len();
    let mut present = vec![false; graph.node_count];
    let mut sets = DisjointSets::new(graph.node_count);
    let mut largest = 0u32;
    let mut sizes = vec![0usize; n];

    for k in (0..n).rev() {
        sizes[k] = largest as usize;

        let node = order[k];
        present[node] = true;
        for &neighbor in graph.neighbors(node) {
            if present[neighbor as usize] {
                sets.union(node as u32, neighbor);
            }
        }
        largest = largest.max(sets.size(node as u32));
    }

    sizes
}

fn build_report(
    graph: &ProximityGraph,
    compressed: &CompressedGraph,
    strategy: String,
    order: Vec<usize>,
) -> RobustnessReport {
    let largest_component = largest_component_after_removals(compressed, &order);
    let initial_largest_component = crate::graph::algorithms::largest_component_size(compressed);

    log::info!(
        "Removal ({}) over {} nodes: initial LCC {}",
        strategy,
        order.len(),
        initial_largest_component
    );

    let nodes = graph.nodes();
    RobustnessReport {
        strategy,
        initial_largest_component,
        removal_order: order.iter().map(|&pos| nodes[pos].id).collect(),
        largest_component,
    }
}
