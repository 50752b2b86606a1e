//! Weighted Louvain community detection

use crate::graph::{NodeId, ProximityGraph};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest modularity gain that counts as a move
const MIN_GAIN: f64 = 1e-12;

/// Partition of a graph into communities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Communities {
    pub seed: u64,

    /// Modularity of the partition on the input graph
    pub modularity: f64,

    /// Member ids per community, ordered by first member in node order
    pub members: Vec<Vec<NodeId>>,
}

impl Communities {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One level of the Louvain hierarchy: a weighted graph whose nodes may
/// carry self-loops left by aggregation
struct Level {
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
}

impl Level {
    fn from_graph(graph: &ProximityGraph) -> Self {
        let adjacency = (0..graph.node_count())
            .map(|pos| {
                graph
                    .adjacency_at(pos)
                    .iter()
                    .map(|&(n, w)| (n as usize, w))
                    .collect()
            })
            .collect();

        Self {
            adjacency,
            self_loops: vec![0.0; graph.node_count()],
        }
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Weighted degree, self-loops counted twice
    fn strengths(&self) -> Vec<f64> {
        self.adjacency
            .iter()
            .zip(&self.self_loops)
            .map(|(list, &loop_weight)| list.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * loop_weight)
            .collect()
    }

    /// Greedy local moving until a full pass moves nothing.
    ///
    /// Returns each node's community and whether any node changed community.
    fn local_moves(&self, rng: &mut StdRng) -> (Vec<usize>, bool) {
        let n = self.node_count();
        let strength = self.strengths();
        let two_m: f64 = strength.iter().sum();

        let mut community: Vec<usize> = (0..n).collect();
        let mut total = strength.clone();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut improved = false;
        loop {
            let mut moved = false;

            for &node in &order {
                let current = community[node];
                let k = strength[node];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, weight) in &self.adjacency[node] {
                    *links.entry(community[neighbor]).or_insert(0.0) += weight;
                }

                total[current] -= k;
                let mut best = current;
                let mut best_gain =
                    links.get(&current).copied().unwrap_or(0.0) - total[current] * k / two_m;

                for (&candidate, &weight) in &links {
                    let gain = weight - total[candidate] * k / two_m;
                    if gain - best_gain > MIN_GAIN {
                        best = candidate;
                        best_gain = gain;
                    }
                }

                total[best] += k;
                community[node] = best;
                if best != current {
                    moved = true;
                    improved = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, improved)
    }

    /// Collapse communities into nodes, renumbered by first appearance.
    ///
    /// Returns the new level and each old node's index in it.
    fn aggregate(&self, community: &[usize]) -> (Level, Vec<usize>) {
        let mut renumber: BTreeMap<usize, usize> = BTreeMap::new();
        let mut label = Vec::with_capacity(community.len());
        for &c in community {
            let next = renumber.len();
            label.push(*renumber.entry(c).or_insert(next));
        }

        let count = renumber.len();
        let mut self_loops = vec![0.0; count];
        let mut links: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for (node, list) in self.adjacency.iter().enumerate() {
            let a = label[node];
            self_loops[a] += self.self_loops[node];
            for &(neighbor, weight) in list {
                let b = label[neighbor];
                if a == b {
                    // Seen once from each endpoint
                    self_loops[a] += weight / 2.0;
                } else {
                    *links.entry((a, b)).or_insert(0.0) += weight;
                }
            }
        }

        let mut adjacency = vec![Vec::new(); count];
        for ((a, b), weight) in links {
            adjacency[a].push((b, weight));
        }

        (Level { adjacency, self_loops }, label)
    }
}

/// Louvain communities using edge weights, reproducible for a given seed.
///
/// Node visiting order at every level is a shuffle drawn from `seed`. A
/// graph without edges yields one community per node.
pub fn louvain_communities(graph: &ProximityGraph, seed: u64) -> Communities {
    let n = graph.node_count();
    let mut partition: Vec<usize> = (0..n).collect();

    let mut level = Level::from_graph(graph);
    let has_weight = level.strengths().iter().any(|&s| s > 0.0);

    if has_weight {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut depth = 0;
        loop {
            let (community, improved) = level.local_moves(&mut rng);
            if !improved {
                break;
            }
            let (next, label) = level.aggregate(&community);
            for slot in &mut partition {
                *slot = label[*slot];
            }
            level = next;
            depth += 1;
            log::debug!("Louvain level {}: {} communities", depth, level.node_count());
        }
    }

    let members = group_members(graph, &partition);
    let modularity = modularity(graph, &partition);
    log::info!(
        "Found {} communities over {} nodes (modularity {:.4})",
        members.len(),
        n,
        modularity
    );

    Communities {
        seed,
        modularity,
        members,
    }
}

fn group_members(graph: &ProximityGraph, partition: &[usize]) -> Vec<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut slot_of: BTreeMap<usize, usize> = BTreeMap::new();
    let mut members: Vec<Vec<NodeId>> = Vec::new();

    for (pos, &c) in partition.iter().enumerate() {
        let slot = *slot_of.entry(c).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        members[slot].push(nodes[pos].id);
    }

    members
}

/// Weighted modularity of a partition given as a community label per node
/// position; 0 for a graph without edge weight
pub fn modularity(graph: &ProximityGraph, partition: &[usize]) -> f64 {
    let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
    let mut total: BTreeMap<usize, f64> = BTreeMap::new();
    let mut two_m = 0.0;

    for (pos, &c) in partition.iter().enumerate() {
        for &(neighbor, weight) in graph.adjacency_at(pos) {
            two_m += weight;
            *total.entry(c).or_insert(0.0) += weight;
            if partition[neighbor as usize] == c {
                *internal.entry(c).or_insert(0.0) += weight;
            }
        }
    }

    if two_m <= 0.0 {
        return 0.0;
    }

    total
        .iter()
        .map(|(c, &tot)| {
            let inside = internal.get(c).copied().unwrap_or(0.0);
            inside / two_m - (tot / two_m).powi(2)
        })
        .sum()
}
