//! Graph artifact persistence and result reports

use crate::cluster::community::Communities;
use crate::cluster::metrics::{component_summaries, hottest_node};
use crate::error::{GraphError, GraphResult};
use crate::graph::algorithms::summarize;
use crate::graph::{Edge, Node, ProximityGraph};
use crate::pipeline::ResolutionLevels;
use crate::robustness::RobustnessReport;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const ARTIFACT_VERSION: u32 = 1;

/// On-disk form of a graph: node attributes plus an edge list
#[derive(Serialize, Deserialize)]
struct GraphArtifact {
    version: u32,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Encode a graph as bytes
pub fn to_bytes(graph: &ProximityGraph) -> GraphResult<Vec<u8>> {
    let artifact = GraphArtifact {
        version: ARTIFACT_VERSION,
        nodes: graph.nodes().to_vec(),
        edges: graph.edges().collect(),
    };
    Ok(bincode::serialize(&artifact)?)
}

/// Rebuild a graph from bytes produced by [`to_bytes`].
///
/// Nodes and edges are re-inserted through the normal checks, so a corrupted
/// artifact cannot produce a graph that breaks its invariants.
pub fn from_bytes(bytes: &[u8]) -> GraphResult<ProximityGraph> {
    let artifact: GraphArtifact = bincode::deserialize(bytes)?;
    artifact_into_graph(artifact)
}

fn artifact_into_graph(artifact: GraphArtifact) -> GraphResult<ProximityGraph> {
    if artifact.version != ARTIFACT_VERSION {
        return Err(GraphError::InvalidArgument(format!(
            "unsupported graph artifact version {}",
            artifact.version
        )));
    }

    let mut graph = ProximityGraph::with_capacity(artifact.nodes.len());
    for node in artifact.nodes {
        graph.add_node(node)?;
    }
    for edge in artifact.edges {
        graph.add_edge(edge.u, edge.v, edge.weight)?;
    }

    Ok(graph)
}

/// Write a graph artifact to a file
pub fn save_graph(graph: &ProximityGraph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!(
        "Saving graph with {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );

    let bytes = to_bytes(graph)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;

    Ok(())
}

/// Read a graph artifact from a file
pub fn load_graph(path: impl AsRef<Path>) -> Result<ProximityGraph> {
    let path = path.as_ref();
    log::info!("Loading graph from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let artifact: GraphArtifact = bincode::deserialize_from(reader)?;
    Ok(artifact_into_graph(artifact)?)
}

/// Save both levels, their summaries, communities and the robustness curves
pub fn save_results(
    levels: &ResolutionLevels,
    communities: &Communities,
    reports: &[RobustnessReport],
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving results to {}", output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_graph(&levels.local, Path::new(output_dir).join("graph_level1.bin"))?;
    save_graph(&levels.regional, Path::new(output_dir).join("graph_level2.bin"))?;

    save_summary(levels, output_dir)?;
    save_components(&levels.regional, output_dir)?;
    save_communities(communities, output_dir)?;
    save_robustness(reports, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save per-level graph statistics
fn save_summary(levels: &ResolutionLevels, output_dir: &str) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let summary = json!({
        "level1": {
            "graph": summarize(&levels.local),
            "hottest_node": hottest_node(&levels.local),
        },
        "level2": {
            "graph": summarize(&levels.regional),
            "hottest_node": hottest_node(&levels.regional),
        },
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save component statistics of the final level
fn save_components(graph: &ProximityGraph, output_dir: &str) -> Result<()> {
    log::info!("Saving component information");

    let path = Path::new(output_dir).join("components.json");
    let mut file = File::create(path)?;

    let components = component_summaries(graph);
    let components_json = json!({
        "component_count": components.len(),
        "components": components,
    });

    file.write_all(to_string_pretty(&components_json)?.as_bytes())?;

    Ok(())
}

/// Save Louvain communities of the final level
fn save_communities(communities: &Communities, output_dir: &str) -> Result<()> {
    log::info!("Saving {} communities", communities.len());

    let path = Path::new(output_dir).join("communities.json");
    let mut file = File::create(path)?;

    let communities_json = json!({
        "seed": communities.seed,
        "community_count": communities.len(),
        "modularity": communities.modularity,
        "communities": communities.members,
    });

    file.write_all(to_string_pretty(&communities_json)?.as_bytes())?;

    Ok(())
}

/// Save robustness curves
fn save_robustness(reports: &[RobustnessReport], output_dir: &str) -> Result<()> {
    log::info!("Saving {} robustness curves", reports.len());

    let path = Path::new(output_dir).join("robustness.json");
    let mut file = File::create(path)?;

    let curves = json!({
        "curves": reports.iter().map(|r| {
            json!({
                "strategy": r.strategy,
                "initial_largest_component": r.initial_largest_component,
                "robustness_index": r.robustness_index(),
                "removal_order": r.removal_order,
                "largest_component": r.largest_component,
            })
        }).collect::<Vec<_>>()
    });

    file.write_all(to_string_pretty(&curves)?.as_bytes())?;

    Ok(())
}
