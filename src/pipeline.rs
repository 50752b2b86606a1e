//! Multi-resolution graph pipeline

use crate::cluster::coarsen::coarsen_components;
use crate::cluster::community::{louvain_communities, Communities};
use crate::cluster::detection::merge_close_nodes;
use crate::config::Config;
use crate::data::EventRecord;
use crate::error::GraphResult;
use crate::graph::builder::{add_edges_by_distance, graph_from_records};
use crate::graph::ProximityGraph;
use crate::robustness::{robustness_curve, RobustnessReport};

/// Graphs produced at each resolution level
#[derive(Debug, Clone)]
pub struct ResolutionLevels {
    /// Merged events connected at the local threshold
    pub local: ProximityGraph,

    /// Coarsened components connected at the regional threshold
    pub regional: ProximityGraph,
}

/// Records -> merge -> local edges -> coarsen -> regional edges.
///
/// The configuration is validated before any record is touched.
pub fn build_levels(records: &[EventRecord], config: &Config) -> GraphResult<ResolutionLevels> {
    config.validate()?;

    log::info!("Level 1: {} records", records.len());
    let graph = graph_from_records(records)?;
    let mut local = merge_close_nodes(graph, config.merge_distance_km)?;
    add_edges_by_distance(&mut local, config.edge_distance_km_level1)?;
    log::info!(
        "Level 1 graph: {} nodes, {} edges",
        local.node_count(),
        local.edge_count()
    );

    log::info!("Level 2: coarsening level 1 components");
    let mut regional = coarsen_components(&local)?;
    add_edges_by_distance(&mut regional, config.edge_distance_km_level2)?;
    log::info!(
        "Level 2 graph: {} nodes, {} edges",
        regional.node_count(),
        regional.edge_count()
    );

    Ok(ResolutionLevels { local, regional })
}

/// Run every configured removal strategy on a finished graph
pub fn analyze(graph: &ProximityGraph, config: &Config) -> GraphResult<Vec<RobustnessReport>> {
    let strategies = config.removal_strategies()?;

    strategies
        .into_iter()
        .map(|strategy| robustness_curve(graph, strategy))
        .collect()
}

/// Louvain communities of a finished graph, seeded from the configuration
pub fn detect_communities(graph: &ProximityGraph, config: &Config) -> Communities {
    louvain_communities(graph, config.community_seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_stays_empty() {
        let levels = build_levels(&[], &Config::default()).unwrap();
        assert!(levels.local.is_empty());
        assert!(levels.regional.is_empty());
        assert_eq!(levels.regional.edge_count(), 0);

        let reports = analyze(&levels.regional, &Config::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.largest_component.is_empty()));
    }

    #[test]
    fn invalid_config_fails_first() {
        let config = Config::new(1.0, 0.0, 50.0);
        assert!(build_levels(&[EventRecord::new(0.0, 0.0, 1.0)], &config).is_err());
    }

    #[test]
    fn two_regions() {
        let records = vec![
            EventRecord::new(-22.000, -47.000, 5.0),
            EventRecord::new(-22.001, -47.001, 5.0), // merges with the first
            EventRecord::new(-22.050, -47.000, 1.0), // ~5.6 km south
            EventRecord::new(-24.000, -47.000, 2.0), // ~220 km away
        ];
        let levels = build_levels(&records, &Config::default()).unwrap();

        assert_eq!(levels.local.node_count(), 3);
        assert_eq!(levels.local.edge_count(), 1);
        assert_eq!(levels.regional.node_count(), 2);
        assert_eq!(levels.regional.edge_count(), 0);
        assert_eq!(levels.regional.total_intensity(), 13.0);

        let communities = detect_communities(&levels.local, &Config::default());
        assert_eq!(communities.seed, 42);
        let mut members = communities.members.clone();
        members.iter_mut().for_each(|m| m.sort_unstable());
        members.sort();
        assert_eq!(members.len(), 2);
        assert_eq!(members.iter().map(Vec::len).sum::<usize>(), 3);
    }
}
