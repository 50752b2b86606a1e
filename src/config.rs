//! Configuration management for the fire graph pipeline

use crate::error::{check_threshold, GraphError, GraphResult};
use crate::robustness::RemovalStrategy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds and analysis settings, passed explicitly to every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nodes closer than this are merged into one (km)
    pub merge_distance_km: f64,

    /// Edge threshold for the first resolution level (km)
    pub edge_distance_km_level1: f64,

    /// Edge threshold for the coarsened second level (km)
    pub edge_distance_km_level2: f64,

    /// Seed for random removal order
    pub robustness_seed: u64,

    /// Removal strategies to run on the final graph
    pub robustness_strategies: Vec<String>,

    /// Seed for the Louvain node visiting order
    pub community_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            merge_distance_km: 1.0,
            edge_distance_km_level1: 10.0,
            edge_distance_km_level2: 50.0,
            robustness_seed: 42,
            robustness_strategies: vec!["targeted".to_string(), "random".to_string()],
            community_seed: 42,
        }
    }
}

impl Config {
    /// Create a new configuration with custom thresholds
    pub fn new(
        merge_distance_km: f64,
        edge_distance_km_level1: f64,
        edge_distance_km_level2: f64,
    ) -> Self {
        Self {
            merge_distance_km,
            edge_distance_km_level1,
            edge_distance_km_level2,
            ..Self::default()
        }
    }

    /// Read a JSON config file; absent fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds and strategy names without running anything
    pub fn validate(&self) -> GraphResult<()> {
        check_threshold("merge_distance_km", self.merge_distance_km)?;
        check_threshold("edge_distance_km_level1", self.edge_distance_km_level1)?;
        check_threshold("edge_distance_km_level2", self.edge_distance_km_level2)?;

        self.removal_strategies().map(|_| ())
    }

    /// Parsed removal strategies, the configured seed feeding `random`
    pub fn removal_strategies(&self) -> GraphResult<Vec<RemovalStrategy>> {
        self.robustness_strategies
            .iter()
            .map(|name| RemovalStrategy::parse(name, Some(self.robustness_seed)))
            .collect::<GraphResult<Vec<_>>>()
            .map_err(|e| match e {
                GraphError::InvalidArgument(msg) => {
                    GraphError::InvalidArgument(format!("robustness_strategies: {}", msg))
                }
                other => other,
            })
    }
}
