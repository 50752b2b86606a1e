//! Error types for graph construction and analysis

use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised by the graph core
#[derive(Debug, Error)]
pub enum GraphError {
    /// A caller-supplied value is out of its valid domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An edge references a node that is not in the graph
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    /// A node id was inserted twice
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    /// Encoding or decoding the graph artifact failed
    #[error("graph serialization failed: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Reject thresholds that are zero, negative or not finite
pub fn check_threshold(name: &str, value_km: f64) -> GraphResult<()> {
    if !value_km.is_finite() || value_km <= 0.0 {
        return Err(GraphError::InvalidArgument(format!(
            "{} must be a positive finite distance, got {}",
            name, value_km
        )));
    }
    Ok(())
}
