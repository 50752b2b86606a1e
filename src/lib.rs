//! Core library functions for the fire proximity graph analyzer

pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod graph;
pub mod cluster;
pub mod pipeline;
pub mod robustness;
pub mod storage;

pub use anyhow::{Result, anyhow};
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Node, NodeId, ProximityGraph};
