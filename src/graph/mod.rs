//! Graph representation and algorithms module

pub mod proximity;
pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use compressed::CompressedGraph;
pub use proximity::{Edge, Node, NodeId, ProximityGraph};
