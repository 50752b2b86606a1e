//! Node aggregation module: proximity merging, component coarsening and
//! community detection

pub mod detection;
pub mod coarsen;
pub mod community;
pub mod metrics;

use crate::geo::{mean_position, GeoPoint};
use crate::graph::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Statistics of one connected component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Position of the component in size order (0 = largest)
    pub rank: u32,

    /// Member node ids
    pub members: Vec<NodeId>,

    /// Size of the component
    pub size: usize,

    /// Sum of member intensities
    pub total_intensity: f64,

    /// Density: actual edges / potential edges
    pub density: f32,

    /// Mean member position
    pub centroid: GeoPoint,
}

/// Collapse a group of nodes into one aggregate node.
///
/// Position is the arithmetic mean, intensity the sum, and provenance the
/// sorted union of the members' original ids. Returns `None` for an empty
/// group.
pub fn aggregate_nodes<'a, I>(id: NodeId, members: I) -> Option<Node>
where
    I: IntoIterator<Item = &'a Node>,
    I::IntoIter: Clone,
{
    let members = members.into_iter();
    let centroid = mean_position(members.clone().map(Node::position))?;
    let intensity = members.clone().map(|n| n.intensity).sum();

    let mut provenance: Vec<NodeId> = members.flat_map(|n| n.origin_ids()).collect();
    provenance.sort_unstable();
    provenance.dedup();

    Some(Node {
        id,
        latitude: centroid.latitude,
        longitude: centroid.longitude,
        intensity,
        provenance,
    })
}
