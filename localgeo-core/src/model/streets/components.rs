//! Road network components - nodes and edges

use std::sync::Arc;

use geo::Point;

use crate::model::RoadClass;
use crate::{Miles, Minutes, OsmNodeId};

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// OSM ID of the node
    pub id: OsmNodeId,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Road graph edge (one segment between two consecutive way vertices)
#[derive(Debug, Clone)]
pub struct RoadEdge {
    pub length_miles: Miles,
    pub travel_time_minutes: Minutes,
    pub speed_mph: f64,
    pub road_class: RoadClass,
    /// Street name shared by all segments of the way
    pub name: Arc<str>,
    /// OSM ID of the way the segment belongs to
    pub way_id: i64,
}
