//! Road network model

pub mod components;
pub mod network;
mod snapshot;

pub use components::{RoadEdge, RoadNode};
pub use network::{IndexedPoint, RoadGraph, geodesic_miles, is_finite};
