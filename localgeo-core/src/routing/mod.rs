//! Road distance computation with a geodesic fallback

pub mod dijkstra;
mod result;
mod router;

pub use result::{DistanceMethod, DistanceResult};
pub use router::Router;
