//! Address matching over ingested OSM records

mod engine;
mod result;

pub use engine::Geocoder;
pub use result::{GeocodeResult, MatchSource, MatchType};
