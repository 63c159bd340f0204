//! Offline geocoding and road-network distances over OpenStreetMap extracts.
//!
//! The crate turns free-text postal addresses into coordinates using a
//! cascade of matching strategies and computes driving distance and time
//! between coordinates on a road graph built from the same extracts.

pub mod address;
pub mod cache;
mod error;
pub mod geocoding;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use address::{ParsedAddress, parse_address};
pub use cache::{CacheKey, CachedRoute, DistanceCache};
pub use error::Error;
pub use geocoding::{GeocodeResult, Geocoder, MatchSource, MatchType};
pub use loading::{
    ExtractHandler, LoadConfig, build_road_graph, create_geo_model, geo_model_from_extract,
    load_extract,
};
pub use model::{
    AddressRecord, BuildingRecord, Extract, GeoModel, OsmId, RoadClass, RoadGraph, StreetRecord,
};
pub use routing::{DistanceMethod, DistanceResult, Router};

/// OSM node identifier, used as the stable key of road graph nodes
pub type OsmNodeId = i64;

/// Distance in statute miles
pub type Miles = f64;

/// Duration in minutes
pub type Minutes = f64;

/// Query points farther than this from every road node are not routed
pub const MAX_SNAP_DISTANCE_MILES: Miles = 1.0;

pub(crate) const METERS_PER_MILE: f64 = 1609.344;

pub(crate) const KMH_TO_MPH: f64 = 0.621_371;
