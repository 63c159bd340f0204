pub use crate::MAX_SNAP_DISTANCE_MILES;

// Re-export key components
pub use crate::address::{ParsedAddress, parse_address};
pub use crate::cache::{CacheKey, CachedRoute, DistanceCache};
pub use crate::geocoding::{GeocodeResult, Geocoder, MatchSource, MatchType};
pub use crate::loading::{
    ExtractHandler, LoadConfig, build_road_graph, create_geo_model, geo_model_from_extract,
    load_extract,
};
pub use crate::model::{Extract, GeoModel, RoadGraph};
pub use crate::routing::{DistanceMethod, DistanceResult, Router};

// Core types
pub use crate::Error;
pub use crate::Miles;
pub use crate::Minutes;
pub use crate::OsmNodeId;
