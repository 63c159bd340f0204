//! Data model for geocoding and routing
//!
//! Contains the typed records produced by extract ingestion, the road graph
//! and the combined model handed to callers.

pub mod geo_model;
pub mod records;
pub mod streets;

pub use geo_model::GeoModel;
pub use records::{
    AddressRecord, BuildingRecord, Extract, OsmId, Oneway, RoadClass, StreetRecord,
};
pub use streets::{IndexedPoint, RoadEdge, RoadGraph, RoadNode};
