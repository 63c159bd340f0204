//! This module is responsible for reading OSM extracts into typed records
//! and building the geocoding and routing model from them.

mod builder;
mod config;
pub mod osm;

pub use builder::{build_road_graph, create_geo_model, geo_model_from_extract, load_extract};
pub use config::LoadConfig;
pub use osm::{ExtractHandler, ingest, ingest_pbf};
