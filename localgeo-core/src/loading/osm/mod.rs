//! OSM pbf processing

mod processor;
mod tags;

pub use processor::{ExtractHandler, ingest, ingest_pbf};
