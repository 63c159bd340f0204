use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{MAX_SNAP_DISTANCE_MILES, Miles};

/// Where to find extracts and how to route over them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Directory holding `<region>-latest.osm.pbf` files
    pub data_dir: PathBuf,
    /// Regions to load, e.g. `["arkansas", "tennessee"]`
    pub regions: Vec<String>,
    /// Persistent distance cache; in-memory only when `None`
    pub cache_path: Option<PathBuf>,
    pub max_snap_distance_miles: Miles,
    /// Return the node coordinates of found routes
    pub include_route: bool,
    /// Directory for road graph snapshots; graphs are rebuilt every time
    /// when `None`
    pub graph_cache_dir: Option<PathBuf>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/osm_extracts"),
            regions: Vec::new(),
            cache_path: None,
            max_snap_distance_miles: MAX_SNAP_DISTANCE_MILES,
            include_route: false,
            graph_cache_dir: None,
        }
    }
}

impl LoadConfig {
    pub fn new(data_dir: impl Into<PathBuf>, regions: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            regions,
            ..Self::default()
        }
    }

    pub fn extract_path(&self, region: &str) -> PathBuf {
        self.data_dir.join(format!("{region}-latest.osm.pbf"))
    }

    /// Extract file of every configured region, in configuration order
    pub fn extract_paths(&self) -> Vec<PathBuf> {
        self.regions
            .iter()
            .map(|region| self.extract_path(region))
            .collect()
    }

    /// Snapshot file for the road graph of `regions`, independent of their
    /// order: `road_graph_arkansas_tennessee.json`
    pub fn graph_snapshot_path(&self, regions: &[String]) -> Option<PathBuf> {
        let dir = self.graph_cache_dir.as_ref()?;
        if regions.is_empty() {
            return None;
        }

        let mut regions: Vec<&str> = regions.iter().map(String::as_str).collect();
        regions.sort_unstable();
        Some(dir.join(format!("road_graph_{}.json", regions.join("_"))))
    }
}
