//! On-disk snapshot of a built road graph
//!
//! Node and edge order are preserved, so a restored graph has the same
//! indices and the same fingerprint as the one that was saved.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::{RoadEdge, RoadGraph, RoadNode};
use crate::model::RoadClass;
use crate::{Error, Miles, Minutes, OsmNodeId};

/// Bumped whenever the snapshot layout changes
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    version: u32,
    regions: Vec<String>,
    /// (OSM id, lon, lat)
    nodes: Vec<(OsmNodeId, f64, f64)>,
    edges: Vec<SnapshotEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEdge {
    from: u32,
    to: u32,
    length_miles: Miles,
    travel_time_minutes: Minutes,
    speed_mph: f64,
    road_class: RoadClass,
    name: String,
    way_id: i64,
}

impl RoadGraph {
    /// Write the graph to `path` as JSON, through a temporary file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_snapshot(&self, path: &Path) -> Result<(), Error> {
        let snapshot = GraphSnapshot {
            version: SNAPSHOT_FORMAT_VERSION,
            regions: self.regions().to_vec(),
            nodes: self
                .graph
                .node_weights()
                .map(|node| (node.id, node.geometry.x(), node.geometry.y()))
                .collect(),
            edges: self
                .graph
                .raw_edges()
                .iter()
                .map(|edge| SnapshotEdge {
                    from: index_u32(edge.source()),
                    to: index_u32(edge.target()),
                    length_miles: edge.weight.length_miles,
                    travel_time_minutes: edge.weight.travel_time_minutes,
                    speed_mph: edge.weight.speed_mph,
                    road_class: edge.weight.road_class,
                    name: edge.weight.name.to_string(),
                    way_id: edge.weight.way_id,
                })
                .collect(),
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &snapshot).map_err(io::Error::from)?;
        writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        fs::rename(&tmp_path, path)?;

        info!(
            "Saved road graph snapshot ({} nodes, {} edges) to {}",
            snapshot.nodes.len(),
            snapshot.edges.len(),
            path.display()
        );
        Ok(())
    }

    /// Restore a graph written by [`RoadGraph::save_snapshot`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoError`] if the file cannot be opened and
    /// [`Error::SnapshotCorrupt`] if it cannot be decoded, has another
    /// format version or references missing nodes
    pub fn load_snapshot(path: &Path) -> Result<RoadGraph, Error> {
        let file = File::open(path)?;
        let snapshot: GraphSnapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| Error::SnapshotCorrupt(format!("{}: {err}", path.display())))?;
        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::SnapshotCorrupt(format!(
                "{}: format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                path.display(),
                snapshot.version
            )));
        }

        let mut graph: DiGraph<RoadNode, RoadEdge> =
            DiGraph::with_capacity(snapshot.nodes.len(), snapshot.edges.len());
        for (id, lon, lat) in snapshot.nodes {
            graph.add_node(RoadNode {
                id,
                geometry: Point::new(lon, lat),
            });
        }

        // Edges of one way share a name
        let mut names: HashMap<String, Arc<str>> = HashMap::new();
        let node_count = graph.node_count();
        for edge in snapshot.edges {
            let (from, to) = (edge.from as usize, edge.to as usize);
            if from >= node_count || to >= node_count {
                return Err(Error::SnapshotCorrupt(format!(
                    "{}: edge {from} -> {to} outside {node_count} nodes",
                    path.display()
                )));
            }

            let name = Arc::clone(
                names
                    .entry(edge.name)
                    .or_insert_with_key(|name| Arc::from(name.as_str())),
            );
            graph.add_edge(
                NodeIndex::new(from),
                NodeIndex::new(to),
                RoadEdge {
                    length_miles: edge.length_miles,
                    travel_time_minutes: edge.travel_time_minutes,
                    speed_mph: edge.speed_mph,
                    road_class: edge.road_class,
                    name,
                    way_id: edge.way_id,
                },
            );
        }

        debug!(
            "Restored road graph snapshot from {} ({} nodes, {} edges)",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(RoadGraph::new(graph, snapshot.regions))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index_u32(idx: NodeIndex) -> u32 {
    idx.index() as u32
}
