use std::path::{Path, PathBuf};
use std::time::Instant;

use geo::{Centroid, Coord, LineString, Point, Polygon};
use hashbrown::HashMap;
use log::{debug, info, warn};
use osmpbf::{Element, ElementReader};

use super::tags::{AddressTags, Tags, parse_lanes, parse_oneway, parse_speed_mph};
use crate::address::{clean_tokens, normalize_street};
use crate::model::{BuildingRecord, Extract, OsmId, RoadClass, StreetRecord};
use crate::{Error, OsmNodeId};

/// Turns a stream of OSM elements into an [`Extract`].
///
/// Nodes must be fed before the ways that reference them, which is the
/// order of every sorted PBF file.
#[derive(Debug, Default)]
pub struct ExtractHandler {
    locations: HashMap<OsmNodeId, Point<f64>>,
    extract: Extract,
    incomplete_ways: usize,
}

impl ExtractHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one node. Every node location is kept for way geometry.
    pub fn node<'a>(
        &mut self,
        id: OsmNodeId,
        lat: f64,
        lon: f64,
        tags: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let geometry = Point::new(lon, lat);
        self.locations.insert(id, geometry);

        let tags = Tags::new(tags);
        if tags.is_empty() {
            return;
        }

        if let Some(address) = AddressTags::from_tags(&tags) {
            self.extract
                .addresses
                .push(address.into_record(geometry, OsmId::Node(id)));
        }

        if let Some(name) = tags.name().and_then(building_name) {
            self.extract.buildings.push(BuildingRecord {
                name,
                geometry,
                source_id: OsmId::Node(id),
            });
        }
    }

    /// Process one way
    pub fn way<'a>(
        &mut self,
        id: i64,
        refs: impl IntoIterator<Item = OsmNodeId>,
        tags: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        let tags = Tags::new(tags);
        if tags.is_empty() {
            return;
        }

        let node_ids: Vec<OsmNodeId> = refs.into_iter().collect();
        let coords: Option<Vec<Coord<f64>>> = node_ids
            .iter()
            .map(|node_id| self.locations.get(node_id).map(|point| point.0))
            .collect();
        let Some(coords) = coords else {
            self.incomplete_ways += 1;
            return;
        };
        if coords.len() < 2 {
            return;
        }
        let geometry = LineString::from(coords);

        if tags.is_building() {
            if let Some(centroid) = way_centroid(&geometry) {
                if let Some(address) = AddressTags::from_tags(&tags) {
                    self.extract
                        .addresses
                        .push(address.into_record(centroid, OsmId::Way(id)));
                }
                if let Some(name) = tags.name().and_then(building_name) {
                    self.extract.buildings.push(BuildingRecord {
                        name,
                        geometry: centroid,
                        source_id: OsmId::Way(id),
                    });
                }
            }
        }

        if let Some(highway) = tags.get("highway") {
            let road_class = RoadClass::from_tag(highway);
            let name = tags.name().map(normalize_street).unwrap_or_default();
            if name.is_empty() && !road_class.is_routable() {
                return;
            }

            self.extract.streets.push(StreetRecord {
                name,
                road_class,
                geometry,
                node_ids,
                max_speed_mph: tags.get("maxspeed").and_then(parse_speed_mph),
                oneway: parse_oneway(tags.get("oneway")),
                lanes: parse_lanes(tags.get("lanes")),
                source_id: OsmId::Way(id),
            });
        }
    }

    pub fn finish(self) -> Extract {
        if self.incomplete_ways > 0 {
            debug!(
                "Skipped {} ways referencing nodes outside the extract",
                self.incomplete_ways
            );
        }
        self.extract
    }
}

/// Building names are matched against cleaned query words, so they are
/// stored the same way: upper case without punctuation
fn building_name(name: &str) -> Option<String> {
    let name = clean_tokens(name).join(" ");
    (!name.is_empty()).then_some(name)
}

/// Closed rings use the polygon centroid, anything else the line centroid
fn way_centroid(geometry: &LineString<f64>) -> Option<Point<f64>> {
    if geometry.is_closed() && geometry.0.len() > 3 {
        Polygon::new(geometry.clone(), Vec::new()).centroid()
    } else {
        geometry.centroid()
    }
}

/// Read a single OSM PBF file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn ingest_pbf(path: &Path) -> Result<Extract, Error> {
    let reader = ElementReader::from_path(path)?;
    let mut handler = ExtractHandler::new();

    reader.for_each(|element| match element {
        Element::Node(node) => handler.node(node.id(), node.lat(), node.lon(), node.tags()),
        Element::DenseNode(node) => handler.node(node.id(), node.lat(), node.lon(), node.tags()),
        Element::Way(way) => handler.way(way.id(), way.refs(), way.tags()),
        Element::Relation(_) => {}
    })?;

    Ok(handler.finish())
}

/// Read several extracts into one flat collection. Records from overlapping
/// extracts are not deduplicated. Missing files are skipped with a warning.
///
/// # Errors
///
/// Returns an error if an existing file cannot be decoded
pub fn ingest(paths: &[PathBuf]) -> Result<Extract, Error> {
    let mut extract = Extract::default();

    for path in paths {
        if !path.exists() {
            warn!("OSM extract not found: {}", path.display());
            continue;
        }

        info!("Processing OSM extract: {}", path.display());
        let start = Instant::now();

        let mut region = ingest_pbf(path)?;
        region.regions.push(region_name(path));
        info!(
            "Found {} addresses, {} streets, {} buildings in {:.1}s",
            region.addresses.len(),
            region.streets.len(),
            region.buildings.len(),
            start.elapsed().as_secs_f32()
        );
        extract.append(region);
    }

    Ok(extract)
}

/// `arkansas-latest.osm.pbf` -> `arkansas`
fn region_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .strip_suffix(".osm.pbf")
        .map(|stem| stem.strip_suffix("-latest").unwrap_or(stem))
        .unwrap_or(&file_name)
        .to_string()
}
