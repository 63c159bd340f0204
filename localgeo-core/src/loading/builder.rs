use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};

use super::config::LoadConfig;
use super::osm::ingest;
use crate::model::streets::geodesic_miles;
use crate::model::{Extract, GeoModel, Oneway, RoadEdge, RoadGraph, RoadNode, StreetRecord};
use crate::{DistanceCache, Error, Geocoder, OsmNodeId, Router};

/// Reads the extracts of every configured region
///
/// # Errors
///
/// Returns an error if the configuration is invalid or an existing extract
/// cannot be decoded. Missing region files are skipped with a warning.
pub fn load_extract(config: &LoadConfig) -> Result<Extract, Error> {
    validate_config(config)?;

    let start = Instant::now();
    let extract = ingest(&config.extract_paths())?;

    info!(
        "Loaded {} of {} regions in {:.1}s",
        extract.regions.len(),
        config.regions.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(extract)
}

/// Builds the directed road graph from routable street records.
///
/// Every pair of consecutive vertices becomes one edge per permitted
/// direction. Vertices shared between ways become junctions.
///
/// # Errors
///
/// Returns [`Error::NoRoadData`] if no routable street has a vertex
pub fn build_road_graph(streets: &[StreetRecord], regions: Vec<String>) -> Result<RoadGraph, Error> {
    let mut graph: DiGraph<RoadNode, RoadEdge> = DiGraph::new();
    let mut node_indices: HashMap<OsmNodeId, NodeIndex> = HashMap::new();

    for street in streets.iter().filter(|street| street.road_class.is_routable()) {
        let speed_mph = street.speed_mph();
        let name: Arc<str> = Arc::from(street.name.as_str());
        let way_id = street.source_id.raw();

        let vertices: Vec<NodeIndex> = street
            .node_ids
            .iter()
            .zip(street.geometry.points())
            .map(|(&id, geometry)| {
                *node_indices
                    .entry(id)
                    .or_insert_with(|| graph.add_node(RoadNode { id, geometry }))
            })
            .collect();

        for (&from, &to) in vertices.iter().tuple_windows() {
            if from == to {
                continue;
            }

            let length_miles = geodesic_miles(graph[from].geometry, graph[to].geometry);
            let edge = RoadEdge {
                length_miles,
                travel_time_minutes: length_miles / speed_mph * 60.0,
                speed_mph,
                road_class: street.road_class,
                name: Arc::clone(&name),
                way_id,
            };

            match street.oneway {
                Oneway::No => {
                    graph.add_edge(to, from, edge.clone());
                    graph.add_edge(from, to, edge);
                }
                Oneway::Forward => {
                    graph.add_edge(from, to, edge);
                }
                Oneway::Reverse => {
                    graph.add_edge(to, from, edge);
                }
            }
        }
    }

    if graph.node_count() == 0 {
        return Err(Error::NoRoadData);
    }

    info!(
        "Built road graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(RoadGraph::new(graph, regions))
}

/// Loads the configured regions and builds a geocoder and router over them
///
/// # Errors
///
/// Returns an error if the configuration is invalid or an extract cannot be
/// decoded. A missing road network is not an error: the router then answers
/// with geodesic distances only.
pub fn create_geo_model(config: &LoadConfig) -> Result<GeoModel, Error> {
    let extract = load_extract(config)?;
    let model = geo_model_from_extract(extract, config);

    // Decoding PBF blocks allocates heavily and glibc keeps most of it on
    // the heap afterwards. Hand the free tail back to the system.
    //
    // # Safety
    //
    // malloc_trim is only called on linux with glibc, checked at compile time.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("No heap memory released by malloc_trim");
        } else {
            log::debug!("Successfully trimmed unused heap memory");
        }
    }

    info!("Geo model created: {}", model.info());
    Ok(model)
}

/// Builds a model from an already ingested extract
pub fn geo_model_from_extract(extract: Extract, config: &LoadConfig) -> GeoModel {
    let graph = road_graph(&extract, config);

    let cache = match &config.cache_path {
        Some(path) => DistanceCache::load(path),
        None => DistanceCache::in_memory(),
    };

    let router = Router::new(graph, Arc::new(cache))
        .with_max_snap_distance(config.max_snap_distance_miles)
        .with_route_geometry(config.include_route);

    GeoModel::new(Geocoder::new(extract), router)
}

/// Restores the road graph of the loaded regions from its snapshot when one
/// is configured and readable, otherwise builds it and writes the snapshot
fn road_graph(extract: &Extract, config: &LoadConfig) -> Option<RoadGraph> {
    let snapshot_path = config.graph_snapshot_path(&extract.regions);

    if let Some(path) = snapshot_path.as_deref().filter(|path| path.exists()) {
        let start = Instant::now();
        match RoadGraph::load_snapshot(path) {
            Ok(graph) => {
                info!(
                    "Loaded road graph snapshot with {} nodes and {} edges in {:.1}s",
                    graph.node_count(),
                    graph.edge_count(),
                    start.elapsed().as_secs_f32()
                );
                return Some(graph);
            }
            Err(err) => warn!("{err}; rebuilding the road graph"),
        }
    }

    match build_road_graph(&extract.streets, extract.regions.clone()) {
        Ok(graph) => {
            if let Some(path) = &snapshot_path {
                if let Err(err) = graph.save_snapshot(path) {
                    warn!("Failed to save road graph snapshot: {err}");
                }
            }
            Some(graph)
        }
        Err(err) => {
            warn!("{err}; distances will be geodesic only");
            None
        }
    }
}

fn validate_config(config: &LoadConfig) -> Result<(), Error> {
    if config.regions.is_empty() {
        return Err(Error::InvalidData(
            "No regions provided in the configuration".to_string(),
        ));
    }

    if !config.data_dir.exists() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Extract directory not found: {}", config.data_dir.display()),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Point};
    use petgraph::visit::EdgeRef;

    use super::*;
    use crate::model::{OsmId, RoadClass};

    fn street(
        way_id: i64,
        nodes: &[(OsmNodeId, f64, f64)],
        road_class: RoadClass,
        oneway: Oneway,
    ) -> StreetRecord {
        StreetRecord {
            name: format!("WAY {way_id}"),
            road_class,
            geometry: LineString::from(
                nodes.iter().map(|&(_, lon, lat)| (lon, lat)).collect::<Vec<_>>(),
            ),
            node_ids: nodes.iter().map(|&(id, _, _)| id).collect(),
            max_speed_mph: None,
            oneway,
            lanes: 1,
            source_id: OsmId::Way(way_id),
        }
    }

    #[test]
    fn two_way_streets_get_both_directions() {
        let streets = vec![
            street(1, &[(1, -92.0, 34.0), (2, -92.0, 34.01), (3, -92.0, 34.02)], RoadClass::Residential, Oneway::No),
            street(2, &[(3, -92.0, 34.02), (4, -91.99, 34.02)], RoadClass::Primary, Oneway::No),
        ];
        let graph = build_road_graph(&streets, vec!["test".into()]).unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 6);

        let a = graph.node_index(1).unwrap();
        let b = graph.node_index(2).unwrap();
        let edge = graph.edges(a).next().unwrap();
        assert_eq!(edge.target(), b);

        let weight = edge.weight();
        let expected = geodesic_miles(Point::new(-92.0, 34.0), Point::new(-92.0, 34.01));
        assert!((weight.length_miles - expected).abs() < 1e-12);
        assert!((weight.travel_time_minutes - expected / 25.0 * 60.0).abs() < 1e-12);
    }

    #[test]
    fn oneway_directions() {
        let forward = build_road_graph(
            &[street(1, &[(1, -92.0, 34.0), (2, -92.0, 34.01)], RoadClass::Secondary, Oneway::Forward)],
            Vec::new(),
        )
        .unwrap();
        let from = forward.node_index(1).unwrap();
        let to = forward.node_index(2).unwrap();
        assert_eq!(forward.edge_count(), 1);
        assert_eq!(forward.edges(from).count(), 1);
        assert_eq!(forward.edges(to).count(), 0);

        let reverse = build_road_graph(
            &[street(1, &[(1, -92.0, 34.0), (2, -92.0, 34.01)], RoadClass::Secondary, Oneway::Reverse)],
            Vec::new(),
        )
        .unwrap();
        let from = reverse.node_index(1).unwrap();
        let to = reverse.node_index(2).unwrap();
        assert_eq!(reverse.edges(from).count(), 0);
        assert_eq!(reverse.edges(to).count(), 1);
    }

    #[test]
    fn unroutable_streets_are_ignored() {
        let streets = vec![street(
            1,
            &[(1, -92.0, 34.0), (2, -92.0, 34.01)],
            RoadClass::Other,
            Oneway::No,
        )];
        assert!(matches!(
            build_road_graph(&streets, Vec::new()),
            Err(Error::NoRoadData)
        ));
        assert!(matches!(build_road_graph(&[], Vec::new()), Err(Error::NoRoadData)));
    }

    #[test]
    fn posted_speed_overrides_class_default() {
        let mut fast = street(1, &[(1, -92.0, 34.0), (2, -92.0, 34.01)], RoadClass::Residential, Oneway::Forward);
        fast.max_speed_mph = Some(50.0);
        let graph = build_road_graph(&[fast], Vec::new()).unwrap();
        let edge = graph.edges(graph.node_index(1).unwrap()).next().unwrap();
        let weight = edge.weight();
        assert_eq!(weight.speed_mph, 50.0);
        assert!((weight.travel_time_minutes - weight.length_miles / 50.0 * 60.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = LoadConfig::new("/nonexistent", Vec::new());
        assert!(matches!(load_extract(&config), Err(Error::InvalidData(_))));

        let config = LoadConfig::new("/nonexistent/osm", vec!["arkansas".into()]);
        assert!(matches!(load_extract(&config), Err(Error::IoError(_))));
    }

    #[test]
    fn road_graph_snapshot_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoadConfig {
            graph_cache_dir: Some(dir.path().to_path_buf()),
            ..LoadConfig::default()
        };
        let extract = Extract {
            streets: vec![street(
                1,
                &[(1, -92.0, 34.0), (2, -92.0, 34.01), (3, -91.99, 34.01)],
                RoadClass::Residential,
                Oneway::No,
            )],
            regions: vec!["tennessee".into(), "arkansas".into()],
            ..Extract::default()
        };

        let built = geo_model_from_extract(extract, &config);
        let snapshot = dir.path().join("road_graph_arkansas_tennessee.json");
        assert!(snapshot.exists());
        let fingerprint = built.router.graph().unwrap().fingerprint();

        // no streets this time: the graph can only come from the snapshot
        let regions_only = Extract {
            regions: vec!["arkansas".into(), "tennessee".into()],
            ..Extract::default()
        };
        let restored = geo_model_from_extract(regions_only, &config);
        let graph = restored.router.graph().unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);

        assert_eq!(graph.fingerprint(), fingerprint);

        let a = Point::new(-92.0, 34.0);
        let c = Point::new(-91.99, 34.01);
        let (restored_miles, built_miles) = (
            restored.distance(a, c).road_miles.unwrap(),
            built.distance(a, c).road_miles.unwrap(),
        );
        assert!((restored_miles - built_miles).abs() < 1e-9);
    }

    #[test]
    fn corrupt_snapshot_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("road_graph_arkansas.json");
        std::fs::write(&snapshot, "{}").unwrap();

        let config = LoadConfig {
            graph_cache_dir: Some(dir.path().to_path_buf()),
            ..LoadConfig::default()
        };
        let extract = Extract {
            streets: vec![street(1, &[(1, -92.0, 34.0), (2, -92.0, 34.01)], RoadClass::Primary, Oneway::No)],
            regions: vec!["arkansas".into()],
            ..Extract::default()
        };

        let model = geo_model_from_extract(extract, &config);
        assert_eq!(model.router.graph().map(RoadGraph::edge_count), Some(2));
        assert!(RoadGraph::load_snapshot(&snapshot).is_ok());
    }

    #[test]
    fn missing_region_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoadConfig::new(dir.path(), vec!["atlantis".into()]);
        let extract = load_extract(&config).unwrap();
        assert!(extract.is_empty());

        let model = create_geo_model(&config).unwrap();
        assert!(model.router.graph().is_none());
        assert!(!model.geocoder.is_ready());
    }
}
