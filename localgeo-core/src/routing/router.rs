use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use geo::Point;
use log::{debug, info, warn};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use super::dijkstra::{RoadPath, shortest_path};
use super::result::{DistanceMethod, DistanceResult};
use crate::cache::{CacheKey, DistanceCache};
use crate::model::RoadGraph;
use crate::model::streets::{geodesic_miles, is_finite};
use crate::{Error, MAX_SNAP_DISTANCE_MILES, Miles};

/// Answers distance queries over an optional road graph.
///
/// Queries never fail: whenever no road route can be produced the result
/// carries the geodesic distance only.
#[derive(Debug)]
pub struct Router {
    graph: Option<RoadGraph>,
    cache: Arc<DistanceCache>,
    max_snap_distance_miles: Miles,
    include_route: bool,
    searches: AtomicUsize,
}

impl Router {
    /// Binds `cache` to `graph`. Cached entries from another road network
    /// are discarded.
    pub fn new(graph: Option<RoadGraph>, cache: Arc<DistanceCache>) -> Self {
        if let Some(graph) = &graph {
            cache.rescope(&graph.fingerprint());
        }

        Self {
            graph,
            cache,
            max_snap_distance_miles: MAX_SNAP_DISTANCE_MILES,
            include_route: false,
            searches: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_max_snap_distance(mut self, miles: Miles) -> Self {
        self.max_snap_distance_miles = miles;
        self
    }

    /// Collect route node coordinates in computed results
    #[must_use]
    pub fn with_route_geometry(mut self, include_route: bool) -> Self {
        self.include_route = include_route;
        self
    }

    pub fn graph(&self) -> Option<&RoadGraph> {
        self.graph.as_ref()
    }

    pub fn cache(&self) -> &Arc<DistanceCache> {
        &self.cache
    }

    /// Number of shortest-path searches run so far
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }

    /// Nearest road node to `point` and its distance in miles
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for a non-finite coordinate,
    /// [`Error::NoRoadData`] without a graph and [`Error::NoNearbyRoad`] if
    /// the nearest node is too far away
    pub fn snap(&self, point: &Point<f64>) -> Result<(NodeIndex, Miles), Error> {
        if !is_finite(point) {
            return Err(Error::InvalidData(format!(
                "Non-finite coordinate ({}, {})",
                point.y(),
                point.x()
            )));
        }
        let graph = self.graph.as_ref().ok_or(Error::NoRoadData)?;
        let (node, miles) = graph.nearest_node(point).ok_or(Error::NoRoadData)?;
        if miles < self.max_snap_distance_miles {
            Ok((node, miles))
        } else {
            Err(Error::NoNearbyRoad)
        }
    }

    /// Distance from `origin` to `destination`.
    ///
    /// Looks the pair up in the cache first; otherwise both points are
    /// snapped to the road graph and the shortest path by length is
    /// computed. The outcome, found or not, is cached.
    pub fn distance(&self, origin: Point<f64>, destination: Point<f64>) -> DistanceResult {
        self.distance_with_route(origin, destination, self.include_route)
    }

    /// [`Router::distance`] with route geometry requested per call.
    ///
    /// A cached route stored without geometry is recomputed when geometry is
    /// requested. A non-finite coordinate yields a `NaN` geodesic distance
    /// and is neither routed nor cached.
    pub fn distance_with_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        include_route: bool,
    ) -> DistanceResult {
        if !is_finite(&origin) || !is_finite(&destination) {
            debug!("Skipping distance query with a non-finite coordinate");
            return DistanceResult::geodesic(f64::NAN);
        }

        let geodesic = geodesic_miles(origin, destination);
        let Some(graph) = &self.graph else {
            return DistanceResult::geodesic(geodesic);
        };

        let key = CacheKey::new(origin, destination);
        if let Some(cached) = self.cache.get(&key) {
            let lacks_geometry = include_route && cached.route_found && cached.route_points.is_none();
            if !lacks_geometry {
                let mut result = DistanceResult::from_cached(geodesic, cached);
                if !include_route {
                    result.route_points = None;
                }
                return result;
            }
        }

        let result = match self.road_path(&origin, &destination) {
            Ok(path) => DistanceResult {
                geodesic_miles: geodesic,
                road_miles: Some(path.length_miles()),
                travel_minutes: Some(path.travel_minutes()),
                route_found: true,
                method: DistanceMethod::RoadNetwork,
                route_points: include_route.then(|| path.coordinates(graph)),
            },
            Err(err) => {
                debug!(
                    "Falling back to geodesic distance for ({:.6}, {:.6}) -> ({:.6}, {:.6}): {err}",
                    origin.y(),
                    origin.x(),
                    destination.y(),
                    destination.x()
                );
                DistanceResult::geodesic(geodesic)
            }
        };

        self.cache.put(key, result.to_cached());
        result
    }

    /// Distances from one origin to many destinations, computed in parallel.
    /// The cache is saved afterwards.
    pub fn distance_batch(
        &self,
        origin: Point<f64>,
        destinations: &[Point<f64>],
    ) -> Vec<DistanceResult> {
        let start = Instant::now();
        let results: Vec<DistanceResult> = destinations
            .par_iter()
            .map(|&destination| self.distance(origin, destination))
            .collect();

        let routed = results.iter().filter(|result| result.route_found).count();
        info!(
            "Computed {} distances ({routed} over roads) in {:.2}s",
            results.len(),
            start.elapsed().as_secs_f32()
        );
        if routed < results.len() && self.graph.is_some() {
            warn!(
                "{} of {} destinations fell back to geodesic distance",
                results.len() - routed,
                results.len()
            );
        }

        if let Err(err) = self.cache.save() {
            warn!("Failed to save distance cache: {err}");
        }
        results
    }

    /// # Errors
    ///
    /// Returns an error if the cache file cannot be written
    pub fn save_cache(&self) -> Result<usize, Error> {
        self.cache.save()
    }

    fn road_path(&self, origin: &Point<f64>, destination: &Point<f64>) -> Result<RoadPath, Error> {
        let graph = self.graph.as_ref().ok_or(Error::NoRoadData)?;
        let (start, _) = self.snap(origin)?;
        let (target, _) = self.snap(destination)?;

        self.searches.fetch_add(1, Ordering::Relaxed);
        shortest_path(graph, start, target)
    }
}

#[cfg(test)]
mod tests {
    use geo::LineString;
    use petgraph::graph::DiGraph;

    use super::*;
    use crate::loading::build_road_graph;
    use crate::model::{OsmId, Oneway, RoadClass, RoadEdge, RoadNode, StreetRecord};

    /// Latitude span of two miles along a meridian at 34°N
    const TWO_MILES_LAT: f64 = 0.028_97;

    fn router(graph: RoadGraph) -> Router {
        Router::new(Some(graph), Arc::new(DistanceCache::in_memory()))
    }

    fn two_node_router() -> (Router, Point<f64>, Point<f64>) {
        let a = Point::new(-92.0, 34.0);
        let b = Point::new(-92.0, 34.0 + TWO_MILES_LAT);

        let mut graph = DiGraph::new();
        let na = graph.add_node(RoadNode { id: 1, geometry: a });
        let nb = graph.add_node(RoadNode { id: 2, geometry: b });
        let edge = RoadEdge {
            length_miles: 2.0,
            travel_time_minutes: 4.0,
            speed_mph: 30.0,
            road_class: RoadClass::Tertiary,
            name: Arc::from("MAIN ST"),
            way_id: 10,
        };
        graph.add_edge(na, nb, edge.clone());
        graph.add_edge(nb, na, edge);

        (router(RoadGraph::new(graph, vec!["test".into()])), a, b)
    }

    fn street(way_id: i64, nodes: &[(i64, f64, f64)], oneway: Oneway) -> StreetRecord {
        StreetRecord {
            name: String::new(),
            road_class: RoadClass::Residential,
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

    /// A -> B is one-way; going back from B has to detour through C
    fn triangle() -> (Router, [Point<f64>; 3]) {
        let points = [
            Point::new(-92.0, 34.0),
            Point::new(-92.0, 34.01),
            Point::new(-91.99, 34.005),
        ];
        let [a, b, c] = points;
        let streets = vec![
            street(1, &[(1, a.x(), a.y()), (2, b.x(), b.y())], Oneway::Forward),
            street(2, &[(2, b.x(), b.y()), (3, c.x(), c.y()), (1, a.x(), a.y())], Oneway::No),
        ];
        let graph = build_road_graph(&streets, vec!["test".into()]).unwrap();
        (router(graph), points)
    }

    #[test]
    fn two_miles_at_thirty_mph() {
        let (router, a, b) = two_node_router();
        let result = router.distance(a, b);

        assert!(result.route_found);
        assert_eq!(result.method, DistanceMethod::RoadNetwork);
        assert_eq!(result.road_miles, Some(2.0));
        assert_eq!(result.travel_minutes, Some(4.0));
        assert!((result.geodesic_miles - 2.0).abs() < 0.01);
        assert!(result.route_points.is_none());
    }

    #[test]
    fn same_point_is_zero_distance() {
        let (router, a, _) = two_node_router();
        let result = router.distance(a, a);

        assert_eq!(result.geodesic_miles, 0.0);
        assert_eq!(result.road_miles, Some(0.0));
        assert_eq!(result.travel_minutes, Some(0.0));
        assert!(result.route_found);
    }

    #[test]
    fn far_query_points_are_not_snapped() {
        let (router, a, _) = two_node_router();
        // roughly five miles east of both nodes
        let far = Point::new(-91.912, 34.0);

        assert!(matches!(router.snap(&far), Err(Error::NoNearbyRoad)));

        let result = router.distance(far, a);
        assert!(!result.route_found);
        assert_eq!(result.method, DistanceMethod::Geodesic);
        assert_eq!(result.road_miles, None);
        assert!(result.geodesic_miles > 4.5);
        assert_eq!(router.search_count(), 0);
    }

    #[test]
    fn two_way_roads_are_symmetric() {
        let (router, [_, b, c]) = triangle();
        let there = router.distance(b, c);
        let back = router.distance(c, b);

        assert!((there.geodesic_miles - back.geodesic_miles).abs() < 1e-9);
        let (there, back) = (there.road_miles.unwrap(), back.road_miles.unwrap());
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn oneway_roads_are_asymmetric() {
        let (router, [a, b, c]) = triangle();
        let forward = router.distance(a, b).road_miles.unwrap();
        let backward = router.distance(b, a).road_miles.unwrap();

        assert!((forward - geodesic_miles(a, b)).abs() < 1e-9);
        let detour = geodesic_miles(b, c) + geodesic_miles(c, a);
        assert!((backward - detour).abs() < 1e-9);
        assert!(backward > forward);
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let (router, a, b) = two_node_router();
        let first = router.distance(a, b);
        let second = router.distance(a, b);

        assert_eq!(first, second);
        assert_eq!(router.search_count(), 1);
        assert_eq!(router.cache().len(), 1);
    }

    #[test]
    fn route_geometry_on_request() {
        let (router, [a, b, _]) = triangle();
        let router = router.with_route_geometry(true);
        let result = router.distance(b, a);

        let points = result.route_points.unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], (b.y(), b.x()));
        assert_eq!(points[2], (a.y(), a.x()));
    }

    #[test]
    fn unreachable_nodes_fall_back_to_geodesic() {
        let mut graph = DiGraph::new();
        let a = Point::new(-92.0, 34.0);
        let b = Point::new(-92.0, 34.01);
        graph.add_node(RoadNode { id: 1, geometry: a });
        graph.add_node(RoadNode { id: 2, geometry: b });
        let router = router(RoadGraph::new(graph, Vec::new()));

        let result = router.distance(a, b);
        assert!(!result.route_found);
        assert_eq!(router.search_count(), 1);

        // the miss is cached as well
        router.distance(a, b);
        assert_eq!(router.search_count(), 1);
    }

    #[test]
    fn without_graph_only_geodesic() {
        let router = Router::new(None, Arc::new(DistanceCache::in_memory()));
        let result = router.distance(Point::new(-92.0, 34.0), Point::new(-92.0, 35.0));

        assert_eq!(result, DistanceResult::geodesic(result.geodesic_miles));
        assert!(result.geodesic_miles > 68.0);
        assert!(router.cache().is_empty());
        assert!(matches!(
            router.snap(&Point::new(-92.0, 34.0)),
            Err(Error::NoRoadData)
        ));
    }

    #[test]
    fn non_finite_coordinates_degrade_without_panicking() {
        let (router, a, _) = two_node_router();
        let invalid = [
            Point::new(f64::NAN, f64::NAN),
            Point::new(-92.0, f64::NAN),
            Point::new(f64::INFINITY, 34.0),
            Point::new(-92.0, f64::NEG_INFINITY),
        ];

        for point in invalid {
            assert!(matches!(router.snap(&point), Err(Error::InvalidData(_))));

            for result in [router.distance(point, a), router.distance(a, point)] {
                assert!(!result.route_found);
                assert_eq!(result.method, DistanceMethod::Geodesic);
                assert!(result.geodesic_miles.is_nan());
                assert_eq!(result.road_miles, None);
            }
        }

        let results = router.distance_batch(a, &invalid);
        assert!(results.iter().all(|result| !result.route_found));
        assert_eq!(router.search_count(), 0);
        assert!(router.cache().is_empty());
    }

    #[test]
    fn route_geometry_per_call() {
        let (router, [a, b, _]) = triangle();

        let plain = router.distance(b, a);
        assert!(plain.route_points.is_none());
        assert_eq!(router.search_count(), 1);

        // cached without geometry, so it is routed again
        let detailed = router.distance_with_route(b, a, true);
        assert_eq!(detailed.route_points.as_ref().map(Vec::len), Some(3));
        assert_eq!(detailed.road_miles, plain.road_miles);
        assert_eq!(router.search_count(), 2);

        // geometry is now cached but not returned unless asked for
        assert!(router.distance(b, a).route_points.is_none());
        assert!(router.distance_with_route(b, a, true).route_points.is_some());
        assert_eq!(router.search_count(), 2);
    }

    #[test]
    fn batch_preserves_order() {
        let (router, [a, b, c]) = triangle();
        let results = router.distance_batch(a, &[b, c, a]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], router.distance(a, b));
        assert_eq!(results[1], router.distance(a, c));
        assert_eq!(results[2].road_miles, Some(0.0));
    }
}
