//! Road graph with a spatial index for snapping query points

use geo::{Distance, Geodesic, Haversine, Point};
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use super::{RoadEdge, RoadNode};
use crate::{METERS_PER_MILE, Miles, OsmNodeId};

/// R-tree entry: node position on the unit sphere plus its graph index
///
/// Euclidean (chord) distance between unit vectors grows monotonically with
/// great-circle distance, so the nearest entry in the tree is also the
/// nearest node on the sphere.
pub type IndexedPoint = GeomWithData<[f64; 3], NodeIndex>;

/// Directed road multigraph
#[derive(Debug, Clone)]
pub struct RoadGraph {
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    rtree: RTree<IndexedPoint>,
    node_lookup: HashMap<OsmNodeId, NodeIndex>,
    regions: Vec<String>,
}

impl RoadGraph {
    pub fn new(graph: DiGraph<RoadNode, RoadEdge>, regions: Vec<String>) -> Self {
        let points = graph
            .node_indices()
            .map(|idx| IndexedPoint::new(unit_vector(&graph[idx].geometry), idx))
            .collect();
        let node_lookup = graph
            .node_indices()
            .map(|idx| (graph[idx].id, idx))
            .collect();

        Self {
            graph,
            rtree: RTree::bulk_load(points),
            node_lookup,
            regions,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(idx)
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<&RoadEdge> {
        self.graph.edge_weight(idx)
    }

    /// Graph index of an OSM node
    pub fn node_index(&self, id: OsmNodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Outgoing edges of a node, parallel edges included
    pub fn edges(&self, node: NodeIndex) -> petgraph::graph::Edges<'_, RoadEdge, petgraph::Directed> {
        self.graph.edges(node)
    }

    /// Identifies the loaded network. Distance cache entries computed on one
    /// network are not valid on another.
    pub fn fingerprint(&self) -> String {
        format!(
            "regions={};nodes={};edges={}",
            self.regions.join(","),
            self.node_count(),
            self.edge_count()
        )
    }

    /// Nearest node to `point` and its geodesic distance in miles.
    /// `None` for an empty graph or a non-finite coordinate.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, Miles)> {
        if !is_finite(point) {
            return None;
        }
        let nearest = self.rtree.nearest_neighbor(&unit_vector(point))?;
        let node = &self.graph[nearest.data];
        Some((nearest.data, geodesic_miles(*point, node.geometry)))
    }

    /// Linear scan equivalent of [`RoadGraph::nearest_node`]
    pub fn nearest_node_exhaustive(&self, point: &Point<f64>) -> Option<(NodeIndex, Miles)> {
        if !is_finite(point) {
            return None;
        }
        self.graph
            .node_indices()
            .map(|idx| (idx, Haversine.distance(*point, self.graph[idx].geometry)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| (idx, geodesic_miles(*point, self.graph[idx].geometry)))
    }
}

/// Geodesic (WGS84 ellipsoid) distance in miles
pub fn geodesic_miles(a: Point<f64>, b: Point<f64>) -> Miles {
    Geodesic.distance(a, b) / METERS_PER_MILE
}

/// Whether both coordinates are finite numbers
pub fn is_finite(point: &Point<f64>) -> bool {
    point.x().is_finite() && point.y().is_finite()
}

fn unit_vector(point: &Point<f64>) -> [f64; 3] {
    let lat = point.y().to_radians();
    let lon = point.x().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::RoadClass;

    fn grid_graph() -> RoadGraph {
        let mut graph = DiGraph::new();
        let mut id = 0;
        for row in 0..20 {
            for col in 0..20 {
                id += 1;
                graph.add_node(RoadNode {
                    id,
                    geometry: Point::new(-92.3 + f64::from(col) * 0.003, 34.7 + f64::from(row) * 0.002),
                });
            }
        }
        RoadGraph::new(graph, vec!["test".to_string()])
    }

    #[test]
    fn indexed_lookup_matches_linear_scan() {
        let graph = grid_graph();
        let queries = [
            Point::new(-92.2991, 34.7013),
            Point::new(-92.2555, 34.7299),
            Point::new(-92.31, 34.69),
            Point::new(-92.2417, 34.7381),
            Point::new(-92.2800, 34.7200),
        ];

        for query in queries {
            let (indexed, indexed_miles) = graph.nearest_node(&query).unwrap();
            let (scanned, scanned_miles) = graph.nearest_node_exhaustive(&query).unwrap();
            assert_eq!(indexed, scanned, "query {query:?}");
            assert!((indexed_miles - scanned_miles).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_graph_has_no_nearest_node() {
        let graph = RoadGraph::new(DiGraph::new(), Vec::new());
        assert!(graph.nearest_node(&Point::new(0.0, 0.0)).is_none());
        assert!(graph.nearest_node_exhaustive(&Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn non_finite_queries_have_no_nearest_node() {
        let graph = grid_graph();
        for query in [
            Point::new(f64::NAN, f64::NAN),
            Point::new(-92.3, f64::NAN),
            Point::new(f64::INFINITY, 34.7),
            Point::new(-92.3, f64::NEG_INFINITY),
        ] {
            assert!(graph.nearest_node(&query).is_none(), "query {query:?}");
            assert!(graph.nearest_node_exhaustive(&query).is_none(), "query {query:?}");
        }
    }

    #[test]
    fn fingerprint_reflects_network_size() {
        let mut graph = DiGraph::new();
        let a = graph.add_node(RoadNode { id: 1, geometry: Point::new(0.0, 0.0) });
        let b = graph.add_node(RoadNode { id: 2, geometry: Point::new(0.0, 0.01) });
        graph.add_edge(a, b, RoadEdge {
            length_miles: 0.69,
            travel_time_minutes: 1.0,
            speed_mph: 25.0,
            road_class: RoadClass::Residential,
            name: Arc::from("A"),
            way_id: 1,
        });
        let graph = RoadGraph::new(graph, vec!["arkansas".into(), "tennessee".into()]);

        assert_eq!(graph.fingerprint(), "regions=arkansas,tennessee;nodes=2;edges=1");
        assert_eq!(graph.node_index(2), Some(b));
    }
}
