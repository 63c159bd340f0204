mod common;

use common::vertex;
use geo::Point;
use localgeo_core::model::streets::geodesic_miles;
use localgeo_core::{DistanceMethod, LoadConfig, build_road_graph, geo_model_from_extract};

fn model() -> localgeo_core::GeoModel {
    geo_model_from_extract(common::town(), &LoadConfig::default())
}

#[test]
fn road_graph_of_the_town() {
    let extract = common::town();
    let graph = build_road_graph(&extract.streets, extract.regions.clone()).unwrap();

    // the footway contributes nothing
    assert_eq!(graph.node_count(), 5);
    // Main 2x2, Oak 2, Elm 1 (one-way), Cedar 2
    assert_eq!(graph.edge_count(), 9);
    assert_eq!(graph.fingerprint(), "regions=smallville;nodes=5;edges=9");
}

#[test]
fn distance_along_main_street() {
    let model = model();
    let result = model.distance(vertex(1), vertex(3));

    assert!(result.route_found);
    assert_eq!(result.method, DistanceMethod::RoadNetwork);
    let expected = geodesic_miles(vertex(1), vertex(2)) + geodesic_miles(vertex(2), vertex(3));
    assert!((result.road_miles.unwrap() - expected).abs() < 1e-9);
    // residential default of 25 mph
    assert!((result.travel_minutes.unwrap() - expected / 25.0 * 60.0).abs() < 1e-9);
}

#[test]
fn oneway_street_makes_trips_asymmetric() {
    let model = model();
    let with_flow = model.distance(vertex(4), vertex(5)).road_miles.unwrap();
    let against_flow = model.distance(vertex(5), vertex(4)).road_miles.unwrap();

    assert!((with_flow - geodesic_miles(vertex(4), vertex(5))).abs() < 1e-9);
    let detour = geodesic_miles(vertex(5), vertex(3))
        + geodesic_miles(vertex(3), vertex(2))
        + geodesic_miles(vertex(2), vertex(4));
    assert!((against_flow - detour).abs() < 1e-9);
}

#[test]
fn two_way_trips_are_symmetric() {
    let model = model();
    let there = model.distance(vertex(1), vertex(4));
    let back = model.distance(vertex(4), vertex(1));

    assert!((there.geodesic_miles - back.geodesic_miles).abs() < 1e-9);
    assert!((there.road_miles.unwrap() - back.road_miles.unwrap()).abs() < 1e-9);
}

#[test]
fn points_off_the_network_get_geodesic_distance() {
    let model = model();
    // about five miles north of the town
    let remote = Point::new(-92.29, 34.8325);
    let result = model.distance(vertex(1), remote);

    assert!(!result.route_found);
    assert_eq!(result.method, DistanceMethod::Geodesic);
    assert!(result.geodesic_miles > 5.0);
    assert_eq!(model.router.search_count(), 0);
}

#[test]
fn geocode_then_route() {
    let model = model();
    let (geocoded, distance) = model
        .geocode_and_distance("210 Main St, Smallville, AR", vertex(5))
        .unwrap()
        .expect("address should match");

    assert!((geocoded.latitude - 34.7501).abs() < 1e-9);
    assert!(distance.route_found);
    assert!(distance.road_miles.unwrap() >= distance.geodesic_miles);
}

#[test]
fn route_geometry_as_geojson() {
    let config = LoadConfig {
        include_route: true,
        ..LoadConfig::default()
    };
    let model = geo_model_from_extract(common::town(), &config);
    let result = model.distance(vertex(1), vertex(5));

    let points = result.route_points.clone().unwrap();
    assert_eq!(points.first(), Some(&(34.750, -92.300)));
    assert_eq!(points.last(), Some(&(34.760, -92.280)));

    let geojson = result.to_geojson_string().unwrap();
    assert!(geojson.contains("LineString"));
    assert!(geojson.contains("road_network"));
}
