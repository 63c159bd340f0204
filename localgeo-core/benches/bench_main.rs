use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use geo::Point;
use localgeo_core::{Extract, ExtractHandler, LoadConfig, geo_model_from_extract};

const GRID: i64 = 60;
const STEP: f64 = 0.002;

fn node_id(row: i64, col: i64) -> i64 {
    row * GRID + col + 1
}

/// Street grid with one address per intersection
fn grid_extract() -> Extract {
    let mut handler = ExtractHandler::new();
    for row in 0..GRID {
        for col in 0..GRID {
            let (lat, lon) = (34.7 + row as f64 * STEP, -92.4 + col as f64 * STEP);
            handler.node(node_id(row, col), lat, lon, []);
        }
    }

    let mut address_id = GRID * GRID + 1;
    for row in 0..GRID {
        let name = format!("Row {row} Street");
        let refs: Vec<i64> = (0..GRID).map(|col| node_id(row, col)).collect();
        handler.way(row, refs, [("highway", "residential"), ("name", name.as_str())]);

        for col in 0..GRID {
            let number = (col * 10).to_string();
            let (lat, lon) = (34.7 + row as f64 * STEP, -92.4 + col as f64 * STEP + 0.0001);
            handler.node(
                address_id,
                lat,
                lon,
                [("addr:housenumber", number.as_str()), ("addr:street", name.as_str())],
            );
            address_id += 1;
        }
    }
    for col in 0..GRID {
        let name = format!("Column {col} Avenue");
        let refs: Vec<i64> = (0..GRID).map(|row| node_id(row, col)).collect();
        handler.way(GRID + col, refs, [("highway", "tertiary"), ("name", name.as_str())]);
    }

    let mut extract = handler.finish();
    extract.regions.push("grid".to_string());
    extract
}

fn bench_routing(c: &mut Criterion) {
    let model = geo_model_from_extract(grid_extract(), &LoadConfig::default());
    let graph = model.router.graph().expect("grid has roads");
    let query = Point::new(-92.3317, 34.7621);

    c.bench_function("nearest_node", |b| {
        b.iter(|| graph.nearest_node(black_box(&query)));
    });

    let origin = Point::new(-92.4, 34.7);
    let destination = Point::new(-92.4 + (GRID - 1) as f64 * STEP, 34.7 + (GRID - 1) as f64 * STEP);
    c.bench_function("shortest_path_corner_to_corner", |b| {
        b.iter(|| {
            let start = graph.nearest_node(&origin).map(|(idx, _)| idx);
            let target = graph.nearest_node(&destination).map(|(idx, _)| idx);
            localgeo_core::routing::dijkstra::shortest_path(
                graph,
                black_box(start.expect("snapped")),
                black_box(target.expect("snapped")),
            )
        });
    });

    c.bench_function("cached_distance", |b| {
        b.iter(|| model.distance(black_box(origin), black_box(destination)));
    });
}

fn bench_geocoding(c: &mut Criterion) {
    let model = geo_model_from_extract(grid_extract(), &LoadConfig::default());

    c.bench_function("geocode_exact", |b| {
        b.iter(|| model.geocode(black_box("250 Row 42 Street, Little Rock, AR")));
    });

    c.bench_function("geocode_street_fallback", |b| {
        b.iter(|| model.geocode(black_box("7 Column 12 Ave")));
    });

    let batch: Vec<String> = (0..GRID)
        .map(|row| format!("{} Row {row} St", (row % 50) * 10))
        .collect();
    c.bench_function("geocode_batch", |b| {
        b.iter(|| model.geocoder.geocode_batch(black_box(&batch)));
    });
}

criterion_group!(benches, bench_routing, bench_geocoding);
criterion_main!(benches);
