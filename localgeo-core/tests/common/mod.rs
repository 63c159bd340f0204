#![allow(dead_code)]

use geo::Point;
use localgeo_core::{Extract, ExtractHandler};

pub const REGION: &str = "smallville";

/// (id, lon, lat) of every road vertex
pub const VERTICES: [(i64, f64, f64); 5] = [
    (1, -92.300, 34.750),
    (2, -92.290, 34.750),
    (3, -92.280, 34.750),
    (4, -92.290, 34.760),
    (5, -92.280, 34.760),
];

pub fn vertex(id: i64) -> Point<f64> {
    let (_, lon, lat) = VERTICES[usize::try_from(id - 1).unwrap()];
    Point::new(lon, lat)
}

/// A small town:
///
/// ```text
///        4 --Elm St (one-way)--> 5
///        |                       |
///     Oak Ave                Cedar Rd
///        |                       |
/// 1 ---- 2 ------ Main St ------ 3
/// ```
pub fn town() -> Extract {
    let mut handler = ExtractHandler::new();
    for (id, lon, lat) in VERTICES {
        handler.node(id, lat, lon, []);
    }

    handler.node(
        100,
        34.7501,
        -92.2901,
        [
            ("addr:housenumber", "210"),
            ("addr:street", "Main Street"),
            ("addr:city", "Smallville"),
            ("addr:state", "AR"),
            ("addr:postcode", "72201"),
        ],
    );
    handler.node(101, 34.7505, -92.2995, [("name", "Riverside Clinic"), ("amenity", "clinic")]);

    handler.way(
        200,
        [1, 2, 3],
        [("highway", "residential"), ("name", "Main Street")],
    );
    handler.way(201, [2, 4], [("highway", "residential"), ("name", "Oak Avenue")]);
    handler.way(
        202,
        [4, 5],
        [("highway", "residential"), ("name", "Elm Street"), ("oneway", "yes")],
    );
    handler.way(
        203,
        [3, 5],
        [("highway", "tertiary"), ("name", "Cedar Road"), ("maxspeed", "30 mph")],
    );
    handler.way(204, [1, 4], [("highway", "footway"), ("name", "Mill Trail")]);

    let mut extract = handler.finish();
    extract.regions.push(REGION.to_string());
    extract
}
