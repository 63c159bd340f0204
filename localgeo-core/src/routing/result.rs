use geo::{Coord, LineString};
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::CachedRoute;
use crate::{Error, Miles, Minutes};

/// How a distance was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMethod {
    /// Straight line on the WGS84 ellipsoid
    Geodesic,
    /// Shortest path over the road graph
    RoadNetwork,
}

impl DistanceMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMethod::Geodesic => "geodesic",
            DistanceMethod::RoadNetwork => "road_network",
        }
    }
}

/// Distance between two coordinates. The geodesic distance is always
/// present; road fields are filled only when a route was found.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceResult {
    pub geodesic_miles: Miles,
    pub road_miles: Option<Miles>,
    pub travel_minutes: Option<Minutes>,
    pub route_found: bool,
    pub method: DistanceMethod,
    /// Route node coordinates as (lat, lon), when requested
    pub route_points: Option<Vec<(f64, f64)>>,
}

impl DistanceResult {
    pub fn geodesic(geodesic_miles: Miles) -> Self {
        Self {
            geodesic_miles,
            road_miles: None,
            travel_minutes: None,
            route_found: false,
            method: DistanceMethod::Geodesic,
            route_points: None,
        }
    }

    pub fn from_cached(geodesic_miles: Miles, cached: CachedRoute) -> Self {
        Self {
            geodesic_miles,
            road_miles: cached.road_miles,
            travel_minutes: cached.travel_minutes,
            route_found: cached.route_found,
            method: cached.method,
            route_points: cached.route_points,
        }
    }

    pub(crate) fn to_cached(&self) -> CachedRoute {
        CachedRoute {
            road_miles: self.road_miles,
            travel_minutes: self.travel_minutes,
            route_found: self.route_found,
            method: self.method,
            route_points: self.route_points.clone(),
        }
    }

    /// Road distance when available, geodesic otherwise
    pub fn best_miles(&self) -> Miles {
        self.road_miles.unwrap_or(self.geodesic_miles)
    }

    /// Converts the result to a `GeoJSON` `Feature`. The geometry is the route
    /// line when route points were collected and `null` otherwise.
    pub fn to_geojson(&self) -> Result<Feature, Error> {
        let geometry = self
            .route_points
            .as_ref()
            .filter(|points| points.len() > 1)
            .map(|points| {
                let coords: Vec<Coord<f64>> = points
                    .iter()
                    .map(|&(lat, lon)| Coord { x: lon, y: lat })
                    .collect();
                Geometry::new(GeoJsonValue::from(&LineString::new(coords)))
            });

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "geodesic_miles": self.geodesic_miles,
                "road_miles": self.road_miles,
                "travel_minutes": self.travel_minutes,
                "route_found": self.route_found,
                "method": self.method.as_str(),
            }
        });

        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
