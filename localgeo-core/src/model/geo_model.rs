use geo::Point;

use crate::{DistanceResult, Error, GeocodeResult, Geocoder, Router};

/// Geocoder and router built from the same set of extracts
#[derive(Debug)]
pub struct GeoModel {
    pub geocoder: Geocoder,
    pub router: Router,
}

impl GeoModel {
    pub fn new(geocoder: Geocoder, router: Router) -> Self {
        Self { geocoder, router }
    }

    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no address or street data was loaded
    pub fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, Error> {
        self.geocoder.geocode(address)
    }

    pub fn distance(&self, origin: Point<f64>, destination: Point<f64>) -> DistanceResult {
        self.router.distance(origin, destination)
    }

    /// Geocode `address` and measure the distance from the result to `target`.
    /// `None` when the address cannot be matched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no address or street data was loaded
    pub fn geocode_and_distance(
        &self,
        address: &str,
        target: Point<f64>,
    ) -> Result<Option<(GeocodeResult, DistanceResult)>, Error> {
        Ok(self.geocoder.geocode(address)?.map(|result| {
            let distance = self.router.distance(result.point(), target);
            (result, distance)
        }))
    }

    pub fn info(&self) -> String {
        let graph = self.router.graph().map_or_else(
            || "no road network".to_string(),
            |graph| format!("{} road nodes, {} road edges", graph.node_count(), graph.edge_count()),
        );
        format!(
            "{} addresses, {} streets, {} buildings, {}, {} cached distances",
            self.geocoder.address_count(),
            self.geocoder.street_count(),
            self.geocoder.building_count(),
            graph,
            self.router.cache().len()
        )
    }
}
