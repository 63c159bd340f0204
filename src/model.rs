use std::path::PathBuf;

use localgeo_core::prelude::*;
use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::geocoding::PyGeocodeResult;
use crate::routing::PyDistanceResult;

/// GeoModel
///
/// Geocoder and road router built from the same set of OpenStreetMap
/// extracts. All queries run locally; nothing is fetched over the network.
///
/// Example:
///
/// .. code-block:: python
///
///     model = create_geo_model(["arkansas"], data_dir="data/osm_extracts")
///     home = model.geocode("500 Woodlane St, Little Rock, AR 72201")
///     result = model.distance(home.latitude, home.longitude, 34.7465, -92.2896)
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "GeoModel")]
pub struct PyGeoModel {
    pub(crate) model: GeoModel,
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyGeoModel {
    /// Geocode one free-text address. Returns None when nothing matches.
    ///
    /// Raises
    /// ------
    /// RuntimeError
    ///     If no address or street data was loaded
    pub fn geocode(&self, py: Python<'_>, address: &str) -> PyResult<Option<PyGeocodeResult>> {
        let result = py
            .detach(|| self.model.geocode(address))
            .map_err(to_py_err)?;
        Ok(result.map(PyGeocodeResult::from))
    }

    /// Geocode many addresses in parallel, preserving order
    pub fn geocode_batch(
        &self,
        py: Python<'_>,
        addresses: Vec<String>,
    ) -> PyResult<Vec<Option<PyGeocodeResult>>> {
        let results = py
            .detach(|| self.model.geocoder.geocode_batch(&addresses))
            .map_err(to_py_err)?;
        Ok(results
            .into_iter()
            .map(|result| result.map(PyGeocodeResult::from))
            .collect())
    }

    /// Road distance between two coordinates, geodesic when no route exists
    ///
    /// Parameters
    /// ----------
    /// include_route : bool, optional
    ///     Return the route node coordinates. Defaults to the model setting.
    #[pyo3(signature = (origin_lat, origin_lon, destination_lat, destination_lon, include_route = None))]
    pub fn distance(
        &self,
        py: Python<'_>,
        origin_lat: f64,
        origin_lon: f64,
        destination_lat: f64,
        destination_lon: f64,
        include_route: Option<bool>,
    ) -> PyDistanceResult {
        let origin = geo::Point::new(origin_lon, origin_lat);
        let destination = geo::Point::new(destination_lon, destination_lat);
        py.detach(|| match include_route {
            Some(include_route) => {
                self.model
                    .router
                    .distance_with_route(origin, destination, include_route)
            }
            None => self.model.distance(origin, destination),
        })
        .into()
    }

    /// Distances from one origin to many (lat, lon) destinations.
    /// The distance cache is saved afterwards.
    pub fn distance_batch(
        &self,
        py: Python<'_>,
        origin_lat: f64,
        origin_lon: f64,
        destinations: Vec<(f64, f64)>,
    ) -> Vec<PyDistanceResult> {
        let origin = geo::Point::new(origin_lon, origin_lat);
        let destinations: Vec<geo::Point<f64>> = destinations
            .into_iter()
            .map(|(lat, lon)| geo::Point::new(lon, lat))
            .collect();

        py.detach(|| self.model.router.distance_batch(origin, &destinations))
            .into_iter()
            .map(PyDistanceResult::from)
            .collect()
    }

    /// Write the distance cache to disk. Returns the number of entries.
    pub fn save_cache(&self, py: Python<'_>) -> PyResult<usize> {
        py.detach(|| self.model.router.save_cache()).map_err(to_py_err)
    }

    pub fn address_count(&self) -> usize {
        self.model.geocoder.address_count()
    }

    pub fn street_count(&self) -> usize {
        self.model.geocoder.street_count()
    }

    pub fn building_count(&self) -> usize {
        self.model.geocoder.building_count()
    }

    pub fn road_node_count(&self) -> usize {
        self.model.router.graph().map_or(0, RoadGraph::node_count)
    }

    pub fn road_edge_count(&self) -> usize {
        self.model.router.graph().map_or(0, RoadGraph::edge_count)
    }

    pub fn cached_distance_count(&self) -> usize {
        self.model.router.cache().len()
    }

    fn __repr__(&self) -> String {
        format!("GeoModel({})", self.model.info())
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Create a geocoding and routing model from regional OSM extracts
///
/// Parameters
/// ----------
/// regions : list[str]
///     Region names; each is read from ``<data_dir>/<region>-latest.osm.pbf``.
///     Missing files are skipped with a warning.
/// data_dir : str, optional
///     Directory holding the extracts, ``data/osm_extracts`` by default
/// cache_path : str, optional
///     File used to persist computed road distances
/// max_snap_distance_miles : float, default=1.0
///     Query points farther than this from every road are not routed
/// include_route : bool, default=False
///     Keep the node coordinates of found routes
/// graph_cache_dir : str, optional
///     Directory where the built road graph is saved per region set and
///     restored from on the next load
///
/// Returns
/// -------
/// GeoModel
///
/// Raises
/// ------
/// ValueError
///     If no regions are given
/// RuntimeError
///     If the data directory is missing or an extract cannot be read
///
/// Notes
/// -----
/// The function releases the GIL while loading.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction(name = "create_geo_model")]
#[pyo3(signature = (regions, data_dir = None, cache_path = None, max_snap_distance_miles = 1.0, include_route = false, graph_cache_dir = None))]
pub fn py_create_geo_model(
    py: Python<'_>,
    regions: Vec<String>,
    data_dir: Option<PathBuf>,
    cache_path: Option<PathBuf>,
    max_snap_distance_miles: f64,
    include_route: bool,
    graph_cache_dir: Option<PathBuf>,
) -> PyResult<PyGeoModel> {
    py.detach(|| {
        let defaults = LoadConfig::default();
        let config = LoadConfig {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            regions,
            cache_path,
            max_snap_distance_miles,
            include_route,
            graph_cache_dir,
        };

        let model = localgeo_core::create_geo_model(&config).map_err(to_py_err)?;
        Ok(PyGeoModel { model })
    })
}

pub(crate) fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::InvalidData(_) => PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string()),
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(err.to_string()),
    }
}
