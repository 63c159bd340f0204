use localgeo_core::prelude::*;
use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use crate::model::to_py_err;

/// Distance between two coordinates
///
/// ``geodesic_miles`` is always set. Road fields are None unless a road
/// route was found.
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "DistanceResult", frozen)]
pub struct PyDistanceResult {
    inner: DistanceResult,
}

impl From<DistanceResult> for PyDistanceResult {
    fn from(inner: DistanceResult) -> Self {
        Self { inner }
    }
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyDistanceResult {
    #[getter]
    fn geodesic_miles(&self) -> f64 {
        self.inner.geodesic_miles
    }

    #[getter]
    fn road_miles(&self) -> Option<f64> {
        self.inner.road_miles
    }

    #[getter]
    fn travel_minutes(&self) -> Option<f64> {
        self.inner.travel_minutes
    }

    #[getter]
    fn route_found(&self) -> bool {
        self.inner.route_found
    }

    /// ``road_network`` or ``geodesic``
    #[getter]
    fn method(&self) -> &'static str {
        self.inner.method.as_str()
    }

    /// Route node coordinates as (lat, lon), if requested at model creation
    #[getter]
    fn route_points(&self) -> Option<Vec<(f64, f64)>> {
        self.inner.route_points.clone()
    }

    /// Route as a GeoJSON Feature string
    fn to_geojson(&self) -> PyResult<String> {
        self.inner.to_geojson_string().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        match (self.inner.road_miles, self.inner.travel_minutes) {
            (Some(miles), Some(minutes)) => format!(
                "DistanceResult(road_miles={miles:.2}, travel_minutes={minutes:.1}, geodesic_miles={:.2})",
                self.inner.geodesic_miles
            ),
            _ => format!(
                "DistanceResult(geodesic_miles={:.2}, route_found=False)",
                self.inner.geodesic_miles
            ),
        }
    }
}
