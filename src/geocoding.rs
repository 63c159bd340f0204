use localgeo_core::prelude::*;
use pyo3::prelude::*;
#[cfg(feature = "stubgen")]
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

/// Result of a successful geocoding query
#[cfg_attr(feature = "stubgen", gen_stub_pyclass)]
#[pyclass(name = "GeocodeResult", frozen)]
pub struct PyGeocodeResult {
    inner: GeocodeResult,
}

impl From<GeocodeResult> for PyGeocodeResult {
    fn from(inner: GeocodeResult) -> Self {
        Self { inner }
    }
}

#[cfg_attr(feature = "stubgen", gen_stub_pymethods)]
#[pymethods]
impl PyGeocodeResult {
    #[getter]
    fn latitude(&self) -> f64 {
        self.inner.latitude
    }

    #[getter]
    fn longitude(&self) -> f64 {
        self.inner.longitude
    }

    /// Heuristic confidence of the matching tier, between 0 and 1
    #[getter]
    fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    /// ``exact``, ``interpolated`` or ``approximate``
    #[getter]
    fn match_type(&self) -> &'static str {
        self.inner.match_type.as_str()
    }

    /// ``address``, ``building`` or ``street``
    #[getter]
    fn source(&self) -> &'static str {
        self.inner.source.as_str()
    }

    #[getter]
    fn matched_address(&self) -> String {
        self.inner.matched_address.clone()
    }

    /// OSM element of the match, e.g. ``way/123``
    #[getter]
    fn source_id(&self) -> Option<String> {
        self.inner.source_id.map(|id| id.to_string())
    }

    /// Get the coordinates as (lat, lon)
    #[getter]
    fn coordinates(&self) -> (f64, f64) {
        (self.inner.latitude, self.inner.longitude)
    }

    fn __repr__(&self) -> String {
        format!(
            "GeocodeResult(lat={}, lon={}, match_type='{}', confidence={})",
            self.inner.latitude,
            self.inner.longitude,
            self.inner.match_type,
            self.inner.confidence
        )
    }
}

/// Split a free-text US address into components
///
/// Returns a tuple ``(house_number, street, city, state, zip)``; components
/// that cannot be recognized are None.
#[cfg_attr(feature = "stubgen", gen_stub_pyfunction)]
#[pyfunction(name = "parse_address")]
pub fn py_parse_address(
    address: &str,
) -> (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
) {
    let ParsedAddress {
        house_number,
        street,
        city,
        state,
        zip,
    } = parse_address(address);
    (house_number, street, city, state, zip)
}
