use pyo3::prelude::*;

use geocoding::{PyGeocodeResult, py_parse_address};
use model::{PyGeoModel, py_create_geo_model};
use routing::PyDistanceResult;

pub mod geocoding;
pub mod model;
pub mod routing;

/// Offline geocoding and road distances over OpenStreetMap extracts.
#[pymodule]
fn localgeo(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyGeoModel>()?;
    m.add_function(wrap_pyfunction!(py_create_geo_model, m)?)?;

    m.add_class::<PyGeocodeResult>()?;
    m.add_function(wrap_pyfunction!(py_parse_address, m)?)?;

    m.add_class::<PyDistanceResult>()?;
    Ok(())
}

#[cfg(feature = "stubgen")]
pyo3_stub_gen::define_stub_info_gatherer!(stub_info);
