//! Interpretation of OSM tags. Nothing here outlives a single element.

use geo::Point;

use crate::address::{normalize_street, state_code};
use crate::model::{AddressRecord, OsmId, Oneway};
use crate::KMH_TO_MPH;

/// Tags of the element currently being processed
pub(super) struct Tags<'a>(Vec<(&'a str, &'a str)>);

impl<'a> Tags<'a> {
    pub(super) fn new(tags: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(tags.into_iter().collect())
    }

    pub(super) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(super) fn get(&self, key: &str) -> Option<&'a str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Non-blank `name` tag
    pub(super) fn name(&self) -> Option<&'a str> {
        self.get("name").filter(|name| !name.trim().is_empty())
    }

    pub(super) fn is_building(&self) -> bool {
        self.get("building").is_some_and(|value| value != "no")
    }
}

/// `addr:*` tags of one element
#[derive(Debug, Default)]
pub(super) struct AddressTags {
    housenumber: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl AddressTags {
    /// `None` when the element carries no address key at all
    pub(super) fn from_tags(tags: &Tags<'_>) -> Option<Self> {
        let value = |key: &str| {
            tags.get(key)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let address = Self {
            housenumber: value("addr:housenumber").map(str::to_uppercase),
            street: value("addr:street")
                .map(normalize_street)
                .filter(|street| !street.is_empty()),
            city: value("addr:city").map(str::to_uppercase),
            state: value("addr:state").map(|state| {
                let state = state.to_uppercase();
                state_code(&state).map_or(state, str::to_string)
            }),
            postcode: value("addr:postcode").map(str::to_string),
        };

        let any = address.housenumber.is_some()
            || address.street.is_some()
            || address.city.is_some()
            || address.state.is_some()
            || address.postcode.is_some();
        any.then_some(address)
    }

    pub(super) fn into_record(self, geometry: Point<f64>, source_id: OsmId) -> AddressRecord {
        AddressRecord {
            house_number: self.housenumber,
            street: self.street,
            city: self.city,
            state: self.state,
            zip: self.postcode,
            geometry,
            source_id,
        }
    }
}

/// Parse a `maxspeed` value into mph.
/// Supports `NN`, `NN mph` and `NN km/h`; anything else is `None`.
pub(super) fn parse_speed_mph(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, factor) = if let Some(mph) = value.strip_suffix("mph") {
        (mph, 1.0)
    } else if let Some(kmh) = value.strip_suffix("km/h") {
        (kmh, KMH_TO_MPH)
    } else {
        (value, 1.0)
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|speed| speed.is_finite() && *speed > 0.0)
        .map(|speed| speed * factor)
}

pub(super) fn parse_oneway(value: Option<&str>) -> Oneway {
    match value {
        Some("yes" | "true" | "1") => Oneway::Forward,
        Some("-1" | "reverse") => Oneway::Reverse,
        _ => Oneway::No,
    }
}

pub(super) fn parse_lanes(value: Option<&str>) -> u8 {
    value
        .and_then(|lanes| lanes.trim().parse::<u8>().ok())
        .filter(|lanes| *lanes > 0)
        .unwrap_or(1)
}
