use std::fmt;

use geo::Point;

use crate::model::OsmId;

/// Precision of a geocoding match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// House number and street matched an address point
    Exact,
    /// House number on a matching street, located at the street centroid
    Interpolated,
    /// Partial name match
    Approximate,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Interpolated => "interpolated",
            MatchType::Approximate => "approximate",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record collection a match was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    Address,
    Building,
    Street,
}

impl MatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchSource::Address => "address",
            MatchSource::Building => "building",
            MatchSource::Street => "street",
        }
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    /// Heuristic confidence in `[0, 1]`, fixed per match tier
    pub confidence: f64,
    pub match_type: MatchType,
    pub source: MatchSource,
    /// Text of the record that matched
    pub matched_address: String,
    pub source_id: Option<OsmId>,
}

impl GeocodeResult {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}
