//! Records extracted from OSM data.
//!
//! Raw tag maps never leave the ingestion boundary; everything downstream
//! works with these fixed structs.

use std::fmt;

use geo::{Centroid, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::OsmNodeId;

/// Identifier of the OSM element a record was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsmId {
    Node(i64),
    Way(i64),
}

impl OsmId {
    /// Numeric id without the element type
    pub fn raw(self) -> i64 {
        match self {
            OsmId::Node(id) | OsmId::Way(id) => id,
        }
    }
}

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsmId::Node(id) => write!(f, "node/{id}"),
            OsmId::Way(id) => write!(f, "way/{id}"),
        }
    }
}

/// Addressable point: a tagged node or the centroid of a tagged building
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub house_number: Option<String>,
    /// Street name, normalized with [`crate::address::normalize_street`]
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub geometry: Point<f64>,
    pub source_id: OsmId,
}

impl AddressRecord {
    pub fn latitude(&self) -> f64 {
        self.geometry.y()
    }

    pub fn longitude(&self) -> f64 {
        self.geometry.x()
    }
}

/// Named point of interest used as a secondary matching source
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    /// Upper-cased name
    pub name: String,
    pub geometry: Point<f64>,
    pub source_id: OsmId,
}

impl BuildingRecord {
    pub fn latitude(&self) -> f64 {
        self.geometry.y()
    }

    pub fn longitude(&self) -> f64 {
        self.geometry.x()
    }
}

/// OSM `highway` classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Unclassified,
    Residential,
    Service,
    MotorwayLink,
    TrunkLink,
    PrimaryLink,
    SecondaryLink,
    TertiaryLink,
    /// Any other highway value (footway, track, ...). Not routable.
    Other,
}

impl RoadClass {
    pub fn from_tag(value: &str) -> Self {
        match value {
            "motorway" => RoadClass::Motorway,
            "trunk" => RoadClass::Trunk,
            "primary" => RoadClass::Primary,
            "secondary" => RoadClass::Secondary,
            "tertiary" => RoadClass::Tertiary,
            "unclassified" => RoadClass::Unclassified,
            "residential" => RoadClass::Residential,
            "service" => RoadClass::Service,
            "motorway_link" => RoadClass::MotorwayLink,
            "trunk_link" => RoadClass::TrunkLink,
            "primary_link" => RoadClass::PrimaryLink,
            "secondary_link" => RoadClass::SecondaryLink,
            "tertiary_link" => RoadClass::TertiaryLink,
            _ => RoadClass::Other,
        }
    }

    pub fn is_routable(self) -> bool {
        self != RoadClass::Other
    }

    /// Assumed speed when a way carries no usable `maxspeed`
    pub fn default_speed_mph(self) -> f64 {
        match self {
            RoadClass::Motorway => 70.0,
            RoadClass::Trunk => 55.0,
            RoadClass::Primary | RoadClass::MotorwayLink => 45.0,
            RoadClass::Secondary | RoadClass::TrunkLink => 35.0,
            RoadClass::Tertiary | RoadClass::PrimaryLink => 30.0,
            RoadClass::Unclassified
            | RoadClass::Residential
            | RoadClass::SecondaryLink
            | RoadClass::Other => 25.0,
            RoadClass::TertiaryLink => 20.0,
            RoadClass::Service => 15.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::Trunk => "trunk",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Unclassified => "unclassified",
            RoadClass::Residential => "residential",
            RoadClass::Service => "service",
            RoadClass::MotorwayLink => "motorway_link",
            RoadClass::TrunkLink => "trunk_link",
            RoadClass::PrimaryLink => "primary_link",
            RoadClass::SecondaryLink => "secondary_link",
            RoadClass::TertiaryLink => "tertiary_link",
            RoadClass::Other => "other",
        }
    }
}

/// Direction restriction of a way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oneway {
    #[default]
    No,
    /// Traversable only in the order of the way's nodes
    Forward,
    /// `oneway=-1`: traversable only against the node order
    Reverse,
}

/// One OSM highway way
///
/// Many records may share a name when a street is split into several ways.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetRecord {
    /// Normalized name, empty for unnamed ways
    pub name: String,
    pub road_class: RoadClass,
    /// Vertices as (longitude, latitude)
    pub geometry: LineString<f64>,
    /// OSM node id of every vertex in `geometry`
    pub node_ids: Vec<OsmNodeId>,
    /// Parsed posted speed limit
    pub max_speed_mph: Option<f64>,
    pub oneway: Oneway,
    pub lanes: u8,
    pub source_id: OsmId,
}

impl StreetRecord {
    /// Effective speed used for travel time estimates
    pub fn speed_mph(&self) -> f64 {
        self.max_speed_mph
            .unwrap_or_else(|| self.road_class.default_speed_mph())
    }

    /// Length-weighted centroid of the vertex sequence
    pub fn centroid(&self) -> Option<Point<f64>> {
        self.geometry.centroid()
    }
}

/// Flat collections produced by ingesting one or more extracts
#[derive(Debug, Clone, Default)]
pub struct Extract {
    pub addresses: Vec<AddressRecord>,
    pub streets: Vec<StreetRecord>,
    pub buildings: Vec<BuildingRecord>,
    /// Regions the records were read from, in load order
    pub regions: Vec<String>,
}

impl Extract {
    /// Concatenate another extract. Overlapping records are kept as duplicates.
    pub fn append(&mut self, mut other: Extract) {
        self.addresses.append(&mut other.addresses);
        self.streets.append(&mut other.streets);
        self.buildings.append(&mut other.buildings);
        self.regions.append(&mut other.regions);
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.streets.is_empty() && self.buildings.is_empty()
    }
}
