use std::time::Instant;

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;

use super::result::{GeocodeResult, MatchSource, MatchType};
use crate::Error;
use crate::address::{ParsedAddress, clean_tokens, parse_address};
use crate::model::{AddressRecord, BuildingRecord, Extract, StreetRecord};

const EXACT_CONFIDENCE: f64 = 0.95;
const BUILDING_CONFIDENCE: f64 = 0.7;
const INTERPOLATED_CONFIDENCE: f64 = 0.6;
const STREET_CONFIDENCE: f64 = 0.4;

/// Words of this many characters or fewer are too common for partial matching
const MIN_PARTIAL_WORD_CHARS: usize = 3;

/// Resolves free-text addresses against the ingested records.
///
/// Matching strategies are tried from most to least precise and the first
/// hit wins:
/// 1. exact house number and street on an address point
/// 2. a word of the query inside a building or place name
/// 3. numeric house number on a street whose name contains the query street
/// 4. a word of the query street inside a street name
#[derive(Debug, Default)]
pub struct Geocoder {
    addresses: Vec<AddressRecord>,
    streets: Vec<StreetRecord>,
    buildings: Vec<BuildingRecord>,
    /// (house number, street) -> first address with that pair
    exact_index: HashMap<(String, String), usize>,
}

impl Geocoder {
    /// Takes ownership of the records of `extract`. Unnamed streets cannot
    /// be matched by name and are not kept.
    pub fn new(extract: Extract) -> Self {
        let Extract {
            addresses,
            streets,
            buildings,
            ..
        } = extract;

        let streets: Vec<StreetRecord> = streets
            .into_iter()
            .filter(|street| !street.name.is_empty())
            .collect();

        let mut exact_index = HashMap::with_capacity(addresses.len());
        for (idx, address) in addresses.iter().enumerate() {
            if let (Some(house_number), Some(street)) = (&address.house_number, &address.street) {
                exact_index
                    .entry((house_number.clone(), street.clone()))
                    .or_insert(idx);
            }
        }

        debug!(
            "Geocoder indexed {} addresses ({} distinct exact keys), {} named streets, {} buildings",
            addresses.len(),
            exact_index.len(),
            streets.len(),
            buildings.len()
        );

        Self {
            addresses,
            streets,
            buildings,
            exact_index,
        }
    }

    /// Whether any address or street data is available
    pub fn is_ready(&self) -> bool {
        !self.addresses.is_empty() || !self.streets.is_empty()
    }

    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// Geocode a single address. `Ok(None)` means no strategy matched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no address or street data was loaded
    pub fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, Error> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }
        Ok(self.resolve(address))
    }

    /// Geocode many addresses in parallel. The output is in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no address or street data was loaded
    pub fn geocode_batch<S>(&self, addresses: &[S]) -> Result<Vec<Option<GeocodeResult>>, Error>
    where
        S: AsRef<str> + Sync,
    {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }

        let start = Instant::now();
        let results: Vec<Option<GeocodeResult>> = addresses
            .par_iter()
            .map(|address| self.resolve(address.as_ref()))
            .collect();

        let stats = BatchStats::collect(&results);
        info!(
            "Geocoded {}/{} addresses in {:.2}s (exact: {}, building: {}, interpolated: {}, street: {})",
            stats.matched(),
            results.len(),
            start.elapsed().as_secs_f32(),
            stats.exact,
            stats.building,
            stats.interpolated,
            stats.street
        );
        Ok(results)
    }

    fn resolve(&self, raw: &str) -> Option<GeocodeResult> {
        let parsed = parse_address(raw);
        if parsed.is_empty() {
            return None;
        }

        self.match_exact(&parsed)
            .or_else(|| self.match_building(raw))
            .or_else(|| self.match_street_interpolated(&parsed))
            .or_else(|| self.match_street_centroid(&parsed))
    }

    fn match_exact(&self, parsed: &ParsedAddress) -> Option<GeocodeResult> {
        let key = (parsed.house_number.clone()?, parsed.street.clone()?);
        let address = &self.addresses[*self.exact_index.get(&key)?];

        Some(GeocodeResult {
            latitude: address.latitude(),
            longitude: address.longitude(),
            confidence: EXACT_CONFIDENCE,
            match_type: MatchType::Exact,
            source: MatchSource::Address,
            matched_address: format!("{} {}", key.0, key.1),
            source_id: Some(address.source_id),
        })
    }

    fn match_building(&self, raw: &str) -> Option<GeocodeResult> {
        if self.buildings.is_empty() {
            return None;
        }

        clean_tokens(raw)
            .iter()
            .filter(|word| word.chars().count() > MIN_PARTIAL_WORD_CHARS)
            .find_map(|word| {
                self.buildings
                    .iter()
                    .find(|building| building.name.contains(word.as_str()))
            })
            .map(|building| GeocodeResult {
                latitude: building.latitude(),
                longitude: building.longitude(),
                confidence: BUILDING_CONFIDENCE,
                match_type: MatchType::Approximate,
                source: MatchSource::Building,
                matched_address: building.name.clone(),
                source_id: Some(building.source_id),
            })
    }

    fn match_street_interpolated(&self, parsed: &ParsedAddress) -> Option<GeocodeResult> {
        let house_number = parsed.house_number.as_deref()?;
        let street = parsed.street.as_deref()?;
        house_number.parse::<u32>().ok()?;

        let (record, centroid) = self.street_containing(street)?;
        Some(street_result(
            record,
            centroid,
            INTERPOLATED_CONFIDENCE,
            MatchType::Interpolated,
            format!("{house_number} {street}"),
        ))
    }

    fn match_street_centroid(&self, parsed: &ParsedAddress) -> Option<GeocodeResult> {
        let street = parsed.street.as_deref()?;

        street
            .split_whitespace()
            .filter(|word| word.chars().count() > MIN_PARTIAL_WORD_CHARS)
            .find_map(|word| self.street_containing(word))
            .map(|(record, centroid)| {
                street_result(
                    record,
                    centroid,
                    STREET_CONFIDENCE,
                    MatchType::Approximate,
                    record.name.clone(),
                )
            })
    }

    /// First street (in load order) whose name contains `needle`
    fn street_containing(&self, needle: &str) -> Option<(&StreetRecord, Point<f64>)> {
        self.streets
            .iter()
            .filter(|street| street.name.contains(needle))
            .find_map(|street| street.centroid().map(|centroid| (street, centroid)))
    }
}

fn street_result(
    record: &StreetRecord,
    centroid: Point<f64>,
    confidence: f64,
    match_type: MatchType,
    matched_address: String,
) -> GeocodeResult {
    GeocodeResult {
        latitude: centroid.y(),
        longitude: centroid.x(),
        confidence,
        match_type,
        source: MatchSource::Street,
        matched_address,
        source_id: Some(record.source_id),
    }
}

#[derive(Debug, Default)]
struct BatchStats {
    exact: usize,
    building: usize,
    interpolated: usize,
    street: usize,
}

impl BatchStats {
    fn collect(results: &[Option<GeocodeResult>]) -> Self {
        let mut stats = Self::default();
        for result in results.iter().flatten() {
            match (result.source, result.match_type) {
                (MatchSource::Address, _) => stats.exact += 1,
                (MatchSource::Building, _) => stats.building += 1,
                (MatchSource::Street, MatchType::Interpolated) => stats.interpolated += 1,
                (MatchSource::Street, _) => stats.street += 1,
            }
        }
        stats
    }

    fn matched(&self) -> usize {
        self.exact + self.building + self.interpolated + self.street
    }
}
