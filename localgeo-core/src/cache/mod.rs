//! Persistent cache of road distances between coordinate pairs
//!
//! Entries are keyed by origin and destination rounded to six decimal
//! places and scoped to the road network they were computed on. The cache
//! file is plain JSON, written through a temporary file and renamed into
//! place.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::routing::DistanceMethod;
use crate::{Error, Miles, Minutes};

/// Bumped whenever the layout of [`CachedRoute`] changes
const CACHE_FORMAT_VERSION: u32 = 1;

/// Scale of the coordinate quantization (six decimal places)
const COORDINATE_SCALE: f64 = 1e6;

/// Quantized (origin, destination) pair, each as `[lat, lon]` in micro-degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    origin: [i64; 2],
    destination: [i64; 2],
}

impl CacheKey {
    pub fn new(origin: Point<f64>, destination: Point<f64>) -> Self {
        Self {
            origin: quantize(origin),
            destination: quantize(destination),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn quantize(point: Point<f64>) -> [i64; 2] {
    [
        (point.y() * COORDINATE_SCALE).round() as i64,
        (point.x() * COORDINATE_SCALE).round() as i64,
    ]
}

/// Road-derived part of a distance result. The geodesic distance is cheap
/// and always recomputed, so it is not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRoute {
    pub road_miles: Option<Miles>,
    pub travel_minutes: Option<Minutes>,
    pub route_found: bool,
    pub method: DistanceMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_points: Option<Vec<(f64, f64)>>,
}

impl CachedRoute {
    /// Entry recording that no road route exists for the pair
    pub fn not_found() -> Self {
        Self {
            road_miles: None,
            travel_minutes: None,
            route_found: false,
            method: DistanceMethod::Geodesic,
            route_points: None,
        }
    }
}

#[derive(Deserialize)]
struct CacheFile {
    version: u32,
    fingerprint: Option<String>,
    entries: Vec<(CacheKey, CachedRoute)>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    version: u32,
    fingerprint: Option<&'a str>,
    entries: Vec<(&'a CacheKey, &'a CachedRoute)>,
}

#[derive(Debug, Default)]
struct CacheState {
    fingerprint: Option<String>,
    entries: HashMap<CacheKey, CachedRoute>,
    dirty: bool,
}

/// Distance cache shared between routing threads
///
/// Lookups take a read lock, insertions and [`DistanceCache::save`] take the
/// write lock. Unsaved entries are flushed when the cache is dropped.
#[derive(Debug, Default)]
pub struct DistanceCache {
    path: Option<PathBuf>,
    state: RwLock<CacheState>,
}

impl DistanceCache {
    /// Cache that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the cache file at `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty cache that will
    /// replace the file on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match read_cache_file(&path) {
            Ok(Some(state)) => {
                info!(
                    "Loaded {} cached distances from {}",
                    state.entries.len(),
                    path.display()
                );
                state
            }
            Ok(None) => {
                info!("No distance cache at {}, starting empty", path.display());
                CacheState::default()
            }
            Err(err) => {
                warn!("{err}; starting with an empty cache");
                CacheState::default()
            }
        };

        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedRoute> {
        self.read().entries.get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, route: CachedRoute) {
        let mut state = self.write();
        state.entries.insert(key, route);
        state.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Road network the entries belong to
    pub fn fingerprint(&self) -> Option<String> {
        self.read().fingerprint.clone()
    }

    /// Bind the cache to a road network. Entries computed on a different
    /// network are discarded.
    pub fn rescope(&self, fingerprint: &str) {
        let mut state = self.write();
        if state.fingerprint.as_deref() == Some(fingerprint) {
            return;
        }

        let discarded = state.entries.len();
        if discarded > 0 {
            warn!(
                "Distance cache was built for another road network ({}), discarding {discarded} entries",
                state.fingerprint.as_deref().unwrap_or("unknown"),
            );
            state.entries.clear();
        }

        // Binding a fresh, empty cache leaves nothing to write
        let previous = state.fingerprint.replace(fingerprint.to_string());
        if previous.is_some() || discarded > 0 {
            state.dirty = true;
        }
    }

    /// Write all entries to the cache file. The write lock is held for the
    /// duration of the write. Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save(&self) -> Result<usize, Error> {
        let Some(path) = &self.path else {
            return Ok(0);
        };

        let mut state = self.write();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = CacheFileRef {
            version: CACHE_FORMAT_VERSION,
            fingerprint: state.fingerprint.as_deref(),
            entries: state.entries.iter().collect(),
        };
        let tmp_path = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer(&mut writer, &contents).map_err(io::Error::from)?;
        writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        fs::rename(&tmp_path, path)?;

        let count = state.entries.len();
        state.dirty = false;
        debug!("Saved {count} cached distances to {}", path.display());
        Ok(count)
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DistanceCache {
    fn drop(&mut self) {
        let dirty = self
            .state
            .get_mut()
            .map_or_else(|poisoned| poisoned.into_inner().dirty, |state| state.dirty);
        if dirty && self.path.is_some() {
            if let Err(err) = self.save() {
                warn!("Failed to flush distance cache: {err}");
            }
        }
    }
}

/// `Ok(None)` when the file does not exist
fn read_cache_file(path: &Path) -> Result<Option<CacheState>, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::CacheCorrupt(format!("{}: {err}", path.display())));
        }
    };

    let contents: CacheFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::CacheCorrupt(format!("{}: {err}", path.display())))?;
    if contents.version != CACHE_FORMAT_VERSION {
        return Err(Error::CacheCorrupt(format!(
            "{}: format version {} (expected {CACHE_FORMAT_VERSION})",
            path.display(),
            contents.version
        )));
    }

    Ok(Some(CacheState {
        fingerprint: contents.fingerprint,
        entries: contents.entries.into_iter().collect(),
        dirty: false,
    }))
}
