use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No address or street data loaded")]
    NotReady,
    #[error("No road network data found")]
    NoRoadData,
    #[error("No road node within snapping distance")]
    NoNearbyRoad,
    #[error("No path between the road nodes")]
    NoPath,
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Distance cache corrupt: {0}")]
    CacheCorrupt(String),
    #[error("Road graph snapshot unusable: {0}")]
    SnapshotCorrupt(String),
    #[error("OSM error: {0}")]
    OsmError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl From<osmpbf::Error> for Error {
    fn from(err: osmpbf::Error) -> Self {
        Error::OsmError(err.to_string())
    }
}
