mod shortest_path;
mod state;

pub use shortest_path::{RoadPath, shortest_path};
