//! File discovery and track ID generation

mod scanner;

pub use scanner::{generate_track_id, scan, DiscoveredFile};
