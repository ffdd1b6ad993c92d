//! Point-in-Polygon (PIP) barangay lookup.
//!
//! Loads boundary polygons once, pre-filters by bounding box, runs an exact
//! ray-casting test, and falls back to the nearest region centroid.

mod boundary;
mod geometry;
mod index;
mod nearest;
mod service;

pub use boundary::{load_boundaries, parse_boundaries, BoundaryDataset};
pub use geometry::{centroid, polygon_contains, region_contains, ring_contains};
pub use index::{bounding_box, BoundingBoxIndex, IndexEntry};
pub use nearest::{fallback_confidence, haversine_km, CentroidTable, Nearest};
pub use service::Geocoder;
