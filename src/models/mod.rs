//! Core data models for the boundary geocoder.

pub mod metadata;
pub mod region;
pub mod result;

pub use metadata::{DatasetMetadata, FileMetadata, RegionSummary};
pub use region::{BoundingBox, GeometryKind, ParentLabels, Region, RegionGeometry};
pub use result::{Confidence, MatchMethod, MatchResult, QueryPoint};
