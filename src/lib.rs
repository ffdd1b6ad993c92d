//! Barangay geocoder - offline boundary lookup for coordinates.
//!
//! This library provides the boundary-search engine used by the query binary.

pub mod config;
pub mod error;
pub mod maplink;
pub mod models;
pub mod pip;

pub use config::{CoverageBounds, GeocoderConfig};
pub use error::{GeocodeError, Result};
pub use models::{Confidence, MatchMethod, MatchResult, QueryPoint};
pub use pip::Geocoder;
