//! Geocoding output types.

use serde::{Deserialize, Serialize};

use super::region::{GeometryKind, ParentLabels};

/// A query coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub lat: f64,
    pub lng: f64,
}

impl QueryPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within [-90, 90] x [-180, 180], bounds inclusive.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// How certain the engine is about a match.
///
/// `High` only ever comes from an exact polygon match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Strategy that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    PolygonMatch,
    NearestNeighbor,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::PolygonMatch => write!(f, "polygon_match"),
            MatchMethod::NearestNeighbor => write!(f, "nearest_neighbor"),
        }
    }
}

/// Result of a single `locate` call. Owned by the caller, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub region_name: String,
    pub parent_labels: ParentLabels,
    pub confidence: Confidence,
    pub method: MatchMethod,
    /// Great-circle distance to the region centroid; nearest-neighbor only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub geometry_type: GeometryKind,
    pub query_point: QueryPoint,
}
