//! Boundary region types.

use geo::{MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Kind of geometry a region was loaded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Polygon,
    MultiPolygon,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "Point"),
            GeometryKind::Polygon => write!(f, "Polygon"),
            GeometryKind::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}

/// Region geometry in (lng, lat) order.
///
/// Polygon rings follow GeoJSON: the exterior ring first, holes after.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    /// Legacy point-only entry, matched by distance rather than containment
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl RegionGeometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            RegionGeometry::Point(_) => GeometryKind::Point,
            RegionGeometry::Polygon(_) => GeometryKind::Polygon,
            RegionGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }
}

/// Administrative labels carried through verbatim for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Provenance of this feature (e.g. "arcgis", "enhanced_fallback")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A named boundary, e.g. a barangay.
///
/// Names are not guaranteed unique; when two regions match, the one loaded
/// first wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub labels: ParentLabels,
    pub geometry: RegionGeometry,
}

/// Axis-aligned envelope of a region's geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_lng: rect.min().x,
            min_lat: rect.min().y,
            max_lng: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

impl BoundingBox {
    /// Inclusive on every edge.
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }
}
