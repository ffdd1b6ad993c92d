//! Boundary dataset loading from GeoJSON-style feature collections.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::{GeocodeError, Result};
use crate::models::{FileMetadata, ParentLabels, Region, RegionGeometry};

/// Property keys that may hold the region name, in priority order
const NAME_KEYS: &[&str] = &["name", "BRGY_NAME", "Name"];

/// Regions parsed from a boundary file, in file order
#[derive(Debug, Clone)]
pub struct BoundaryDataset {
    pub path: PathBuf,
    pub regions: Vec<Region>,
    pub metadata: Option<FileMetadata>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    collection_type: Option<String>,
    features: Vec<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: RawGeometry,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point {
        coordinates: Vec<f64>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
}

/// Load the first boundary file that exists among `candidates`.
///
/// Loading is all-or-nothing: one bad feature fails the whole dataset.
pub fn load_boundaries(candidates: &[PathBuf]) -> Result<BoundaryDataset> {
    let path = match candidates.iter().find(|p| p.exists()) {
        Some(p) => p,
        None => {
            error!("Boundary data not found at any of these paths:");
            for p in candidates {
                error!("  - {}", p.display());
            }
            return Err(GeocodeError::DatasetNotFound {
                searched: candidates.to_vec(),
            });
        }
    };

    info!("Loading boundary data from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => GeocodeError::DatasetNotFound {
            searched: vec![path.clone()],
        },
        _ => GeocodeError::malformed(path, format!("unreadable: {}", e)),
    })?;

    let dataset = parse_boundaries(path, &content)?;
    info!("Loaded {} boundary features", dataset.regions.len());
    Ok(dataset)
}

/// Parse boundary file contents. `path` is only used for error reporting.
pub fn parse_boundaries(path: &Path, content: &str) -> Result<BoundaryDataset> {
    let raw: RawCollection = serde_json::from_str(content)
        .map_err(|e| GeocodeError::malformed(path, format!("not a feature collection: {}", e)))?;

    if let Some(t) = raw.collection_type.as_deref() {
        if t != "FeatureCollection" {
            return Err(GeocodeError::malformed(
                path,
                format!("expected FeatureCollection, found {}", t),
            ));
        }
    }

    let mut regions = Vec::with_capacity(raw.features.len());
    for (i, value) in raw.features.into_iter().enumerate() {
        let region = parse_feature(value)
            .map_err(|reason| GeocodeError::malformed(path, format!("feature {}: {}", i, reason)))?;
        regions.push(region);
    }

    // The metadata block is informational; an odd one is dropped, not fatal
    let metadata = raw.metadata.and_then(|v| match serde_json::from_value(v) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("Ignoring unreadable dataset metadata: {}", e);
            None
        }
    });

    Ok(BoundaryDataset {
        path: path.to_path_buf(),
        regions,
        metadata,
    })
}

fn parse_feature(value: Value) -> std::result::Result<Region, String> {
    let feature: RawFeature = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let props = feature.properties.unwrap_or_default();

    let name = NAME_KEYS
        .iter()
        .find_map(|key| string_prop(&props, key))
        .ok_or_else(|| "missing region name".to_string())?;

    let labels = ParentLabels {
        city: string_prop(&props, "city"),
        province: string_prop(&props, "province"),
        region: string_prop(&props, "region"),
        district: string_prop(&props, "district"),
        source: string_prop(&props, "source"),
    };

    let geometry = match feature.geometry {
        RawGeometry::Point { coordinates } => {
            RegionGeometry::Point(Point::from(position(&coordinates)?))
        }
        RawGeometry::Polygon { coordinates } => RegionGeometry::Polygon(polygon(&coordinates)?),
        RawGeometry::MultiPolygon { coordinates } => {
            if coordinates.is_empty() {
                return Err("MultiPolygon has no polygons".to_string());
            }
            let polygons = coordinates
                .iter()
                .map(|p| polygon(p))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            RegionGeometry::MultiPolygon(MultiPolygon::new(polygons))
        }
    };

    debug!("Parsed {} ({})", name, geometry.kind());

    Ok(Region {
        name,
        labels,
        geometry,
    })
}

fn string_prop(props: &Map<String, Value>, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn position(pos: &[f64]) -> std::result::Result<Coord<f64>, String> {
    // A third ordinate (elevation) is allowed and ignored
    match pos {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok(Coord { x: *lng, y: *lat }),
        [_, _, ..] => Err(format!("non-finite position {:?}", pos)),
        _ => Err(format!("position needs [lng, lat], got {:?}", pos)),
    }
}

fn ring(raw: &[Vec<f64>]) -> std::result::Result<LineString<f64>, String> {
    let mut coords = raw
        .iter()
        .map(|p| position(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    let distinct = coords
        .iter()
        .map(|c| (c.x.to_bits(), c.y.to_bits()))
        .collect::<HashSet<_>>()
        .len();
    if distinct < 3 {
        return Err(format!(
            "ring has {} distinct vertices, need at least 3",
            distinct
        ));
    }

    Ok(LineString::new(coords))
}

fn polygon(raw: &[Vec<Vec<f64>>]) -> std::result::Result<Polygon<f64>, String> {
    let (exterior, holes) = raw
        .split_first()
        .ok_or_else(|| "Polygon has no rings".to_string())?;

    let exterior = ring(exterior)?;
    let interiors = holes
        .iter()
        .map(|h| ring(h))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}
