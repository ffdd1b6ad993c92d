use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeocodeError, Result};

/// Default dataset locations, tried in order.
const DEFAULT_DATASET_PATHS: &[&str] = &[
    "geo-data/davao-barangays.geojson",
    "geo-data/davao-barangays-enhanced.json",
    "geo-data/davao-barangays-arcgis.geojson",
];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Candidate boundary files; the first one that exists is loaded.
    pub dataset_paths: Vec<PathBuf>,
    pub coverage: CoverageBounds,
    /// Radius within which a Point-only region counts as containing the query.
    pub point_match_radius_km: f64,
    /// Nearest-neighbor matches closer than this are `Medium`, the rest `Low`.
    pub medium_confidence_km: f64,
    /// Fewer regions than this logs a limited-data warning.
    pub min_expected_regions: usize,
}

/// Expected metropolitan extent. Queries outside it are logged, never rejected.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CoverageBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Default for CoverageBounds {
    // Davao City
    fn default() -> Self {
        Self {
            min_lat: 6.8,
            max_lat: 7.4,
            min_lng: 125.2,
            max_lng: 125.8,
        }
    }
}

impl CoverageBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            dataset_paths: DEFAULT_DATASET_PATHS.iter().map(PathBuf::from).collect(),
            coverage: CoverageBounds::default(),
            point_match_radius_km: 1.0,
            medium_confidence_km: 0.5,
            min_expected_regions: 10,
        }
    }
}

impl GeocoderConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GeocodeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            GeocodeError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Default settings pointed at a single dataset file.
    pub fn with_dataset<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            dataset_paths: vec![path.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: GeocoderConfig = toml::from_str("").unwrap();
        assert_eq!(config.point_match_radius_km, 1.0);
        assert_eq!(config.medium_confidence_km, 0.5);
        assert_eq!(config.coverage, CoverageBounds::default());
        assert_eq!(config.dataset_paths.len(), DEFAULT_DATASET_PATHS.len());
    }

    #[test]
    fn test_load_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dataset_paths = ["/srv/boundaries.geojson"]
medium_confidence_km = 0.25

[coverage]
min_lat = 14.3
max_lat = 14.8
min_lng = 120.9
max_lng = 121.2
"#
        )
        .unwrap();

        let config = GeocoderConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.dataset_paths,
            vec![PathBuf::from("/srv/boundaries.geojson")]
        );
        assert_eq!(config.medium_confidence_km, 0.25);
        assert_eq!(config.point_match_radius_km, 1.0);
        assert!(config.coverage.contains(14.5, 121.0));
        assert!(!config.coverage.contains(7.0, 125.5));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = GeocoderConfig::load_from_file("/nonexistent/geocoder.toml").unwrap_err();
        assert!(matches!(err, GeocodeError::Config(_)));
    }
}
