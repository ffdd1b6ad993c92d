//! Error types for the geocoding engine.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeocodeError>;

#[derive(Error, Debug)]
pub enum GeocodeError {
    /// None of the candidate dataset paths exist.
    #[error("boundary dataset not found (searched: {})", display_paths(.searched))]
    DatasetNotFound { searched: Vec<PathBuf> },

    /// The dataset exists but is not a usable feature collection.
    #[error("boundary dataset {} is malformed: {reason}", .path.display())]
    DatasetMalformed { path: PathBuf, reason: String },

    /// Query coordinates are non-finite or outside [-90,90] / [-180,180].
    #[error("invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    /// An operation that needs loaded boundaries ran before `initialize()`.
    #[error("geocoder not initialized; call initialize() first")]
    NotInitialized,

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GeocodeError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GeocodeError::DatasetMalformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from loading the dataset (fatal to initialization).
    pub fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            GeocodeError::DatasetNotFound { .. } | GeocodeError::DatasetMalformed { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_path() {
        let err = GeocodeError::DatasetNotFound {
            searched: vec![PathBuf::from("a.geojson"), PathBuf::from("b.json")],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.geojson"));
        assert!(msg.contains("b.json"));
        assert!(err.is_dataset_error());
    }

    #[test]
    fn test_query_errors_are_not_dataset_errors() {
        let err = GeocodeError::InvalidCoordinates { lat: 91.0, lng: 0.0 };
        assert!(!err.is_dataset_error());
        assert!(!GeocodeError::NotInitialized.is_dataset_error());
    }
}
