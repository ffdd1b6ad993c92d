//! Geocoder facade: validation, lazy initialization, and lookup orchestration.

use std::time::Instant;

use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use super::boundary::{load_boundaries, BoundaryDataset};
use super::geometry::region_contains;
use super::index::BoundingBoxIndex;
use super::nearest::{fallback_confidence, CentroidTable};
use crate::config::GeocoderConfig;
use crate::error::{GeocodeError, Result};
use crate::models::{
    Confidence, DatasetMetadata, MatchMethod, MatchResult, QueryPoint, Region, RegionSummary,
};

/// Everything built from the dataset. Immutable once constructed.
struct BoundaryState {
    regions: Vec<Region>,
    index: BoundingBoxIndex,
    centroids: CentroidTable,
    metadata: DatasetMetadata,
}

impl BoundaryState {
    fn build(dataset: BoundaryDataset, point_radius_km: f64) -> Self {
        let index = BoundingBoxIndex::build(&dataset.regions, point_radius_km);
        let centroids = CentroidTable::build(&dataset.regions);
        let metadata = DatasetMetadata {
            path: dataset.path,
            region_count: dataset.regions.len(),
            loaded_at: Utc::now(),
            file: dataset.metadata,
        };

        Self {
            regions: dataset.regions,
            index,
            centroids,
            metadata,
        }
    }
}

/// Boundary geocoder.
///
/// The dataset is loaded at most once, either by [`Geocoder::initialize`] or
/// by the first [`Geocoder::locate`]. Callers racing the first load block
/// until it finishes. After that every call reads shared immutable data, so
/// a `Geocoder` can sit behind an `Arc` and serve any number of threads.
///
/// A failed load is not cached; the next call tries again.
pub struct Geocoder {
    config: GeocoderConfig,
    state: OnceCell<BoundaryState>,
}

impl Geocoder {
    pub fn new(config: GeocoderConfig) -> Self {
        Self {
            config,
            state: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Load the dataset and build the index. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        self.ensure_initialized().map(|_| ())
    }

    fn ensure_initialized(&self) -> Result<&BoundaryState> {
        self.state.get_or_try_init(|| {
            let start = Instant::now();
            info!("Initializing barangay geocoder...");

            let dataset = load_boundaries(&self.config.dataset_paths).inspect_err(|e| {
                tracing::error!("Failed to initialize geocoder: {}", e);
            })?;

            if dataset.regions.is_empty() {
                return Err(GeocodeError::malformed(
                    &dataset.path,
                    "feature collection has no features",
                ));
            }
            if dataset.regions.len() < self.config.min_expected_regions {
                warn!(
                    "Very limited boundary data: {} regions (expected at least {})",
                    dataset.regions.len(),
                    self.config.min_expected_regions
                );
            }
            if let Some(quality) = dataset.metadata.as_ref().and_then(|m| m.quality.as_deref()) {
                info!("Data quality: {}", quality);
            }

            let state = BoundaryState::build(dataset, self.config.point_match_radius_km);
            info!(
                "Geocoder initialized with {} regions in {}ms",
                state.regions.len(),
                start.elapsed().as_millis()
            );
            Ok(state)
        })
    }

    fn ready(&self) -> Result<&BoundaryState> {
        self.state.get().ok_or(GeocodeError::NotInitialized)
    }

    /// Find the region containing (`lat`, `lng`).
    ///
    /// Regions are tested in dataset order and the first containing one
    /// wins with `High` confidence. If none contains the point, the region
    /// with the nearest centroid is returned as `Medium` or `Low`.
    pub fn locate(&self, lat: f64, lng: f64) -> Result<MatchResult> {
        let point = QueryPoint::new(lat, lng);
        if !point.is_valid() {
            return Err(GeocodeError::InvalidCoordinates { lat, lng });
        }

        if !self.config.coverage.contains(lat, lng) {
            warn!(
                "Coordinates ({}, {}) appear to be outside the expected coverage area",
                lat, lng
            );
        }

        let state = self.ensure_initialized()?;

        let mut candidates = 0usize;
        for i in state.index.candidates(lng, lat) {
            candidates += 1;
            let region = &state.regions[i];
            if region_contains(&region.geometry, point, self.config.point_match_radius_km) {
                debug!(
                    "({}, {}) -> {} (polygon match, {} candidates tested)",
                    lat, lng, region.name, candidates
                );
                return Ok(build_result(
                    region,
                    point,
                    Confidence::High,
                    MatchMethod::PolygonMatch,
                    None,
                ));
            }
        }

        debug!(
            "No polygon match among {} candidates, falling back to nearest centroid",
            candidates
        );

        let nearest = state.centroids.nearest(point).ok_or_else(|| {
            GeocodeError::malformed(&state.metadata.path, "dataset has no usable regions")
        })?;
        let region = &state.regions[nearest.region];
        let confidence = fallback_confidence(nearest.distance_km, self.config.medium_confidence_km);

        debug!(
            "({}, {}) -> {} (nearest neighbor, {:.3} km)",
            lat, lng, region.name, nearest.distance_km
        );

        Ok(build_result(
            region,
            point,
            confidence,
            MatchMethod::NearestNeighbor,
            Some(nearest.distance_km),
        ))
    }

    /// All region names, sorted. Duplicates are kept.
    pub fn list_region_names(&self) -> Result<Vec<String>> {
        let state = self.ready()?;
        let mut names: Vec<String> = state.regions.iter().map(|r| r.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    /// Names and labels of all regions in dataset order
    pub fn list_regions(&self) -> Result<Vec<RegionSummary>> {
        let state = self.ready()?;
        Ok(state
            .regions
            .iter()
            .map(|r| RegionSummary {
                name: r.name.clone(),
                labels: r.labels.clone(),
            })
            .collect())
    }

    pub fn metadata(&self) -> Result<DatasetMetadata> {
        Ok(self.ready()?.metadata.clone())
    }
}

fn build_result(
    region: &Region,
    point: QueryPoint,
    confidence: Confidence,
    method: MatchMethod,
    distance_km: Option<f64>,
) -> MatchResult {
    MatchResult {
        region_name: region.name.clone(),
        parent_labels: region.labels.clone(),
        confidence,
        method,
        distance_km,
        geometry_type: region.geometry.kind(),
        query_point: point,
    }
}
