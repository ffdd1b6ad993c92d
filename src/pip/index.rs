//! Bounding-box pre-filter for region lookups.

use geo::BoundingRect;
use tracing::{info, warn};

use crate::models::{BoundingBox, Region, RegionGeometry};

/// Conservative km per degree of latitude; smaller than the true ~111 km
/// so padded boxes err on the large side.
const KM_PER_DEGREE: f64 = 110.0;

/// Box for one region, keyed by its position in the dataset
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry {
    pub region: usize,
    pub bbox: BoundingBox,
    /// Box used for filtering. Equals `bbox` except for point-only regions,
    /// which match within a radius and get padded by it.
    search: BoundingBox,
}

/// Flat, dataset-ordered list of region bounding boxes.
///
/// Datasets hold tens to low hundreds of regions, so a linear scan over
/// boxes is enough; this is a pre-filter, not a tree.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxIndex {
    entries: Vec<IndexEntry>,
}

impl BoundingBoxIndex {
    pub fn build(regions: &[Region], point_radius_km: f64) -> Self {
        let entries: Vec<IndexEntry> = regions
            .iter()
            .enumerate()
            .filter_map(|(region, r)| {
                let Some(bbox) = bounding_box(&r.geometry) else {
                    // Still reachable through the nearest-centroid fallback
                    warn!("Region {} has no coordinates, left out of the index", r.name);
                    return None;
                };
                let search = match r.geometry {
                    RegionGeometry::Point(_) => pad_km(bbox, point_radius_km),
                    _ => bbox,
                };
                Some(IndexEntry {
                    region,
                    bbox,
                    search,
                })
            })
            .collect();

        info!("Bounding-box index built with {} entries", entries.len());

        Self { entries }
    }

    /// Regions whose box contains the point, in dataset order.
    ///
    /// Box containment is necessary but not sufficient for membership.
    pub fn candidates(&self, lng: f64, lat: f64) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.search.contains(lng, lat))
            .map(|e| e.region)
    }

    pub fn get(&self, region: usize) -> Option<&BoundingBox> {
        // Entries are built in dataset order
        self.entries
            .binary_search_by_key(&region, |e| e.region)
            .ok()
            .map(|i| &self.entries[i].bbox)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Envelope over every coordinate of every ring, holes included.
///
/// `None` only for geometry without coordinates.
pub fn bounding_box(geometry: &RegionGeometry) -> Option<BoundingBox> {
    match geometry {
        RegionGeometry::Point(p) => Some(p.bounding_rect().into()),
        RegionGeometry::Polygon(poly) => poly.bounding_rect().map(BoundingBox::from),
        RegionGeometry::MultiPolygon(mp) => mp.bounding_rect().map(BoundingBox::from),
    }
}

/// Grow a box by `km` in every direction.
fn pad_km(bbox: BoundingBox, km: f64) -> BoundingBox {
    let dlat = km / KM_PER_DEGREE;
    let widest = bbox.min_lat.abs().max(bbox.max_lat.abs()) + dlat;
    let dlng = dlat / widest.to_radians().cos().max(0.01);
    BoundingBox {
        min_lng: bbox.min_lng - dlng,
        min_lat: bbox.min_lat - dlat,
        max_lng: bbox.max_lng + dlng,
        max_lat: bbox.max_lat + dlat,
    }
}
