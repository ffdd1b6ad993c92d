//! Centroid-distance fallback for points outside every region.

use geo::{Distance, Haversine, Point};

use super::geometry::centroid;
use crate::models::{Confidence, QueryPoint, Region};

/// Great-circle distance in kilometres.
pub fn haversine_km(a: QueryPoint, b: QueryPoint) -> f64 {
    Haversine.distance(Point::new(a.lng, a.lat), Point::new(b.lng, b.lat)) / 1000.0
}

/// Closest region to a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub region: usize,
    pub distance_km: f64,
}

/// Precomputed centroid per region, in dataset order
#[derive(Debug, Clone, Default)]
pub struct CentroidTable {
    centroids: Vec<Option<QueryPoint>>,
}

impl CentroidTable {
    pub fn build(regions: &[Region]) -> Self {
        let centroids = regions
            .iter()
            .map(|r| centroid(&r.geometry).map(|c| QueryPoint::new(c.y(), c.x())))
            .collect();
        Self { centroids }
    }

    pub fn get(&self, region: usize) -> Option<QueryPoint> {
        self.centroids.get(region).copied().flatten()
    }

    /// Linear scan for the minimum-distance centroid.
    ///
    /// Ties go to the region loaded first. `None` only for an empty dataset.
    pub fn nearest(&self, point: QueryPoint) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for (region, c) in self.centroids.iter().enumerate() {
            let Some(c) = c else { continue };
            let distance_km = haversine_km(point, *c);
            if best.map_or(true, |b| distance_km < b.distance_km) {
                best = Some(Nearest {
                    region,
                    distance_km,
                });
            }
        }
        best
    }
}

/// `Medium` below the cutoff, `Low` otherwise. Never `High`.
pub fn fallback_confidence(distance_km: f64, medium_cutoff_km: f64) -> Confidence {
    if distance_km < medium_cutoff_km {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ParentLabels, RegionGeometry};
    use geo::polygon;

    fn square(name: &str, x0: f64, y0: f64) -> Region {
        Region {
            name: name.to_string(),
            labels: ParentLabels::default(),
            geometry: RegionGeometry::Polygon(polygon![
                (x: x0, y: y0), (x: x0 + 1.0, y: y0), (x: x0 + 1.0, y: y0 + 1.0), (x: x0, y: y0 + 1.0)
            ]),
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km
        let d = haversine_km(QueryPoint::new(0.0, 0.0), QueryPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.1, "{}", d);
        assert_eq!(
            haversine_km(QueryPoint::new(7.07, 125.6), QueryPoint::new(7.07, 125.6)),
            0.0
        );
    }

    #[test]
    fn test_nearest_picks_minimum_centroid() {
        let regions = vec![square("A", 0.0, 0.0), square("B", 2.0, 0.0), square("C", 10.0, 10.0)];
        let table = CentroidTable::build(&regions);

        let hit = table.nearest(QueryPoint::new(0.5, 2.2)).unwrap();
        assert_eq!(hit.region, 1);

        let hit = table.nearest(QueryPoint::new(9.0, 9.0)).unwrap();
        assert_eq!(hit.region, 2);
    }

    #[test]
    fn test_tie_goes_to_first_region() {
        // Duplicate boundaries share a centroid
        let regions = vec![square("C", 10.0, 10.0), square("A", 0.0, 0.0), square("A", 0.0, 0.0)];
        let table = CentroidTable::build(&regions);
        let hit = table.nearest(QueryPoint::new(0.5, 1.5)).unwrap();
        assert_eq!(hit.region, 1);
    }

    #[test]
    fn test_empty_table_has_no_nearest() {
        let table = CentroidTable::build(&[]);
        assert!(table.nearest(QueryPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(fallback_confidence(0.2, 0.5), Confidence::Medium);
        assert_eq!(fallback_confidence(0.5, 0.5), Confidence::Low);
        assert_eq!(fallback_confidence(40.0, 0.5), Confidence::Low);
    }
}
