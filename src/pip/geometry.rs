//! Exact point-in-region tests.

use geo::{Coord, LineString, Point, Polygon};

use super::nearest::haversine_km;
use crate::models::{QueryPoint, RegionGeometry};

/// Whether `geometry` contains `point`.
///
/// Point-only regions have no area and instead match anything within
/// `point_radius_km` of the stored coordinate.
pub fn region_contains(geometry: &RegionGeometry, point: QueryPoint, point_radius_km: f64) -> bool {
    match geometry {
        RegionGeometry::Point(p) => {
            haversine_km(point, QueryPoint::new(p.y(), p.x())) < point_radius_km
        }
        RegionGeometry::Polygon(poly) => polygon_contains(poly, point.lng, point.lat),
        RegionGeometry::MultiPolygon(mp) => {
            mp.0.iter().any(|poly| polygon_contains(poly, point.lng, point.lat))
        }
    }
}

/// Inside the exterior ring and outside every hole.
pub fn polygon_contains(poly: &Polygon<f64>, lng: f64, lat: f64) -> bool {
    if !ring_contains(poly.exterior(), lng, lat) {
        return false;
    }
    !poly
        .interiors()
        .iter()
        .any(|hole| ring_contains(hole, lng, lat))
}

/// Even-odd ray casting towards +lng.
///
/// Uses the half-open rule `(yi > lat) != (yj > lat)` so a vertex lying
/// exactly on the ray is only counted once.
pub fn ring_contains(ring: &LineString<f64>, lng: f64, lat: f64) -> bool {
    let coords: &[Coord<f64>] = &ring.0;
    let n = coords.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (coords[i].x, coords[i].y);
        let (xj, yj) = (coords[j].x, coords[j].y);
        if (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Mean of the exterior-ring vertices, ignoring holes.
///
/// The closing vertex of a closed ring is not counted twice. Averaging the
/// stored ring as-is would pull the mean toward its first vertex, so
/// nearest-centroid picks between near-equidistant regions can differ from a
/// tool that does. Returns `None` only for an empty geometry.
pub fn centroid(geometry: &RegionGeometry) -> Option<Point<f64>> {
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    let mut add_ring = |ring: &LineString<f64>| {
        for c in open_ring(ring) {
            sum_x += c.x;
            sum_y += c.y;
            count += 1;
        }
    };

    match geometry {
        RegionGeometry::Point(p) => return Some(*p),
        RegionGeometry::Polygon(poly) => add_ring(poly.exterior()),
        RegionGeometry::MultiPolygon(mp) => mp.0.iter().for_each(|poly| add_ring(poly.exterior())),
    }

    if count == 0 {
        return None;
    }
    Some(Point::new(sum_x / count as f64, sum_y / count as f64))
}

fn open_ring(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = &ring.0[..];
    match coords {
        [first, .., last] if first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn unit_square() -> Polygon<f64> {
        polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]
    }

    fn donut() -> Polygon<f64> {
        polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0)]],
        )
    }

    #[test]
    fn test_square_interior_and_exterior() {
        let sq = unit_square();
        for (lng, lat) in [(0.5, 0.5), (0.01, 0.01), (0.99, 0.99), (0.5, 0.99)] {
            assert!(polygon_contains(&sq, lng, lat), "({}, {})", lng, lat);
        }
        for (lng, lat) in [(1.5, 0.5), (-0.1, 0.5), (0.5, 1.01), (0.5, -0.01)] {
            assert!(!polygon_contains(&sq, lng, lat), "({}, {})", lng, lat);
        }
    }

    #[test]
    fn test_vertex_on_ray_counted_once() {
        // Diamond whose side vertices sit exactly on the query latitude
        let diamond = polygon![(x: 0.0, y: -1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: -1.0, y: 0.0)];
        assert!(polygon_contains(&diamond, 0.0, 0.0));
        assert!(!polygon_contains(&diamond, -2.0, 0.0));
        assert!(!polygon_contains(&diamond, 2.0, 0.0));
    }

    #[test]
    fn test_hole_excludes_point() {
        let d = donut();
        assert!(polygon_contains(&d, 2.0, 2.0));
        assert!(!polygon_contains(&d, 5.0, 5.0));
        assert!(polygon_contains(&d, 7.0, 5.0));
    }

    #[test]
    fn test_multipolygon_matches_any_part() {
        let far = polygon![(x: 20.0, y: 0.0), (x: 21.0, y: 0.0), (x: 21.0, y: 1.0), (x: 20.0, y: 1.0)];
        let mp = RegionGeometry::MultiPolygon(MultiPolygon::new(vec![donut(), far]));
        assert!(region_contains(&mp, QueryPoint::new(0.5, 20.5), 1.0));
        assert!(region_contains(&mp, QueryPoint::new(2.0, 2.0), 1.0));
        assert!(!region_contains(&mp, QueryPoint::new(5.0, 5.0), 1.0));
        assert!(!region_contains(&mp, QueryPoint::new(0.5, 15.0), 1.0));
    }

    #[test]
    fn test_point_region_uses_radius() {
        let legacy = RegionGeometry::Point(Point::new(125.6, 7.07));
        // ~0.55 km north
        assert!(region_contains(&legacy, QueryPoint::new(7.075, 125.6), 1.0));
        // ~5.5 km north
        assert!(!region_contains(&legacy, QueryPoint::new(7.12, 125.6), 1.0));
        assert!(!region_contains(&legacy, QueryPoint::new(7.075, 125.6), 0.1));
    }

    #[test]
    fn test_centroid_ignores_holes_and_closing_vertex() {
        let c = centroid(&RegionGeometry::Polygon(donut())).unwrap();
        assert_eq!((c.x(), c.y()), (5.0, 5.0));

        let c = centroid(&RegionGeometry::Polygon(unit_square())).unwrap();
        assert_eq!((c.x(), c.y()), (0.5, 0.5));
    }

    #[test]
    fn test_centroid_not_biased_toward_first_vertex() {
        let triangle = polygon![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 0.0, y: 3.0)];
        assert_eq!(triangle.exterior().0.len(), 4);

        let c = centroid(&RegionGeometry::Polygon(triangle)).unwrap();
        assert_eq!((c.x(), c.y()), (1.0, 1.0));
    }

    #[test]
    fn test_multipolygon_centroid_averages_all_exteriors() {
        let right = polygon![(x: 2.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 1.0), (x: 2.0, y: 1.0)];
        let mp = RegionGeometry::MultiPolygon(MultiPolygon::new(vec![unit_square(), right]));
        let c = centroid(&mp).unwrap();
        assert_eq!((c.x(), c.y()), (1.5, 0.5));
    }
}
