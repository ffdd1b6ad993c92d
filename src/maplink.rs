//! Coordinate extraction from map-service share links.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;
use url::Url;

use crate::models::QueryPoint;

/// Google Maps URL shapes, tried in order
static GOOGLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"https?://(?:www\.)?google\.com/maps/.*[@,](-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://(?:www\.)?google\.com/maps/place/.*@(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://(?:www\.)?google\.com/maps/@(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://maps\.google\.com/.*[@,](-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://maps\.google\.com/maps\?.*q=(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://(?:www\.)?google\.com/maps/search/(-?\d+\.?\d*),\s*\+?(-?\d+\.?\d*)",
    ])
});

static APPLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"https?://maps\.apple\.com/.*ll=(-?\d+\.?\d*),(-?\d+\.?\d*)",
        r"https?://maps\.apple\.com/.*[@,](-?\d+\.?\d*),(-?\d+\.?\d*)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                error!("Invalid map link pattern {}: {}", p, e);
                None
            }
        })
        .collect()
}

/// Whether the pair falls inside the Philippines envelope
pub fn is_philippines(lat: f64, lng: f64) -> bool {
    (4.0..=21.0).contains(&lat) && (116.0..=127.0).contains(&lng)
}

/// Pull a (lat, lng) pair out of a Google or Apple Maps link.
///
/// The first pattern yielding a pair inside the Philippines wins.
pub fn extract_coordinates(link: &str) -> Option<QueryPoint> {
    let link = link.trim();
    GOOGLE_PATTERNS
        .iter()
        .chain(APPLE_PATTERNS.iter())
        .find_map(|re| {
            let caps = re.captures(link)?;
            let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
            let lng: f64 = caps.get(2)?.as_str().parse().ok()?;
            is_philippines(lat, lng).then(|| QueryPoint::new(lat, lng))
        })
}

/// `maps.app.goo.gl` links carry no coordinates until their redirect is followed.
pub fn is_shortened_link(link: &str) -> bool {
    Url::parse(link.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "maps.app.goo.gl"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(GOOGLE_PATTERNS.len(), 6);
        assert_eq!(APPLE_PATTERNS.len(), 2);
    }

    #[test]
    fn test_google_link_shapes() {
        let cases = [
            "https://www.google.com/maps/place/Davao+City/@7.0731,125.6128,13z/data=!3m1",
            "https://www.google.com/maps/@7.0731,125.6128,15z",
            "https://maps.google.com/maps?q=7.0731,125.6128",
            "https://www.google.com/maps/search/7.0731,+125.6128",
            "  https://google.com/maps/@7.0731,125.6128,15z  ",
        ];
        for link in cases {
            assert_eq!(
                extract_coordinates(link),
                Some(QueryPoint::new(7.0731, 125.6128)),
                "{}",
                link
            );
        }
    }

    #[test]
    fn test_apple_link() {
        assert_eq!(
            extract_coordinates("https://maps.apple.com/?ll=7.0652,125.6081&q=Bankerohan"),
            Some(QueryPoint::new(7.0652, 125.6081))
        );
    }

    #[test]
    fn test_rejects_points_outside_philippines() {
        assert_eq!(
            extract_coordinates("https://www.google.com/maps/@40.7128,-74.0060,12z"),
            None
        );
    }

    #[test]
    fn test_rejects_unrelated_links() {
        assert_eq!(extract_coordinates("https://example.com/@7.07,125.6"), None);
        assert_eq!(extract_coordinates("not a url"), None);
    }

    #[test]
    fn test_shortened_link_detection() {
        assert!(is_shortened_link("https://maps.app.goo.gl/AbCdEf123"));
        assert!(!is_shortened_link("https://www.google.com/maps/@7.07,125.6,15z"));
        assert!(!is_shortened_link("maps.app.goo.gl"));
    }
}
