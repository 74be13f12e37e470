//! Geographic primitives
//!
//! All distances in the pipeline are planar distances in degrees over raw
//! (lat, lng). Over a single metropolitan area this is close enough to the
//! great-circle distance, and it is what the clustering and naming
//! tolerances are tuned against.

use serde::{Deserialize, Serialize};

use crate::constants::{KM_PER_DEGREE, METERS_PER_DEGREE};

/// A coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in degrees
    pub fn distance_deg(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Approximate distance in kilometres (111 km per degree)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        self.distance_deg(other) * KM_PER_DEGREE
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Convert a degree distance to metres
pub fn degrees_to_meters(deg: f64) -> f64 {
    deg * METERS_PER_DEGREE
}

/// Arithmetic mean of a set of points. `None` for an empty set.
pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;
    let mut n = 0usize;
    for p in points {
        lat_sum += p.lat;
        lng_sum += p.lng;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(GeoPoint::new(lat_sum / n as f64, lng_sum / n as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_deg() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((a.distance_deg(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_km(&b) - 555.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid() {
        let pts = [GeoPoint::new(28.0, 77.0), GeoPoint::new(28.2, 77.4)];
        let c = centroid(pts.iter()).unwrap();
        assert!((c.lat - 28.1).abs() < 1e-12);
        assert!((c.lng - 77.2).abs() < 1e-12);
        assert!(centroid(std::iter::empty::<&GeoPoint>()).is_none());
    }

    #[test]
    fn test_degrees_to_meters() {
        assert!((degrees_to_meters(0.01) - 1110.0).abs() < 1e-9);
    }
}
