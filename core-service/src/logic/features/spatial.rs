//! Spatial Feature Extraction
//!
//! Position, distance to the nearest known risk zone, and a latitude-based
//! elevation proxy. The proxy is a coarse north/south slope approximation for
//! the default region; it is not terrain data.

use crate::logic::geo::GeoPoint;
use crate::logic::reference::ReferenceData;

use super::vector::{FeatureExtractor, FeatureVector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialFeatures {
    pub point: GeoPoint,
    pub elevation_proxy: f64,
    pub min_dist_to_risk_zone_km: f64,
}

impl SpatialFeatures {
    pub fn compute(point: GeoPoint, reference: &ReferenceData) -> Self {
        Self {
            point,
            elevation_proxy: reference.elevation_reference_lat - point.lat,
            min_dist_to_risk_zone_km: reference.min_distance_to_risk_zone_km(&point),
        }
    }
}

impl FeatureExtractor for SpatialFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[4] = self.point.lat;
        vector.values[5] = self.point.lng;
        vector.values[6] = self.elevation_proxy;
        vector.values[7] = self.min_dist_to_risk_zone_km;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevation_proxy() {
        let r = ReferenceData::delhi();
        let s = SpatialFeatures::compute(GeoPoint::new(28.5, 77.0), &r);
        assert!((s.elevation_proxy - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_distance_uses_closest_zone() {
        let r = ReferenceData::delhi();
        // 0.01 degrees north of Najafgarh, far from every other zone
        let s = SpatialFeatures::compute(GeoPoint::new(28.6239, 76.9830), &r);
        assert!((s.min_dist_to_risk_zone_km - 1.11).abs() < 1e-9);
    }

    #[test]
    fn test_extract_slots() {
        let r = ReferenceData::delhi();
        let mut v = FeatureVector::new();
        SpatialFeatures::compute(GeoPoint::new(28.61, 77.2), &r).extract(&mut v);
        assert_eq!(v.get_by_name("lat"), Some(28.61));
        assert_eq!(v.get_by_name("lng"), Some(77.2));
        assert!(v.get_by_name("min_dist_to_risk_zone_km").unwrap() > 0.0);
    }
}
