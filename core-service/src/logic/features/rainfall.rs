//! Rainfall Feature Extraction
//!
//! Raw 24h rainfall plus three transforms: the square (risk grows faster
//! than linearly), log1p (tames extreme days) and an ordinal intensity bucket.

use super::vector::{FeatureExtractor, FeatureVector};

/// Upper (inclusive) edges of intensity buckets 1..=4; anything above is 5
pub const INTENSITY_BREAKPOINTS: [f64; 4] = [15.0, 35.0, 65.0, 115.0];

/// Ordinal intensity 1..=5 with right-closed intervals:
/// `(..15] → 1, (15,35] → 2, (35,65] → 3, (65,115] → 4, (115..) → 5`
pub fn intensity_bucket(rainfall_mm: f64) -> u8 {
    INTENSITY_BREAKPOINTS
        .iter()
        .position(|&edge| rainfall_mm <= edge)
        .map(|i| i as u8 + 1)
        .unwrap_or(5)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainfallFeatures {
    pub rainfall_24h: f64,
}

impl RainfallFeatures {
    pub fn new(rainfall_24h: f64) -> Self {
        Self { rainfall_24h }
    }

    pub fn squared(&self) -> f64 {
        self.rainfall_24h * self.rainfall_24h
    }

    pub fn log1p(&self) -> f64 {
        self.rainfall_24h.ln_1p()
    }

    pub fn intensity(&self) -> u8 {
        intensity_bucket(self.rainfall_24h)
    }
}

impl FeatureExtractor for RainfallFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[0] = self.rainfall_24h;
        vector.values[1] = self.squared();
        vector.values[2] = self.log1p();
        vector.values[3] = self.intensity() as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bucket_edges() {
        assert_eq!(intensity_bucket(0.0), 1);
        assert_eq!(intensity_bucket(15.0), 1);
        assert_eq!(intensity_bucket(15.1), 2);
        assert_eq!(intensity_bucket(35.0), 2);
        assert_eq!(intensity_bucket(65.0), 3);
        assert_eq!(intensity_bucket(100.0), 4);
        assert_eq!(intensity_bucket(115.0), 4);
        assert_eq!(intensity_bucket(150.0), 5);
        assert_eq!(intensity_bucket(5000.0), 5);
    }

    #[test]
    fn test_transforms() {
        let r = RainfallFeatures::new(150.0);
        assert_eq!(r.squared(), 22_500.0);
        assert!((r.log1p() - 151.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_extract_slots() {
        let mut v = FeatureVector::new();
        RainfallFeatures::new(40.0).extract(&mut v);
        assert_eq!(v.get_by_name("rainfall_24h"), Some(40.0));
        assert_eq!(v.get_by_name("rainfall_squared"), Some(1600.0));
        assert_eq!(v.get_by_name("rainfall_intensity_num"), Some(3.0));
    }
}
