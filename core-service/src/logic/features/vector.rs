//! Per-point model input
//!
//! One fixed-size row per grid point, stamped with the layout version and
//! hash from `layout.rs` so a row built for an older layout is caught before
//! scoring.

use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION,
};

/// Values for one grid point, in `FEATURE_LAYOUT` order.
///
/// Model input is never a bare `Vec<f64>`; the layout hash travels with the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    /// CRC32 of the layout names
    pub layout_hash: u32,
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// All zeros, current layout
    pub fn new() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    #[cfg(test)]
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Built for the layout this binary scores with?
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// First slot holding NaN or an infinity
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .find(|(_, v)| !v.is_finite())
            .map(|(name, v)| (*name, *v))
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

/// One feature family. Writes only its own slots.
pub trait FeatureExtractor {
    fn extract(&self, vector: &mut FeatureVector);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::feature_index;

    #[test]
    fn test_zeroed_vector_carries_current_layout() {
        let v = FeatureVector::default();
        assert_eq!((v.version, v.layout_hash), (FEATURE_VERSION, layout_hash()));
        assert!(v.validate().is_ok());
        assert!(v.as_slice().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_named_slots() {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = 42.0;
        let v = FeatureVector::from(values);
        assert_eq!(v.get_by_name("rainfall_24h"), Some(42.0));
        assert_eq!(v.get(0), Some(42.0));
        assert_eq!(v.get_by_name("soil_moisture"), None);
        assert_eq!(v.get(FEATURE_COUNT), None);
    }

    #[test]
    fn test_stale_vector_fails_validation() {
        let mut vector = FeatureVector::new();
        vector.layout_hash ^= 0xdead_beef;
        assert!(vector.validate().is_err());
        vector.layout_hash = layout_hash();
        vector.version += 1;
        assert!(matches!(vector.validate(), Err(LayoutMismatchError::Version { .. })));
    }

    #[test]
    fn test_first_non_finite() {
        let mut vector = FeatureVector::new();
        assert!(vector.first_non_finite().is_none());
        vector.values[feature_index("rainfall_log").unwrap()] = f64::NAN;
        assert_eq!(vector.first_non_finite().map(|(n, _)| n), Some("rainfall_log"));
    }
}
