//! Feature layout - the one definition of model input columns
//!
//! The order below is the column order the ensemble was trained on. Any
//! added, removed or reordered name bumps `FEATURE_VERSION`. Model bundles
//! carry their own ordered name list and are rejected at load time unless it
//! matches exactly.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_LAYOUT: &[&str] = &[
    // === Rainfall (0-3) ===
    "rainfall_24h",            // 0: Raw 24h rainfall (mm)
    "rainfall_squared",        // 1: Super-linear growth term
    "rainfall_log",            // 2: log1p, compresses extremes
    "rainfall_intensity_num",  // 3: Ordinal bucket 1-5

    // === Spatial (4-7) ===
    "lat",                     // 4
    "lng",                     // 5
    "elevation_proxy",         // 6: Reference latitude minus lat (not a DEM)
    "min_dist_to_risk_zone_km",// 7: Distance to closest known risk zone

    // === Temporal (8-14) ===
    "day_of_year",             // 8
    "month",                   // 9
    "is_monsoon",              // 10: 1 for June..=September
    "day_sin",                 // 11
    "day_cos",                 // 12
    "month_sin",               // 13
    "month_cos",               // 14
];

/// Equals `FEATURE_LAYOUT.len()`
pub const FEATURE_COUNT: usize = 15;

/// CRC32 over the version byte and NUL-separated names
fn hash_names<'a>(version: u8, names: impl Iterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(|| hash_names(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied()));

pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

/// Served by the model endpoint and `waterlog-predict model`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutMismatchError {
    #[error(
        "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
         got v{actual_version} (hash: {actual_hash:08x})"
    )]
    Version {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },
    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    Count { expected: usize, actual: usize },
    #[error("Feature name mismatch at index {index}: expected '{expected}', got '{actual}'")]
    Name {
        index: usize,
        expected: String,
        actual: String,
    },
}

pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    let current = layout_hash();
    if version == FEATURE_VERSION && hash == current {
        return Ok(());
    }
    Err(LayoutMismatchError::Version {
        expected_version: FEATURE_VERSION,
        expected_hash: current,
        actual_version: version,
        actual_hash: hash,
    })
}

/// A bundle's ordered names against the layout. Count and order must match.
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    if names.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError::Count {
            expected: FEATURE_COUNT,
            actual: names.len(),
        });
    }

    for (index, (expected, actual)) in FEATURE_LAYOUT.iter().zip(names.iter()).enumerate() {
        if *expected != actual.as_ref() {
            return Err(LayoutMismatchError::Name {
                index,
                expected: expected.to_string(),
                actual: actual.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}
