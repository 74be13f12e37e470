//! Features Module - Feature Extraction Engine
//!
//! One extractor per feature family (rainfall, spatial, temporal), each
//! writing its own slots of the versioned `FeatureVector`. `FeatureBuilder`
//! composes them for a whole prediction grid.

pub mod layout;
pub mod vector;
pub mod rainfall;
pub mod spatial;
pub mod temporal;
pub mod builder;

#[cfg(test)]
mod tests;

// Re-export common types
pub use builder::{FeatureBuilder, FeatureError};
pub use layout::{
    feature_index, layout_hash, validate_feature_names, LayoutInfo,
    LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use vector::{FeatureExtractor, FeatureVector};
