//! Logic Module - prediction pipeline and its engines
//!
//! - `features/` - feature construction (rainfall, spatial, temporal)
//! - `model/` - ensemble bundle, scaling and inference
//! - `clustering/` - DBSCAN over high-risk points
//! - `hotspot/` - cluster → hotspot records
//! - `weather/` - rainfall providers and fallback
//! - `store/` - replace-by-date persistence

// Shared primitives
pub mod config;
pub mod geo;
pub mod grid;
pub mod reference;

// Pipeline stages
pub mod features;
pub mod model;
pub mod clustering;
pub mod hotspot;
pub mod weather;
pub mod store;

pub mod pipeline;
