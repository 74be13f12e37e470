//! Hotspot Module
//!
//! Persisted prediction records and the cluster → hotspot conversion.

pub mod assembler;
pub mod types;

pub use assembler::{AssemblyContext, HotspotAssembler, HIGH_RAINFALL_MM, VERY_HIGH_RAINFALL_MM};
pub use types::{Hotspot, RiskFactors, Severity};
