//! Data models

pub mod prediction;
pub mod rainfall;

pub use prediction::*;
pub use rainfall::*;
