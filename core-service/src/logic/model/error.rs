use thiserror::Error;

use crate::logic::features::LayoutMismatchError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model not loaded")]
    NotLoaded,
    #[error("Model bundle not found: {0}")]
    NotFound(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Model bundle is missing '{0}'")]
    MissingArtifact(&'static str),
    #[error("Unsupported bundle schema version {0}")]
    UnsupportedSchema(u32),
    #[error("Unrecognized model version '{0}' (expected MAJOR.MINOR.PATCH)")]
    InvalidVersion(String),
    #[error("Bundle feature schema does not match: {0}")]
    FeatureSchema(#[source] LayoutMismatchError),
    #[error("Invalid scaler: {0}")]
    InvalidScaler(String),
    #[error("Invalid {which} classifier: {reason}")]
    InvalidClassifier { which: &'static str, reason: String },
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("Input rejected: {0}")]
    Input(#[source] LayoutMismatchError),
    #[error("Input feature '{name}' at row {row} is not finite")]
    NonFiniteInput { row: usize, name: &'static str },
}
