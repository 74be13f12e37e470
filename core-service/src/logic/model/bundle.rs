//! Model Bundle - the on-disk model artifact
//!
//! One JSON document carries both classifiers, the scaler, the ordered
//! feature names and the version tag. Every piece is optional at the serde
//! level so a missing artifact is reported by name instead of as a generic
//! parse error; `into_model` is the only way to get an `EnsembleModel` and it
//! validates everything before handing one out.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::{validate_feature_names, FEATURE_COUNT, FEATURE_LAYOUT};

use super::classifier::Classifier;
use super::ensemble::EnsembleModel;
use super::error::ModelError;
use super::scaler::StandardScaler;

/// Bundle schema this build understands
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

static MODEL_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?$").expect("static regex")
});

/// Offline evaluation numbers recorded by the training job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrainingMetrics {
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub training_samples: Option<u64>,
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelBundle {
    pub schema_version: Option<u32>,
    pub model_version: Option<String>,
    pub feature_names: Option<Vec<String>>,
    pub scaler: Option<StandardScaler>,
    pub primary: Option<Classifier>,
    pub secondary: Option<Classifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrainingMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
}

impl ModelBundle {
    /// Complete bundle for the current feature layout
    pub fn new(
        model_version: &str,
        scaler: StandardScaler,
        primary: Classifier,
        secondary: Classifier,
    ) -> Self {
        Self {
            schema_version: Some(SUPPORTED_SCHEMA_VERSION),
            model_version: Some(model_version.to_string()),
            feature_names: Some(FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()),
            scaler: Some(scaler),
            primary: Some(primary),
            secondary: Some(secondary),
            metrics: None,
            trained_at: None,
        }
    }

    pub fn from_json(data: &[u8]) -> Result<Self, ModelError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ModelError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Validate every sub-artifact and build the immutable model
    pub fn into_model(self) -> Result<EnsembleModel, ModelError> {
        let schema = self.schema_version.ok_or(ModelError::MissingArtifact("schema_version"))?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            return Err(ModelError::UnsupportedSchema(schema));
        }

        let version = self.model_version.ok_or(ModelError::MissingArtifact("model_version"))?;
        if !MODEL_VERSION_RE.is_match(version.trim()) {
            return Err(ModelError::InvalidVersion(version));
        }

        let feature_names = self.feature_names.ok_or(ModelError::MissingArtifact("feature_names"))?;
        validate_feature_names(&feature_names).map_err(ModelError::FeatureSchema)?;

        let scaler = self.scaler.ok_or(ModelError::MissingArtifact("scaler"))?;
        scaler.validate(FEATURE_COUNT).map_err(ModelError::InvalidScaler)?;

        let primary = self.primary.ok_or(ModelError::MissingArtifact("primary"))?;
        primary
            .validate(FEATURE_COUNT)
            .map_err(|reason| ModelError::InvalidClassifier { which: "primary", reason })?;

        let secondary = self.secondary.ok_or(ModelError::MissingArtifact("secondary"))?;
        secondary
            .validate(FEATURE_COUNT)
            .map_err(|reason| ModelError::InvalidClassifier { which: "secondary", reason })?;

        Ok(EnsembleModel::from_validated(
            version.trim().to_string(),
            feature_names,
            scaler,
            primary,
            secondary,
            self.metrics,
            self.trained_at,
        ))
    }
}

/// SHA-256 of a byte buffer as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Load, optionally checksum, and validate a bundle from disk
pub fn load_bundle(path: &Path, expected_sha256: Option<&str>) -> Result<EnsembleModel, ModelError> {
    log::info!("Loading model bundle from: {}", path.display());

    if !path.exists() {
        return Err(ModelError::NotFound(path.display().to_string()));
    }

    let data = fs::read(path)?;

    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&data);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ModelError::ChecksumMismatch {
                expected: expected.trim().to_lowercase(),
                actual,
            });
        }
        log::debug!("Model checksum verified ({})", actual);
    }

    let model = ModelBundle::from_json(&data)?.into_model()?;
    log::info!(
        "Model {} loaded ({} + {})",
        model.version(),
        model.primary().kind(),
        model.secondary().kind()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::tree::DecisionTree;

    fn complete() -> ModelBundle {
        ModelBundle::new(
            "v2.0.0",
            StandardScaler::identity(FEATURE_COUNT),
            Classifier::GradientBoosted { base_margin: 0.0, trees: vec![DecisionTree::constant(0.0)] },
            Classifier::RandomForest { trees: vec![DecisionTree::constant(0.5)] },
        )
    }

    #[test]
    fn test_complete_bundle_loads() {
        let model = complete().into_model().unwrap();
        assert_eq!(model.version(), "v2.0.0");
    }

    #[test]
    fn test_missing_version_rejected() {
        let mut b = complete();
        b.model_version = None;
        assert!(matches!(b.into_model(), Err(ModelError::MissingArtifact("model_version"))));
    }

    #[test]
    fn test_unrecognized_version_rejected() {
        for bad in ["", "latest", "2.0", "v2.x.0"] {
            let mut b = complete();
            b.model_version = Some(bad.to_string());
            assert!(matches!(b.into_model(), Err(ModelError::InvalidVersion(_))), "{}", bad);
        }
        let mut ok = complete();
        ok.model_version = Some("3.1.4-rc.1".to_string());
        assert!(ok.into_model().is_ok());
    }

    #[test]
    fn test_unsupported_schema_rejected() {
        let mut b = complete();
        b.schema_version = Some(2);
        assert!(matches!(b.into_model(), Err(ModelError::UnsupportedSchema(2))));
        let mut b = complete();
        b.schema_version = None;
        assert!(matches!(b.into_model(), Err(ModelError::MissingArtifact("schema_version"))));
    }

    #[test]
    fn test_missing_sub_artifacts_rejected() {
        let mut b = complete();
        b.scaler = None;
        assert!(matches!(b.into_model(), Err(ModelError::MissingArtifact("scaler"))));
        let mut b = complete();
        b.secondary = None;
        assert!(matches!(b.into_model(), Err(ModelError::MissingArtifact("secondary"))));
    }

    #[test]
    fn test_feature_order_mismatch_rejected() {
        let mut b = complete();
        if let Some(names) = b.feature_names.as_mut() {
            names.swap(0, 1);
        }
        assert!(matches!(b.into_model(), Err(ModelError::FeatureSchema(_))));
    }

    #[test]
    fn test_classifier_feature_out_of_range_rejected() {
        let mut b = complete();
        b.primary = Some(Classifier::GradientBoosted {
            base_margin: 0.0,
            trees: vec![DecisionTree::stump(FEATURE_COUNT, 0.0, 0.0, 1.0)],
        });
        assert!(matches!(
            b.into_model(),
            Err(ModelError::InvalidClassifier { which: "primary", .. })
        ));
    }

    #[test]
    fn test_load_with_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let bytes = complete().to_json().unwrap();
        fs::write(&path, &bytes).unwrap();

        let digest = sha256_hex(&bytes);
        assert!(load_bundle(&path, Some(&digest)).is_ok());
        assert!(load_bundle(&path, None).is_ok());
        assert!(matches!(
            load_bundle(&path, Some("00ff")),
            Err(ModelError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_bundle(&dir.path().join("absent.json"), None);
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(load_bundle(&path, None), Err(ModelError::Parse(_))));
    }
}
