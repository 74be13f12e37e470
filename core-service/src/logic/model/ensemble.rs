//! Weighted two-model ensemble
//!
//! risk = 0.6 · P(primary) + 0.4 · P(secondary), computed on the scaled
//! feature matrix. Scoring is per row, so the result does not depend on how
//! a grid is split into batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

use super::bundle::TrainingMetrics;
use super::classifier::Classifier;
use super::error::ModelError;
use super::scaler::StandardScaler;

pub const PRIMARY_WEIGHT: f64 = 0.6;
pub const SECONDARY_WEIGHT: f64 = 0.4;

/// Combine the two component probabilities
pub fn blend(primary: f64, secondary: f64) -> f64 {
    (PRIMARY_WEIGHT * primary + SECONDARY_WEIGHT * secondary).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub primary: f64,
    pub secondary: f64,
    pub risk: f64,
}

impl RiskScore {
    pub fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary, risk: blend(primary, secondary) }
    }
}

/// What the model endpoint and the CLI report about the loaded bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_version: String,
    pub primary_kind: String,
    pub secondary_kind: String,
    pub primary_trees: usize,
    pub secondary_trees: usize,
    pub primary_weight: f64,
    pub secondary_weight: f64,
    pub feature_names: Vec<String>,
    pub metrics: Option<TrainingMetrics>,
    pub trained_at: Option<DateTime<Utc>>,
}

/// Immutable, validated model. Only `ModelBundle::into_model` builds one.
#[derive(Debug, Clone)]
pub struct EnsembleModel {
    version: String,
    feature_names: Vec<String>,
    scaler: StandardScaler,
    primary: Classifier,
    secondary: Classifier,
    metrics: Option<TrainingMetrics>,
    trained_at: Option<DateTime<Utc>>,
}

impl EnsembleModel {
    pub(crate) fn from_validated(
        version: String,
        feature_names: Vec<String>,
        scaler: StandardScaler,
        primary: Classifier,
        secondary: Classifier,
        metrics: Option<TrainingMetrics>,
        trained_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self { version, feature_names, scaler, primary, secondary, metrics, trained_at }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn primary(&self) -> &Classifier {
        &self.primary
    }

    pub fn secondary(&self) -> &Classifier {
        &self.secondary
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            model_version: self.version.clone(),
            primary_kind: self.primary.kind().to_string(),
            secondary_kind: self.secondary.kind().to_string(),
            primary_trees: self.primary.tree_count(),
            secondary_trees: self.secondary.tree_count(),
            primary_weight: PRIMARY_WEIGHT,
            secondary_weight: SECONDARY_WEIGHT,
            feature_names: self.feature_names.clone(),
            metrics: self.metrics.clone(),
            trained_at: self.trained_at,
        }
    }

    /// Score one batch. Output order matches input order.
    pub fn score_batch(&self, batch: &[FeatureVector]) -> Result<Vec<RiskScore>, ModelError> {
        for (row, vector) in batch.iter().enumerate() {
            vector.validate().map_err(ModelError::Input)?;
            if let Some((name, _)) = vector.first_non_finite() {
                return Err(ModelError::NonFiniteInput { row, name });
            }
        }

        let scaled = self.scaler.transform(batch);
        let mut scores = Vec::with_capacity(batch.len());
        let mut row_buf = [0.0f64; FEATURE_COUNT];
        for row in scaled.rows() {
            for (slot, value) in row_buf.iter_mut().zip(row.iter()) {
                *slot = *value;
            }
            scores.push(RiskScore::new(
                self.primary.predict_proba(&row_buf),
                self.secondary.predict_proba(&row_buf),
            ));
        }
        Ok(scores)
    }

    /// Score a grid in chunks of `batch_size`
    pub fn score_batched(
        &self,
        vectors: &[FeatureVector],
        batch_size: usize,
    ) -> Result<Vec<RiskScore>, ModelError> {
        let size = batch_size.max(1);
        let mut scores = Vec::with_capacity(vectors.len());
        for (i, chunk) in vectors.chunks(size).enumerate() {
            let mut part = self.score_batch(chunk).map_err(|e| match e {
                ModelError::NonFiniteInput { row, name } => {
                    ModelError::NonFiniteInput { row: i * size + row, name }
                }
                other => other,
            })?;
            scores.append(&mut part);
        }
        Ok(scores)
    }
}
