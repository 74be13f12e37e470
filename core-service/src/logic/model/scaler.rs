//! Normalization parameters from training
//!
//! Standardisation with the statistics fixed at training time. Never refit
//! during inference.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Identity transform for `n` features
    pub fn identity(n: usize) -> Self {
        Self::new(vec![0.0; n], vec![1.0; n])
    }

    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.mean.len() != feature_count || self.scale.len() != feature_count {
            return Err(format!(
                "expected {} means/scales, got {}/{}",
                feature_count,
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err("non-finite mean".to_string());
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!("scale[{}] must be finite and non-zero", i));
        }
        Ok(())
    }

    /// Stack a batch into a matrix and standardise every column
    pub fn transform(&self, batch: &[FeatureVector]) -> Array2<f64> {
        let cols = self.mean.len();
        let mut matrix = Array2::<f64>::zeros((batch.len(), cols));
        for (mut row, vector) in matrix.rows_mut().into_iter().zip(batch) {
            row.assign(&ArrayView1::from(vector.as_slice()));
        }

        let mean = ArrayView1::from(self.mean.as_slice());
        let scale = ArrayView1::from(self.scale.as_slice());
        (matrix - &mean) / &scale
    }
}
