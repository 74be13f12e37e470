//! Model Registry - holds the currently loaded ensemble
//!
//! Readers take an `Arc` snapshot, so a reload never disturbs a run that is
//! already scoring.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::bundle::load_bundle;
use super::ensemble::EnsembleModel;
use super::error::ModelError;

/// Registry status for the health endpoint and CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub model_loaded: bool,
    pub model_version: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub avg_latency_ms: f64,
    pub inference_count: u64,
    pub scored_points: u64,
}

#[derive(Default)]
pub struct ModelRegistry {
    model: RwLock<Option<Arc<EnsembleModel>>>,
    loaded_at: RwLock<Option<DateTime<Utc>>>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    scored_points: AtomicU64,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: EnsembleModel) -> Self {
        let registry = Self::new();
        registry.install(model);
        registry
    }

    /// Load from disk and swap in. The previous model stays active on error.
    pub fn load(&self, path: &Path, expected_sha256: Option<&str>) -> Result<(), ModelError> {
        let model = load_bundle(path, expected_sha256)?;
        self.install(model);
        Ok(())
    }

    pub fn install(&self, model: EnsembleModel) {
        log::info!("Activating model {}", model.version());
        *self.model.write() = Some(Arc::new(model));
        *self.loaded_at.write() = Some(Utc::now());
    }

    pub fn unload(&self) {
        *self.model.write() = None;
        *self.loaded_at.write() = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    pub fn current(&self) -> Result<Arc<EnsembleModel>, ModelError> {
        self.model.read().clone().ok_or(ModelError::NotLoaded)
    }

    /// Account for scoring done against a snapshot taken with `current`
    pub fn record_inference(&self, elapsed: Duration, points: usize) {
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.scored_points.fetch_add(points as u64, Ordering::Relaxed);
    }

    pub fn status(&self) -> RegistryStatus {
        let model = self.model.read().clone();
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        RegistryStatus {
            model_loaded: model.is_some(),
            model_version: model.map(|m| m.version().to_string()),
            loaded_at: *self.loaded_at.read(),
            avg_latency_ms: avg,
            inference_count: count,
            scored_points: self.scored_points.load(Ordering::Relaxed),
        }
    }
}
