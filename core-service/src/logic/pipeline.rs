//! Prediction Pipeline
//!
//! weather → grid → features → ensemble score → clustering → hotspots → store
//!
//! `compute` has no side effects; `run` adds the replace-by-date write and
//! reports a failed write separately from a failed computation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::clustering::{ClusteringError, RiskClusteringEngine, ScoredPoint};
use super::config::{ConfigError, PipelineConfig};
use super::features::{FeatureBuilder, FeatureError};
use super::grid::{generate_grid, GridError};
use super::hotspot::{AssemblyContext, Hotspot, HotspotAssembler};
use super::model::{ModelError, ModelRegistry};
use super::reference::{ReferenceData, ReferenceError};
use super::store::{PredictionStore, StoreError};
use super::weather::{ResolvedWeather, WeatherError, WeatherResolver};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Prediction run cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Stable category name for reports and exit codes
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Config(_)
            | PipelineError::Reference(_)
            | PipelineError::Grid(_)
            | PipelineError::Clustering(_) => "configuration",
            PipelineError::Weather(_) => "weather",
            PipelineError::Feature(_) => "features",
            PipelineError::Model(_) => "model",
            PipelineError::Cancelled => "cancelled",
        }
    }
}

/// Cancellation handle. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancelled: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn checkpoint(&self, stage: &str) -> Result<(), PipelineError> {
        if self.is_cancelled() {
            log::warn!("Run cancelled before {}", stage);
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }
}

/// Everything one run computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRun {
    pub run_id: Uuid,
    pub prediction_date: NaiveDate,
    pub model_version: String,
    pub reference_version: String,
    pub weather: ResolvedWeather,
    pub grid_points: usize,
    pub high_risk_points: usize,
    pub noise_points: usize,
    pub hotspots: Vec<Hotspot>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persistence {
    Persisted { count: usize },
    Failed { error: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run: PredictionRun,
    pub persistence: Persistence,
}

impl RunReport {
    pub fn persisted_count(&self) -> Option<usize> {
        match self.persistence {
            Persistence::Persisted { count } => Some(count),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.persistence, Persistence::Failed { .. })
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    reference: Arc<ReferenceData>,
    models: Arc<ModelRegistry>,
    weather: WeatherResolver,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Validates config and reference data up front; nothing runs on a bad setup.
    pub fn new(
        config: PipelineConfig,
        reference: Arc<ReferenceData>,
        models: Arc<ModelRegistry>,
        weather: WeatherResolver,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        reference.validate()?;
        Ok(Self { config, reference, models, weather })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Predict hotspots for `date` without touching any store
    pub fn compute(
        &self,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        control: &RunControl,
    ) -> Result<PredictionRun, PipelineError> {
        let started = Instant::now();
        let model = self.models.current()?;
        let engine = RiskClusteringEngine::new(self.config.clustering_params())?;
        log::info!("Predicting hotspots for {} with model {}", date, model.version());

        control.checkpoint("weather")?;
        let weather = self.weather.resolve(date);
        let rainfall = weather.rainfall_mm();
        if weather.degraded {
            log::warn!("Using degraded weather ({:.1} mm seasonal estimate)", rainfall);
        }

        control.checkpoint("grid")?;
        let grid = generate_grid(&self.config.bounds, self.config.grid_step)?;
        let vectors = FeatureBuilder::new(&self.reference).build_grid(date, &grid, rainfall)?;
        log::info!("Built {} feature vectors", vectors.len());

        control.checkpoint("scoring")?;
        let scoring = Instant::now();
        let scores = model.score_batched(&vectors, self.config.batch_size)?;
        self.models.record_inference(scoring.elapsed(), vectors.len());
        log::debug!("Scored {} points in {:?}", scores.len(), scoring.elapsed());

        control.checkpoint("clustering")?;
        let scored: Vec<ScoredPoint> = grid
            .iter()
            .zip(&scores)
            .map(|(p, s)| ScoredPoint::new(p.location(), s.risk))
            .collect();
        let outcome = engine.cluster(&scored);
        log::info!(
            "{} high-risk points, {} clusters, {} noise",
            outcome.high_risk_points,
            outcome.clusters.len(),
            outcome.noise_points
        );

        let ctx = AssemblyContext {
            prediction_date: date,
            rainfall_mm: rainfall,
            rainfall_source: weather.source,
            degraded_weather: weather.degraded,
            model_version: model.version().to_string(),
            created_at,
        };
        let hotspots = HotspotAssembler::new(&self.reference).assemble_all(&outcome.clusters, &ctx);

        log::info!("Computed {} hotspots for {} in {:?}", hotspots.len(), date, started.elapsed());

        Ok(PredictionRun {
            run_id: Uuid::new_v4(),
            prediction_date: date,
            model_version: model.version().to_string(),
            reference_version: self.reference.version.clone(),
            weather,
            grid_points: grid.len(),
            high_risk_points: outcome.high_risk_points,
            noise_points: outcome.noise_points,
            hotspots,
            created_at,
        })
    }

    /// Compute, then replace the stored set for `date`. An empty result still
    /// clears stale rows for the date.
    pub fn run(
        &self,
        date: NaiveDate,
        store: &dyn PredictionStore,
        created_at: DateTime<Utc>,
        control: &RunControl,
    ) -> Result<RunReport, PipelineError> {
        let run = self.compute(date, created_at, control)?;
        control.checkpoint("persistence")?;
        Ok(persist(run, store))
    }
}

/// Write a computed run. Never fails; the outcome is in the report.
pub fn persist(run: PredictionRun, store: &dyn PredictionStore) -> RunReport {
    let persistence = match store.replace_for_date(run.prediction_date, &run.hotspots) {
        Ok(count) => Persistence::Persisted { count },
        Err(e) => {
            log::error!("Failed to persist predictions for {}: {}", run.prediction_date, e);
            Persistence::Failed { error: e.to_string() }
        }
    };
    RunReport { run, persistence }
}

/// Write a computed run to a store that may have failed to open. A failed
/// open is reported the same way as a failed write.
pub fn persist_to<S: PredictionStore>(run: PredictionRun, store: Result<S, StoreError>) -> RunReport {
    match store {
        Ok(store) => persist(run, &store),
        Err(e) => {
            let e = StoreError::Unavailable(e.to_string());
            log::error!("Failed to persist predictions for {}: {}", run.prediction_date, e);
            RunReport { run, persistence: Persistence::Failed { error: e.to_string() } }
        }
    }
}

/// Report for a run that was computed but deliberately not written
pub fn skip_persistence(run: PredictionRun) -> RunReport {
    RunReport { run, persistence: Persistence::Skipped }
}
