//! Waterlogging hotspot prediction core
//!
//! Grid → features → ensemble score → clusters → hotspot records, shared by
//! the `waterlog-predict` CLI and the cloud server.

pub mod constants;
pub mod logic;

pub use logic::config::{ConfigError, PipelineConfig};
pub use logic::hotspot::{Hotspot, RiskFactors, Severity};
pub use logic::model::{load_bundle, EnsembleModel, ModelBundle, ModelError, ModelRegistry, ModelSummary};
pub use logic::pipeline::{
    persist, persist_to, skip_persistence, Persistence, Pipeline, PipelineError, PredictionRun, RunControl, RunReport,
};
pub use logic::reference::ReferenceData;
pub use logic::store::{MemoryStore, PredictionStats, PredictionStore, SqliteStore, StoreError};
pub use logic::weather::{
    FixedWeatherProvider, OpenMeteoProvider, ResolvedWeather, SqliteRainfallProvider, WeatherProvider,
    WeatherResolver, WeatherSource,
};
