//! Pipeline Configuration
//!
//! Defaults come from `constants`, a JSON file may override any subset and
//! `WATERLOG_*` environment variables win over both. Everything is checked
//! by `validate` before a run touches the store.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    self, DEFAULT_BATCH_SIZE, DEFAULT_LAT_MAX, DEFAULT_LAT_MIN, DEFAULT_LNG_MAX, DEFAULT_LNG_MIN,
    DEFAULT_MIN_RADIUS_METERS, DEFAULT_RADIUS_BUFFER_METERS,
};
use crate::logic::clustering::ClusteringParams;
use crate::logic::grid::{grid_shape, GridBounds, GridError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub bounds: GridBounds,
    pub grid_step: f64,
    pub risk_threshold: f64,
    pub cluster_eps: f64,
    pub min_samples: usize,
    pub min_radius_meters: u32,
    pub radius_buffer_meters: u32,
    pub batch_size: usize,
    pub weather_timeout_secs: u64,
    pub live_weather: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bounds: GridBounds::new(DEFAULT_LAT_MIN, DEFAULT_LAT_MAX, DEFAULT_LNG_MIN, DEFAULT_LNG_MAX),
            grid_step: constants::DEFAULT_GRID_STEP,
            risk_threshold: constants::DEFAULT_RISK_THRESHOLD,
            cluster_eps: constants::DEFAULT_CLUSTER_EPS,
            min_samples: constants::DEFAULT_MIN_SAMPLES,
            min_radius_meters: DEFAULT_MIN_RADIUS_METERS,
            radius_buffer_meters: DEFAULT_RADIUS_BUFFER_METERS,
            batch_size: DEFAULT_BATCH_SIZE,
            weather_timeout_secs: constants::DEFAULT_WEATHER_TIMEOUT_SECS,
            live_weather: true,
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// JSON file, then environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read(path)?;
        let config: PipelineConfig = serde_json::from_slice(&data)?;
        log::info!("Loaded pipeline config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply every override `lookup` has a value for, whatever the current value is.
    /// Unparsable values are logged and ignored.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = parse_override(&lookup, constants::ENV_RISK_THRESHOLD) {
            self.risk_threshold = v;
        }
        if let Some(v) = parse_override(&lookup, constants::ENV_GRID_STEP) {
            self.grid_step = v;
        }
        if let Some(v) = parse_override(&lookup, constants::ENV_CLUSTER_EPS) {
            self.cluster_eps = v;
        }
        if let Some(v) = parse_override(&lookup, constants::ENV_MIN_SAMPLES) {
            self.min_samples = v;
        }
        if let Some(v) = parse_override(&lookup, constants::ENV_WEATHER_TIMEOUT) {
            self.weather_timeout_secs = v;
        }
        if let Some(raw) = lookup(constants::ENV_LIVE_WEATHER) {
            let raw = raw.trim().to_lowercase();
            self.live_weather = raw != "false" && raw != "0";
        }
        self
    }

    pub fn clustering_params(&self) -> ClusteringParams {
        ClusteringParams {
            risk_threshold: self.risk_threshold,
            eps: self.cluster_eps,
            min_samples: self.min_samples,
            min_radius_meters: self.min_radius_meters,
            radius_buffer_meters: self.radius_buffer_meters,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        grid_shape(&self.bounds, self.grid_step)?;
        if !(self.risk_threshold.is_finite() && self.risk_threshold > 0.0 && self.risk_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "risk_threshold must be within (0, 1), got {}",
                self.risk_threshold
            )));
        }
        if !(self.cluster_eps.is_finite() && self.cluster_eps > self.grid_step) {
            return Err(ConfigError::Invalid(format!(
                "cluster_eps {} must be greater than grid_step {}",
                self.cluster_eps, self.grid_step
            )));
        }
        if self.min_samples == 0 {
            return Err(ConfigError::Invalid("min_samples must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".to_string()));
        }
        if self.weather_timeout_secs == 0 {
            return Err(ConfigError::Invalid("weather_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_eps_must_exceed_step() {
        let mut c = PipelineConfig::default();
        c.cluster_eps = c.grid_step;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
        c.cluster_eps = c.grid_step * 0.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_bad_bounds_and_step() {
        let mut c = PipelineConfig::default();
        c.bounds.lat_min = c.bounds.lat_max;
        assert!(matches!(c.validate(), Err(ConfigError::Grid(_))));

        let mut c = PipelineConfig::default();
        c.grid_step = -0.01;
        assert!(matches!(c.validate(), Err(ConfigError::Grid(GridError::InvalidStep(_)))));
    }

    #[test]
    fn test_threshold_range() {
        for t in [0.0, 1.0, f64::NAN] {
            let mut c = PipelineConfig::default();
            c.risk_threshold = t;
            assert!(c.validate().is_err(), "{}", t);
        }
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"grid_step": 0.02, "cluster_eps": 0.025}"#).unwrap();
        let c: PipelineConfig = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(c.grid_step, 0.02);
        assert_eq!(c.cluster_eps, 0.025);
        assert_eq!(c.min_samples, constants::DEFAULT_MIN_SAMPLES);
        assert!(c.validate().is_ok());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_override_equal_to_default_still_wins() {
        let from_file = PipelineConfig {
            grid_step: 0.02,
            cluster_eps: 0.05,
            risk_threshold: 0.8,
            live_weather: false,
            ..PipelineConfig::default()
        };
        let c = from_file.with_overrides(vars(&[
            ("WATERLOG_GRID_STEP", "0.01"),
            ("WATERLOG_CLUSTER_EPS", "0.012"),
            ("WATERLOG_RISK_THRESHOLD", "0.6"),
            ("WATERLOG_LIVE_WEATHER", "true"),
        ]));
        assert_eq!(c.grid_step, constants::DEFAULT_GRID_STEP);
        assert_eq!(c.cluster_eps, constants::DEFAULT_CLUSTER_EPS);
        assert_eq!(c.risk_threshold, constants::DEFAULT_RISK_THRESHOLD);
        assert!(c.live_weather);
    }

    #[test]
    fn test_unset_or_bad_override_keeps_value() {
        let base = PipelineConfig { min_samples: 7, weather_timeout_secs: 3, ..PipelineConfig::default() };
        let c = base.clone().with_overrides(vars(&[("WATERLOG_MIN_SAMPLES", "many")]));
        assert_eq!(c, base);

        let c = base.with_overrides(vars(&[("WATERLOG_WEATHER_TIMEOUT", " 30 "), ("WATERLOG_LIVE_WEATHER", "0")]));
        assert_eq!(c.weather_timeout_secs, 30);
        assert_eq!(c.min_samples, 7);
        assert!(!c.live_weather);
    }

    #[test]
    fn test_huge_grid_rejected() {
        let c = PipelineConfig { grid_step: 1e-12, cluster_eps: 1e-11, ..PipelineConfig::default() };
        assert!(matches!(c.validate(), Err(ConfigError::Grid(GridError::TooLarge { .. }))));
    }

    #[test]
    fn test_clustering_params() {
        let p = PipelineConfig::default().clustering_params();
        assert_eq!(p, ClusteringParams::default());
    }
}
