//! Risk Clustering Engine
//!
//! Filters scored grid points by threshold, runs DBSCAN on the survivors and
//! summarises each cluster (centroid, aggregate risk, spread, radius).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CLUSTER_EPS, DEFAULT_MIN_RADIUS_METERS, DEFAULT_MIN_SAMPLES, DEFAULT_RADIUS_BUFFER_METERS,
    DEFAULT_RISK_THRESHOLD,
};
use crate::logic::geo::{centroid, degrees_to_meters, GeoPoint};

use super::dbscan::dbscan;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusteringError {
    #[error("Risk threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("Cluster eps must be positive and finite, got {0}")]
    InvalidEps(f64),
    #[error("min_samples must be at least 1")]
    InvalidMinSamples,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    pub risk_threshold: f64,
    pub eps: f64,
    pub min_samples: usize,
    pub min_radius_meters: u32,
    pub radius_buffer_meters: u32,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            eps: DEFAULT_CLUSTER_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
            min_radius_meters: DEFAULT_MIN_RADIUS_METERS,
            radius_buffer_meters: DEFAULT_RADIUS_BUFFER_METERS,
        }
    }
}

/// A grid point with its blended risk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub location: GeoPoint,
    pub risk: f64,
}

impl ScoredPoint {
    pub fn new(location: GeoPoint, risk: f64) -> Self {
        Self { location, risk }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub members: Vec<ScoredPoint>,
    pub centroid: GeoPoint,
    pub max_risk: f64,
    pub avg_risk: f64,
    /// Largest member distance from the centroid, degrees
    pub spread_deg: f64,
    pub radius_meters: u32,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusteringOutcome {
    pub clusters: Vec<Cluster>,
    pub high_risk_points: usize,
    pub noise_points: usize,
}

/// `max(min_radius, floor(spread · 111000) + buffer)`
pub fn cluster_radius(spread_deg: f64, min_radius: u32, buffer: u32) -> u32 {
    let spread_m = degrees_to_meters(spread_deg).floor().max(0.0) as u32;
    spread_m.saturating_add(buffer).max(min_radius)
}

#[derive(Debug, Clone)]
pub struct RiskClusteringEngine {
    params: ClusteringParams,
}

impl RiskClusteringEngine {
    pub fn new(params: ClusteringParams) -> Result<Self, ClusteringError> {
        if !(params.risk_threshold.is_finite() && (0.0..=1.0).contains(&params.risk_threshold)) {
            return Err(ClusteringError::InvalidThreshold(params.risk_threshold));
        }
        if !(params.eps.is_finite() && params.eps > 0.0) {
            return Err(ClusteringError::InvalidEps(params.eps));
        }
        if params.min_samples == 0 {
            return Err(ClusteringError::InvalidMinSamples);
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &ClusteringParams {
        &self.params
    }

    pub fn cluster(&self, scored: &[ScoredPoint]) -> ClusteringOutcome {
        let high: Vec<ScoredPoint> = scored
            .iter()
            .copied()
            .filter(|p| p.risk > self.params.risk_threshold)
            .collect();

        log::debug!(
            "{} of {} points above risk threshold {}",
            high.len(),
            scored.len(),
            self.params.risk_threshold
        );

        if high.is_empty() {
            return ClusteringOutcome::default();
        }

        let locations: Vec<GeoPoint> = high.iter().map(|p| p.location).collect();
        let result = dbscan(&locations, self.params.eps, self.params.min_samples);

        let clusters: Vec<Cluster> = result
            .members()
            .into_iter()
            .filter_map(|idx| self.summarise(idx.iter().map(|&i| high[i]).collect()))
            .collect();

        ClusteringOutcome {
            clusters,
            high_risk_points: high.len(),
            noise_points: result.noise_count(),
        }
    }

    fn summarise(&self, members: Vec<ScoredPoint>) -> Option<Cluster> {
        let center = centroid(members.iter().map(|m| &m.location))?;
        let max_risk = members.iter().map(|m| m.risk).fold(f64::MIN, f64::max);
        let avg_risk = members.iter().map(|m| m.risk).sum::<f64>() / members.len() as f64;
        let spread_deg = members
            .iter()
            .map(|m| m.location.distance_deg(&center))
            .fold(0.0, f64::max);
        let radius_meters = cluster_radius(
            spread_deg,
            self.params.min_radius_meters,
            self.params.radius_buffer_meters,
        );

        Some(Cluster { members, centroid: center, max_risk, avg_risk, spread_deg, radius_meters })
    }
}
