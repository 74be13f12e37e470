//! Clustering Module
//!
//! Groups high-risk grid points into spatial clusters.

pub mod dbscan;
pub mod engine;

pub use dbscan::{dbscan, DbscanResult, Label};
pub use engine::{
    cluster_radius, Cluster, ClusteringError, ClusteringOutcome, ClusteringParams, RiskClusteringEngine,
    ScoredPoint,
};
