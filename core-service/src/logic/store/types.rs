use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::hotspot::Severity;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Hotspot for {found} passed to replace for {expected}")]
    DateMismatch { expected: NaiveDate, found: NaiveDate },
    #[error("Duplicate hotspot at ({lat}, {lng}) for {date}")]
    Duplicate { date: NaiveDate, lat: f64, lng: f64 },
    #[error("Corrupt row: {0}")]
    Corrupt(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCount {
    pub prediction_date: NaiveDate,
    pub hotspot_count: u64,
}

/// Aggregate view over everything persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PredictionStats {
    pub total_prediction_dates: u64,
    /// Most severe first; severities with no rows are omitted
    pub severity_breakdown: Vec<SeverityCount>,
    /// Newest first, at most `RECENT_DATES_LIMIT`
    pub recent_predictions: Vec<DateCount>,
}

pub const RECENT_DATES_LIMIT: usize = 10;
