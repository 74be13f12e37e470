//! Prediction Store
//!
//! Persistence of dated hotspot sets. Replacing a date is all-or-nothing:
//! readers see either the previous set or the new one, never a mix. Two
//! writers on the same date resolve as last write wins.

pub mod memory;
pub mod sqlite;
pub mod types;

use chrono::NaiveDate;

use crate::logic::hotspot::Hotspot;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{DateCount, PredictionStats, SeverityCount, StoreError, RECENT_DATES_LIMIT};

pub trait PredictionStore: Send + Sync {
    /// Delete every hotspot for `date` and insert `hotspots` in one transaction.
    /// An empty slice just clears the date. Returns the number inserted.
    fn replace_for_date(&self, date: NaiveDate, hotspots: &[Hotspot]) -> Result<usize, StoreError>;

    /// Hotspots for `date`, highest confidence first
    fn load_for_date(&self, date: NaiveDate) -> Result<Vec<Hotspot>, StoreError>;

    fn stats(&self) -> Result<PredictionStats, StoreError>;
}

/// Checks shared by every store before a replace
pub(crate) fn check_replace(date: NaiveDate, hotspots: &[Hotspot]) -> Result<(), StoreError> {
    for (i, h) in hotspots.iter().enumerate() {
        if h.prediction_date != date {
            return Err(StoreError::DateMismatch { expected: date, found: h.prediction_date });
        }
        if hotspots[..i].iter().any(|o| o.lat == h.lat && o.lng == h.lng) {
            return Err(StoreError::Duplicate { date, lat: h.lat, lng: h.lng });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
