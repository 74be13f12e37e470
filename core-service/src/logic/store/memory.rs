use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::logic::hotspot::{Hotspot, Severity};

use super::types::{DateCount, PredictionStats, SeverityCount, StoreError, RECENT_DATES_LIMIT};
use super::{check_replace, PredictionStore};

/// Process-local store. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    by_date: RwLock<BTreeMap<NaiveDate, Vec<Hotspot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_hotspots(&self) -> usize {
        self.by_date.read().values().map(Vec::len).sum()
    }
}

impl PredictionStore for MemoryStore {
    fn replace_for_date(&self, date: NaiveDate, hotspots: &[Hotspot]) -> Result<usize, StoreError> {
        check_replace(date, hotspots)?;

        let mut map = self.by_date.write();
        if hotspots.is_empty() {
            map.remove(&date);
        } else {
            map.insert(date, hotspots.to_vec());
        }
        Ok(hotspots.len())
    }

    fn load_for_date(&self, date: NaiveDate) -> Result<Vec<Hotspot>, StoreError> {
        let mut rows = self.by_date.read().get(&date).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
        Ok(rows)
    }

    fn stats(&self) -> Result<PredictionStats, StoreError> {
        let map = self.by_date.read();

        let mut per_severity: HashMap<Severity, u64> = HashMap::new();
        for h in map.values().flatten() {
            *per_severity.entry(h.severity).or_default() += 1;
        }
        let severity_breakdown = Severity::ALL
            .iter()
            .rev()
            .filter_map(|s| per_severity.get(s).map(|&count| SeverityCount { severity: *s, count }))
            .collect();

        let recent_predictions = map
            .iter()
            .rev()
            .take(RECENT_DATES_LIMIT)
            .map(|(date, rows)| DateCount { prediction_date: *date, hotspot_count: rows.len() as u64 })
            .collect();

        Ok(PredictionStats {
            total_prediction_dates: map.len() as u64,
            severity_breakdown,
            recent_predictions,
        })
    }
}
