//! Tests shared by every store implementation

use chrono::{NaiveDate, TimeZone, Utc};

use super::*;
use crate::logic::hotspot::{RiskFactors, Severity};
use crate::logic::weather::WeatherSource;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
}

fn hotspot(d: NaiveDate, lat: f64, lng: f64, confidence: f64, severity: Severity) -> Hotspot {
    Hotspot {
        prediction_date: d,
        name: format!("Area near {:.4}, {:.4}", lat, lng),
        lat,
        lng,
        severity,
        confidence_score: confidence,
        predicted_rainfall_mm: 120.0,
        risk_factors: RiskFactors {
            high_rainfall: true,
            very_high_rainfall: true,
            cluster_size: 9,
            max_risk_score: 0.9,
            rainfall_source: WeatherSource::Simulated,
            degraded_weather: false,
        },
        radius_meters: 1200,
        model_version: "v2.0.0".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
    }
}

fn stores() -> Vec<(&'static str, Box<dyn PredictionStore>)> {
    vec![
        ("memory", Box::new(MemoryStore::new())),
        ("sqlite", Box::new(SqliteStore::in_memory().unwrap())),
    ]
}

#[test]
fn test_replace_then_load_ordered_by_confidence() {
    for (name, store) in stores() {
        let d = date(15);
        let set = vec![
            hotspot(d, 28.5, 77.0, 0.7, Severity::Medium),
            hotspot(d, 28.6, 77.1, 0.9, Severity::Critical),
            hotspot(d, 28.7, 77.2, 0.8, Severity::High),
        ];
        assert_eq!(store.replace_for_date(d, &set).unwrap(), 3, "{}", name);

        let loaded = store.load_for_date(d).unwrap();
        let conf: Vec<f64> = loaded.iter().map(|h| h.confidence_score).collect();
        assert_eq!(conf, vec![0.9, 0.8, 0.7], "{}", name);
        assert_eq!(loaded[0], set[1], "{}", name);
    }
}

#[test]
fn test_replace_removes_previous_set() {
    for (name, store) in stores() {
        let d = date(16);
        store
            .replace_for_date(d, &[hotspot(d, 28.5, 77.0, 0.7, Severity::Medium), hotspot(d, 28.6, 77.0, 0.7, Severity::Medium)])
            .unwrap();
        store.replace_for_date(d, &[hotspot(d, 28.9, 77.3, 0.95, Severity::Critical)]).unwrap();

        let loaded = store.load_for_date(d).unwrap();
        assert_eq!(loaded.len(), 1, "{}", name);
        assert_eq!(loaded[0].lat, 28.9, "{}", name);
    }
}

#[test]
fn test_empty_replace_clears_date_only() {
    for (name, store) in stores() {
        let (a, b) = (date(1), date(2));
        store.replace_for_date(a, &[hotspot(a, 28.5, 77.0, 0.7, Severity::Medium)]).unwrap();
        store.replace_for_date(b, &[hotspot(b, 28.5, 77.0, 0.7, Severity::Medium)]).unwrap();

        assert_eq!(store.replace_for_date(a, &[]).unwrap(), 0, "{}", name);
        assert!(store.load_for_date(a).unwrap().is_empty(), "{}", name);
        assert_eq!(store.load_for_date(b).unwrap().len(), 1, "{}", name);
    }
}

#[test]
fn test_failed_replace_keeps_previous_set() {
    for (name, store) in stores() {
        let d = date(20);
        store.replace_for_date(d, &[hotspot(d, 28.5, 77.0, 0.7, Severity::Medium)]).unwrap();

        let dup = vec![
            hotspot(d, 28.6, 77.1, 0.9, Severity::Critical),
            hotspot(d, 28.6, 77.1, 0.8, Severity::High),
        ];
        assert!(matches!(store.replace_for_date(d, &dup), Err(StoreError::Duplicate { .. })), "{}", name);

        let wrong_date = vec![hotspot(date(21), 28.6, 77.1, 0.9, Severity::Critical)];
        assert!(matches!(store.replace_for_date(d, &wrong_date), Err(StoreError::DateMismatch { .. })), "{}", name);

        let loaded = store.load_for_date(d).unwrap();
        assert_eq!(loaded.len(), 1, "{}", name);
        assert_eq!(loaded[0].lat, 28.5, "{}", name);
    }
}

#[test]
fn test_stats() {
    for (name, store) in stores() {
        for day in 1..=12 {
            let d = date(day);
            let mut set = vec![hotspot(d, 28.5, 77.0, 0.9, Severity::Critical)];
            if day % 2 == 0 {
                set.push(hotspot(d, 28.6, 77.0, 0.7, Severity::Medium));
            }
            store.replace_for_date(d, &set).unwrap();
        }

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_prediction_dates, 12, "{}", name);
        assert_eq!(
            stats.severity_breakdown,
            vec![
                SeverityCount { severity: Severity::Critical, count: 12 },
                SeverityCount { severity: Severity::Medium, count: 6 },
            ],
            "{}",
            name
        );
        assert_eq!(stats.recent_predictions.len(), RECENT_DATES_LIMIT, "{}", name);
        assert_eq!(stats.recent_predictions[0], DateCount { prediction_date: date(12), hotspot_count: 2 }, "{}", name);
        assert_eq!(stats.recent_predictions[1].hotspot_count, 1, "{}", name);
    }
}

#[test]
fn test_sqlite_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("predictions.db");
    let d = date(9);
    {
        let store = SqliteStore::open(&path).unwrap();
        store.replace_for_date(d, &[hotspot(d, 28.55, 77.05, 0.88, Severity::Critical)]).unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.load_for_date(d).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].severity, Severity::Critical);
    assert_eq!(loaded[0].risk_factors.rainfall_source, WeatherSource::Simulated);
}
