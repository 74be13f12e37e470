//! SQLite-backed prediction store

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::logic::hotspot::{Hotspot, RiskFactors, Severity};

use super::types::{DateCount, PredictionStats, SeverityCount, StoreError, RECENT_DATES_LIMIT};
use super::{check_replace, PredictionStore};

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;
    PRAGMA synchronous=NORMAL;
    CREATE TABLE IF NOT EXISTS predicted_hotspots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        prediction_date TEXT NOT NULL,
        name TEXT NOT NULL,
        lat REAL NOT NULL,
        lng REAL NOT NULL,
        severity TEXT NOT NULL,
        confidence_score REAL NOT NULL,
        predicted_rainfall_mm REAL NOT NULL,
        risk_factors TEXT NOT NULL,
        radius_meters INTEGER NOT NULL,
        model_version TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE(prediction_date, lat, lng)
    );
    CREATE INDEX IF NOT EXISTS idx_predicted_hotspots_date ON predicted_hotspots(prediction_date);
";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Row as stored, before parsing text columns
struct StoredRow {
    prediction_date: String,
    name: String,
    lat: f64,
    lng: f64,
    severity: String,
    confidence_score: f64,
    predicted_rainfall_mm: f64,
    risk_factors: String,
    radius_meters: i64,
    model_version: String,
    created_at: String,
}

impl StoredRow {
    fn into_hotspot(self) -> Result<Hotspot, StoreError> {
        let prediction_date = NaiveDate::parse_from_str(&self.prediction_date, DATE_FORMAT)
            .map_err(|e| StoreError::Corrupt(format!("prediction_date '{}': {}", self.prediction_date, e)))?;
        let severity: Severity = self.severity.parse().map_err(StoreError::Corrupt)?;
        let risk_factors: RiskFactors = serde_json::from_str(&self.risk_factors)?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::Corrupt(format!("created_at '{}': {}", self.created_at, e)))?
            .with_timezone(&Utc);
        let radius_meters = u32::try_from(self.radius_meters)
            .map_err(|_| StoreError::Corrupt(format!("radius_meters {}", self.radius_meters)))?;

        Ok(Hotspot {
            prediction_date,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            severity,
            confidence_score: self.confidence_score,
            predicted_rainfall_mm: self.predicted_rainfall_mm,
            risk_factors,
            radius_meters,
            model_version: self.model_version,
            created_at,
        })
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        log::debug!("Opened prediction store at {}", path.display());
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl PredictionStore for SqliteStore {
    fn replace_for_date(&self, date: NaiveDate, hotspots: &[Hotspot]) -> Result<usize, StoreError> {
        check_replace(date, hotspots)?;
        let day = date.format(DATE_FORMAT).to_string();

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM predicted_hotspots WHERE prediction_date = ?1", params![day])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO predicted_hotspots
                    (prediction_date, name, lat, lng, severity, confidence_score,
                     predicted_rainfall_mm, risk_factors, radius_meters, model_version, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for h in hotspots {
                stmt.execute(params![
                    day,
                    h.name,
                    h.lat,
                    h.lng,
                    h.severity.as_str(),
                    h.confidence_score,
                    h.predicted_rainfall_mm,
                    serde_json::to_string(&h.risk_factors)?,
                    h.radius_meters as i64,
                    h.model_version,
                    h.created_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        log::info!("Replaced predictions for {}: {} removed, {} inserted", day, removed, hotspots.len());
        Ok(hotspots.len())
    }

    fn load_for_date(&self, date: NaiveDate) -> Result<Vec<Hotspot>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT prediction_date, name, lat, lng, severity, confidence_score, predicted_rainfall_mm,
                    risk_factors, radius_meters, model_version, created_at
             FROM predicted_hotspots WHERE prediction_date = ?1
             ORDER BY confidence_score DESC, id ASC",
        )?;

        let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
            Ok(StoredRow {
                prediction_date: row.get(0)?,
                name: row.get(1)?,
                lat: row.get(2)?,
                lng: row.get(3)?,
                severity: row.get(4)?,
                confidence_score: row.get(5)?,
                predicted_rainfall_mm: row.get(6)?,
                risk_factors: row.get(7)?,
                radius_meters: row.get(8)?,
                model_version: row.get(9)?,
                created_at: row.get(10)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_hotspot()?);
        }
        Ok(out)
    }

    fn stats(&self) -> Result<PredictionStats, StoreError> {
        let conn = self.conn.lock();

        let total: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT prediction_date) FROM predicted_hotspots",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare("SELECT severity, COUNT(*) FROM predicted_hotspots GROUP BY severity")?;
        let mut severity_breakdown = Vec::new();
        for row in stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))? {
            let (severity, count) = row?;
            severity_breakdown.push(SeverityCount {
                severity: severity.parse().map_err(StoreError::Corrupt)?,
                count: count.max(0) as u64,
            });
        }
        severity_breakdown.sort_by(|a, b| b.severity.cmp(&a.severity));

        let mut stmt = conn.prepare(
            "SELECT prediction_date, COUNT(*) FROM predicted_hotspots
             GROUP BY prediction_date ORDER BY prediction_date DESC LIMIT ?1",
        )?;
        let mut recent_predictions = Vec::new();
        for row in stmt.query_map(params![RECENT_DATES_LIMIT as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })? {
            let (day, count) = row?;
            recent_predictions.push(DateCount {
                prediction_date: NaiveDate::parse_from_str(&day, DATE_FORMAT)
                    .map_err(|e| StoreError::Corrupt(format!("prediction_date '{}': {}", day, e)))?,
                hotspot_count: count.max(0) as u64,
            });
        }

        Ok(PredictionStats {
            total_prediction_dates: total.max(0) as u64,
            severity_breakdown,
            recent_predictions,
        })
    }
}
