//! Predicted hotspot model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use validator::Validate;

use waterlog_core::logic::store::{DateCount, SeverityCount, RECENT_DATES_LIMIT};
use waterlog_core::{Hotspot, PredictionStats, RiskFactors, Severity, WeatherSource};

use crate::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct HotspotRow {
    pub prediction_date: NaiveDate,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub severity: String,
    pub confidence_score: f64,
    pub predicted_rainfall_mm: f64,
    pub risk_factors: Json<RiskFactors>,
    pub radius_meters: i32,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DatePredictionsResponse {
    pub date: NaiveDate,
    pub hotspots: Vec<Hotspot>,
    pub model_version: Option<String>,
    pub total_count: usize,
}

impl DatePredictionsResponse {
    pub fn new(date: NaiveDate, hotspots: Vec<Hotspot>) -> Self {
        Self {
            date,
            model_version: hotspots.first().map(|h| h.model_version.clone()),
            total_count: hotspots.len(),
            hotspots,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    pub date: String,
    /// Forces a what-if run with this 24h rainfall
    #[validate(range(min = 0.0, max = 2000.0))]
    pub rainfall_mm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub date: NaiveDate,
    pub status: String,
    pub run_id: String,
    pub model_version: String,
    pub hotspot_count: usize,
    pub persisted: usize,
    pub weather_source: WeatherSource,
    pub rainfall_mm: f64,
    pub degraded: bool,
}

impl HotspotRow {
    pub fn into_hotspot(self) -> Result<Hotspot, AppError> {
        let severity: Severity = self
            .severity
            .parse()
            .map_err(|e: String| AppError::DatabaseError(format!("corrupt hotspot row: {}", e)))?;
        let radius_meters = u32::try_from(self.radius_meters)
            .map_err(|_| AppError::DatabaseError(format!("corrupt radius {}", self.radius_meters)))?;

        Ok(Hotspot {
            prediction_date: self.prediction_date,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            severity,
            confidence_score: self.confidence_score,
            predicted_rainfall_mm: self.predicted_rainfall_mm,
            risk_factors: self.risk_factors.0,
            radius_meters,
            model_version: self.model_version,
            created_at: self.created_at,
        })
    }

    /// Hotspots for a date, highest confidence first
    pub async fn find_by_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, HotspotRow>(
            r#"
            SELECT prediction_date, name, lat, lng, severity, confidence_score,
                   predicted_rainfall_mm, risk_factors, radius_meters, model_version, created_at
            FROM predicted_hotspots
            WHERE prediction_date = $1
            ORDER BY confidence_score DESC, id ASC
            "#
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// Delete the date's rows and insert `hotspots` in one transaction
    pub async fn replace_for_date(
        pool: &PgPool,
        date: NaiveDate,
        hotspots: &[Hotspot],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM predicted_hotspots WHERE prediction_date = $1")
            .bind(date)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for h in hotspots {
            let radius = radius_column(h.radius_meters)?;
            sqlx::query(
                r#"
                INSERT INTO predicted_hotspots
                    (prediction_date, name, lat, lng, severity, confidence_score,
                     predicted_rainfall_mm, risk_factors, radius_meters, model_version, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#
            )
            .bind(h.prediction_date)
            .bind(&h.name)
            .bind(h.lat)
            .bind(h.lng)
            .bind(h.severity.as_str())
            .bind(h.confidence_score)
            .bind(h.predicted_rainfall_mm)
            .bind(Json(&h.risk_factors))
            .bind(radius)
            .bind(&h.model_version)
            .bind(h.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!("Replaced {} hotspots for {} with {}", deleted, date, hotspots.len());
        Ok(hotspots.len())
    }

    pub async fn stats(pool: &PgPool) -> Result<PredictionStats, sqlx::Error> {
        let total: i64 = sqlx::query("SELECT COUNT(DISTINCT prediction_date) AS total FROM predicted_hotspots")
            .fetch_one(pool)
            .await?
            .get("total");

        let rows = sqlx::query("SELECT severity, COUNT(*) AS count FROM predicted_hotspots GROUP BY severity")
            .fetch_all(pool)
            .await?;
        let mut severity_breakdown = rows
            .iter()
            .map(|row| severity_count(&row.get::<String, _>("severity"), row.get("count")))
            .collect::<Result<Vec<_>, _>>()?;
        severity_breakdown.sort_by(|a, b| b.severity.cmp(&a.severity));

        let recent_predictions = sqlx::query(
            r#"
            SELECT prediction_date, COUNT(*) AS hotspot_count
            FROM predicted_hotspots
            GROUP BY prediction_date
            ORDER BY prediction_date DESC
            LIMIT $1
            "#
        )
        .bind(RECENT_DATES_LIMIT as i64)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| DateCount {
            prediction_date: row.get("prediction_date"),
            hotspot_count: row.get::<i64, _>("hotspot_count").max(0) as u64,
        })
        .collect();

        Ok(PredictionStats {
            total_prediction_dates: total.max(0) as u64,
            severity_breakdown,
            recent_predictions,
        })
    }
}

/// `radius_meters` is an INTEGER column; refuse values it cannot hold
fn radius_column(radius: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(radius).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// An unknown severity means the table was written by something else
fn severity_count(name: &str, count: i64) -> Result<SeverityCount, sqlx::Error> {
    let severity: Severity = name
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(format!("corrupt severity column: {}", e).into()))?;
    Ok(SeverityCount { severity, count: count.max(0) as u64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(severity: &str) -> HotspotRow {
        HotspotRow {
            prediction_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            name: "Minto Bridge Area".to_string(),
            lat: 28.633,
            lng: 77.2285,
            severity: severity.to_string(),
            confidence_score: 0.91,
            predicted_rainfall_mm: 150.0,
            risk_factors: Json(RiskFactors {
                high_rainfall: true,
                very_high_rainfall: true,
                cluster_size: 12,
                max_risk_score: 0.97,
                rainfall_source: WeatherSource::Simulated,
                degraded_weather: false,
            }),
            radius_meters: 450,
            model_version: "v2.0.0".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 7, 15, 6, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_row_into_hotspot() {
        let h = row("Critical").into_hotspot().unwrap();
        assert_eq!(h.severity, Severity::Critical);
        assert_eq!(h.radius_meters, 450);
        assert_eq!(h.risk_factors.cluster_size, 12);
    }

    #[test]
    fn test_corrupt_severity_rejected() {
        assert!(matches!(row("Extreme").into_hotspot(), Err(AppError::DatabaseError(_))));
    }

    #[test]
    fn test_radius_out_of_column_range_rejected() {
        assert_eq!(radius_column(450).unwrap(), 450);
        assert_eq!(radius_column(i32::MAX as u32).unwrap(), i32::MAX);
        assert!(matches!(radius_column(u32::MAX), Err(sqlx::Error::Encode(_))));
    }

    #[test]
    fn test_unknown_severity_in_stats_rejected() {
        let c = severity_count("High", 4).unwrap();
        assert_eq!(c, SeverityCount { severity: Severity::High, count: 4 });
        assert!(matches!(severity_count("Extreme", 1), Err(sqlx::Error::Decode(_))));
    }

    #[test]
    fn test_date_response_takes_model_version_from_rows() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let h = row("High").into_hotspot().unwrap();
        let resp = DatePredictionsResponse::new(date, vec![h]);
        assert_eq!(resp.total_count, 1);
        assert_eq!(resp.model_version.as_deref(), Some("v2.0.0"));

        let empty = DatePredictionsResponse::new(date, Vec::new());
        assert_eq!(empty.total_count, 0);
        assert!(empty.model_version.is_none());
    }

    #[test]
    fn test_generate_request_validation() {
        let ok = GenerateRequest { date: "2024-07-15".into(), rainfall_mm: Some(150.0) };
        assert!(ok.validate().is_ok());

        let negative = GenerateRequest { date: "2024-07-15".into(), rainfall_mm: Some(-3.0) };
        assert!(negative.validate().is_err());

        let unset = GenerateRequest { date: "2024-07-15".into(), rainfall_mm: None };
        assert!(unset.validate().is_ok());
    }
}
