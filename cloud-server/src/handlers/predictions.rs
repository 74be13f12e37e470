//! Prediction handlers

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::{Path, State}, Json};
use chrono::{NaiveDate, Utc};
use validator::Validate;

use waterlog_core::{
    FixedWeatherProvider, OpenMeteoProvider, Pipeline, PredictionStats, RunControl, WeatherResolver,
};

use crate::{AppError, AppResult, AppState};
use crate::middleware::auth::AuthorityContext;
use crate::models::{DatePredictionsResponse, GenerateRequest, GenerateResponse, HotspotRow, RainfallRecord};

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Stored hotspots for a date
pub async fn by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<DatePredictionsResponse>> {
    let date = parse_date(&date)?;
    let hotspots = HotspotRow::find_by_date(&state.pool, date)
        .await?
        .into_iter()
        .map(HotspotRow::into_hotspot)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DatePredictionsResponse::new(date, hotspots)))
}

/// Aggregate statistics over all stored predictions
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<PredictionStats>> {
    Ok(Json(HotspotRow::stats(&state.pool).await?))
}

/// Run the pipeline for a date and replace its stored hotspots
pub async fn generate(
    State(state): State<AppState>,
    caller: AuthorityContext,
    Json(req): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    let date = parse_date(&req.date)?;

    tracing::info!(
        "Prediction run for {} requested by {} ({})",
        date, caller.subject, caller.role
    );

    let weather = build_resolver(&state, date, req.rainfall_mm).await?;
    let pipeline = Pipeline::new(
        state.pipeline_config.clone(),
        state.reference.clone(),
        state.models.clone(),
        weather,
    )?;

    // Grid scoring and the live weather lookup both block
    let run = tokio::task::spawn_blocking(move || {
        pipeline.compute(date, Utc::now(), &RunControl::new())
    })
    .await
    .map_err(|e| AppError::InternalError(format!("prediction task failed: {}", e)))??;

    let persisted = HotspotRow::replace_for_date(&state.pool, date, &run.hotspots)
        .await
        .map_err(|e| AppError::PersistenceFailed(format!(
            "{} hotspots for {}: {}",
            run.hotspots.len(), date, e
        )))?;

    Ok(Json(GenerateResponse {
        date,
        status: "success".to_string(),
        run_id: run.run_id.to_string(),
        model_version: run.model_version.clone(),
        hotspot_count: run.hotspots.len(),
        persisted,
        weather_source: run.weather.source,
        rainfall_mm: run.weather.rainfall_mm(),
        degraded: run.weather.degraded,
    }))
}

/// A forced rainfall replaces every lookup. Otherwise the stored
/// observation for the date, then Open-Meteo; the pipeline falls back to
/// the seasonal estimate when both fail.
async fn build_resolver(
    state: &AppState,
    date: NaiveDate,
    rainfall_mm: Option<f64>,
) -> AppResult<WeatherResolver> {
    if let Some(mm) = rainfall_mm {
        let fixed = FixedWeatherProvider::simulated(mm)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        return Ok(WeatherResolver::new().with_provider(Arc::new(fixed)));
    }

    let mut resolver = WeatherResolver::new();
    match RainfallRecord::find_by_date(&state.pool, date).await {
        Ok(Some(record)) => resolver = resolver.with_provider(Arc::new(record.into_provider())),
        Ok(None) => tracing::debug!("No stored rainfall for {}", date),
        Err(e) => tracing::warn!("Historical rainfall lookup failed: {}", e),
    }
    if state.pipeline_config.live_weather {
        let timeout = Duration::from_secs(state.pipeline_config.weather_timeout_secs);
        resolver = resolver.with_provider(Arc::new(OpenMeteoProvider::new(timeout)));
    }
    Ok(resolver)
}
