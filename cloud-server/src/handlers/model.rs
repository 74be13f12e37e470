//! Model handlers

use axum::{extract::State, Json};
use serde::Serialize;

use waterlog_core::logic::features::LayoutInfo;
use waterlog_core::logic::model::RegistryStatus;
use waterlog_core::ModelSummary;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ModelMetricsResponse {
    pub model: ModelSummary,
    pub layout: LayoutInfo,
    pub registry: RegistryStatus,
}

/// Summary of the loaded model
pub async fn metrics(State(state): State<AppState>) -> AppResult<Json<ModelMetricsResponse>> {
    let model = state
        .models
        .current()
        .map_err(|_| AppError::ServiceUnavailable("Prediction model not loaded".to_string()))?;

    Ok(Json(ModelMetricsResponse {
        model: model.summary(),
        layout: LayoutInfo::current(),
        registry: state.models.status(),
    }))
}
