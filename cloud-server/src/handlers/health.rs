//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    model_version: Option<String>,
    reference_version: String,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.models.status();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: registry.model_loaded,
        model_version: registry.model_version,
        reference_version: state.reference.version.clone(),
    })
}
