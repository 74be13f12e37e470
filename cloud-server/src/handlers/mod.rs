//! HTTP handlers

pub mod health;
pub mod model;
pub mod predictions;

use crate::AppError;

/// Fallback for unmatched routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
