//! Waterlog Cloud Server
//!
//! Serves stored hotspot predictions and lets an authority trigger a run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WATERLOG CLOUD                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Prediction Pipeline    │ │
//! │  │  Gateway  │  │  (JWT)    │  │  (spawn_blocking)       │ │
//! │  │  (Axum)   │  │           │  │  waterlog-core          │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │                ┌─────────────┐                             │
//! │                │ PostgreSQL  │                             │
//! │                └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod handlers;
mod middleware;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context};
use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waterlog_core::{ModelRegistry, PipelineConfig, ReferenceData};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "waterlog_cloud=debug,waterlog_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Waterlog Cloud Server starting ({})...", config.environment);
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    if config.is_production() && std::env::var("JWT_SECRET").is_err() {
        bail!("JWT_SECRET must be set in production");
    }

    let pipeline_config = match &config.pipeline_config_path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading pipeline config {}", path.display()))?,
        None => PipelineConfig::from_env(),
    };
    pipeline_config.validate().context("invalid pipeline config")?;

    let reference = match &config.reference_data_path {
        Some(path) => ReferenceData::load(path)
            .with_context(|| format!("loading reference data {}", path.display()))?,
        None => ReferenceData::delhi(),
    };

    // A missing model is not fatal: reads still work, runs answer 503
    let models = ModelRegistry::new();
    match models.load(&config.model_bundle_path, config.model_bundle_sha256.as_deref()) {
        Ok(()) => tracing::info!("Model bundle loaded from {}", config.model_bundle_path.display()),
        Err(e) => tracing::warn!(
            "Model bundle {} not loaded: {}",
            config.model_bundle_path.display(),
            e
        ),
    }

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        models: Arc::new(models),
        reference: Arc::new(reference),
        pipeline_config,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub models: Arc<ModelRegistry>,
    pub reference: Arc<ReferenceData>,
    pub pipeline_config: PipelineConfig,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/predictions/date/:date", get(handlers::predictions::by_date))
        .route("/api/predictions/stats", get(handlers::predictions::stats))
        .route("/api/model/metrics", get(handlers::model::metrics));

    // Authority routes (JWT with role `authority`)
    let authority_routes = Router::new()
        .route("/api/predictions/generate", post(handlers::predictions::generate))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_authority
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(authority_routes)
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
