//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Hotspots, replaced per prediction date
CREATE TABLE IF NOT EXISTS predicted_hotspots (
    id BIGSERIAL PRIMARY KEY,
    prediction_date DATE NOT NULL,
    name VARCHAR(255) NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lng DOUBLE PRECISION NOT NULL,
    severity VARCHAR(20) NOT NULL,
    confidence_score DOUBLE PRECISION NOT NULL,
    predicted_rainfall_mm DOUBLE PRECISION NOT NULL,
    risk_factors JSONB NOT NULL,
    radius_meters INT NOT NULL,
    model_version VARCHAR(50) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    UNIQUE (prediction_date, lat, lng)
);

-- Observed daily rainfall, preferred over live lookups
CREATE TABLE IF NOT EXISTS historical_rainfall (
    record_date DATE PRIMARY KEY,
    rainfall_24h DOUBLE PRECISION NOT NULL,
    temperature_c DOUBLE PRECISION,
    humidity_percent INTEGER CHECK (humidity_percent BETWEEN 0 AND 100)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_hotspots_date ON predicted_hotspots(prediction_date);
CREATE INDEX IF NOT EXISTS idx_hotspots_severity ON predicted_hotspots(severity);
"#;
