//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! Every value can be overridden through a `WATERLOG_*` environment variable
//! or a pipeline config file (see `logic::config`).

/// Default prediction region: Delhi NCT bounding box
pub const DEFAULT_LAT_MIN: f64 = 28.4;
pub const DEFAULT_LAT_MAX: f64 = 28.9;
pub const DEFAULT_LNG_MIN: f64 = 76.8;
pub const DEFAULT_LNG_MAX: f64 = 77.4;

/// Grid resolution in degrees (~1 km)
pub const DEFAULT_GRID_STEP: f64 = 0.01;

/// Points scoring strictly above this are clustered
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.6;

/// DBSCAN neighbourhood radius in degrees.
/// Must stay strictly above the grid step, otherwise adjacent cells never connect.
pub const DEFAULT_CLUSTER_EPS: f64 = 0.012;

/// DBSCAN minimum neighbourhood size (the point itself included)
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Smallest radius a hotspot is ever drawn with
pub const DEFAULT_MIN_RADIUS_METERS: u32 = 200;

/// Fixed padding added to every cluster radius
pub const DEFAULT_RADIUS_BUFFER_METERS: u32 = 100;

/// Live weather request timeout (seconds)
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;

/// Inference batch size
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Degrees → metres (flat-earth approximation used for radii)
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Degrees → kilometres (used by the distance-to-risk-zone feature)
pub const KM_PER_DEGREE: f64 = 111.0;

/// Centre of the default region, used for city-wide weather lookups
pub const DEFAULT_WEATHER_LAT: f64 = 28.6139;
pub const DEFAULT_WEATHER_LNG: f64 = 77.2090;

/// Open-Meteo endpoints
pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Default SQLite database file name (under the local data dir)
pub const DEFAULT_DB_FILE: &str = "predictions.db";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "waterlog";

// ============================================
// Environment overrides (read by `logic::config`)
// ============================================

pub const ENV_RISK_THRESHOLD: &str = "WATERLOG_RISK_THRESHOLD";
pub const ENV_GRID_STEP: &str = "WATERLOG_GRID_STEP";
pub const ENV_CLUSTER_EPS: &str = "WATERLOG_CLUSTER_EPS";
pub const ENV_MIN_SAMPLES: &str = "WATERLOG_MIN_SAMPLES";
pub const ENV_WEATHER_TIMEOUT: &str = "WATERLOG_WEATHER_TIMEOUT";
pub const ENV_LIVE_WEATHER: &str = "WATERLOG_LIVE_WEATHER";

/// Default database path: `<data_local_dir>/waterlog/predictions.db`
pub fn get_default_db_path() -> std::path::PathBuf {
    std::env::var("WATERLOG_DB_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(APP_NAME)
                .join(DEFAULT_DB_FILE)
        })
}
