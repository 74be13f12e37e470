//! Recorded rainfall kept in the local SQLite database
//!
//! One row per calendar day. Imported observations win over live lookups
//! because they are what the model was trained against.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::provider::WeatherProvider;
use super::types::{RawWeather, WeatherError, WeatherObservation, WeatherSource};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS historical_rainfall (
        record_date TEXT PRIMARY KEY,
        rainfall_24h REAL NOT NULL,
        temperature_c REAL,
        humidity_percent INTEGER
    );
";

pub struct SqliteRainfallProvider {
    conn: Mutex<Connection>,
}

impl SqliteRainfallProvider {
    pub fn open(path: &Path) -> Result<Self, WeatherError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| WeatherError::Storage(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(storage)?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self, WeatherError> {
        Self::init(Connection::open_in_memory().map_err(storage)?)
    }

    fn init(conn: Connection) -> Result<Self, WeatherError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Insert or overwrite the record for `date`
    pub fn record(&self, date: NaiveDate, obs: &WeatherObservation) -> Result<(), WeatherError> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO historical_rainfall (record_date, rainfall_24h, temperature_c, humidity_percent)
                 VALUES (?1, ?2, ?3, ?4)",
                params![date.to_string(), obs.rainfall_24h_mm, obs.temperature_c, obs.humidity_percent],
            )
            .map_err(storage)?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, WeatherError> {
        let n: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM historical_rainfall", [], |row| row.get(0))
            .map_err(storage)?;
        Ok(n.max(0) as usize)
    }
}

fn storage(e: rusqlite::Error) -> WeatherError {
    WeatherError::Storage(e.to_string())
}

impl WeatherProvider for SqliteRainfallProvider {
    fn name(&self) -> &str {
        "historical-sqlite"
    }

    fn source(&self) -> WeatherSource {
        WeatherSource::Historical
    }

    fn fetch(&self, date: NaiveDate) -> Result<RawWeather, WeatherError> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT rainfall_24h, temperature_c, humidity_percent
                 FROM historical_rainfall WHERE record_date = ?1 LIMIT 1",
                params![date.to_string()],
                |row| {
                    Ok(RawWeather {
                        rainfall_24h_mm: row.get::<_, Option<f64>>(0)?,
                        temperature_c: row.get::<_, Option<f64>>(1)?,
                        humidity_percent: row.get::<_, Option<f64>>(2)?,
                    })
                },
            )
            .optional()
            .map_err(storage)?;

        row.ok_or_else(|| WeatherError::NotFound(date.to_string()))
    }
}
