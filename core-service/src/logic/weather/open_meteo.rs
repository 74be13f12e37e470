//! Open-Meteo client
//!
//! Past dates (today included) go to the archive API, future dates to the
//! forecast API. Daily precipitation sum, max temperature and max relative
//! humidity are requested for a single day at the region centre.

use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_WEATHER_LAT, DEFAULT_WEATHER_LNG, OPEN_METEO_ARCHIVE_URL, OPEN_METEO_FORECAST_URL,
};
use crate::logic::geo::GeoPoint;

use super::provider::WeatherProvider;
use super::types::{RawWeather, WeatherError, WeatherSource};

/// Forecast API serves today plus 15 days
pub const FORECAST_HORIZON_DAYS: i64 = 15;

const DAILY_FIELDS: &str = "precipitation_sum,temperature_2m_max,relative_humidity_2m_max";
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Archive,
    Forecast,
}

/// Pick the endpoint for `date` as seen from `today`
pub fn endpoint_for(date: NaiveDate, today: NaiveDate) -> Result<Endpoint, WeatherError> {
    if date <= today {
        return Ok(Endpoint::Archive);
    }
    if (date - today).num_days() > FORECAST_HORIZON_DAYS {
        return Err(WeatherError::OutOfRange(date.to_string()));
    }
    Ok(Endpoint::Forecast)
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_max: Vec<Option<f64>>,
}

/// Extract the first day of a daily response body
pub fn parse_daily(body: &str) -> Result<RawWeather, WeatherError> {
    let response: DailyResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    let daily = response
        .daily
        .ok_or_else(|| WeatherError::Parse("response has no 'daily' block".to_string()))?;

    Ok(RawWeather {
        rainfall_24h_mm: daily.precipitation_sum.first().copied().flatten(),
        temperature_c: daily.temperature_2m_max.first().copied().flatten(),
        humidity_percent: daily.relative_humidity_2m_max.first().copied().flatten(),
    })
}

pub struct OpenMeteoProvider {
    agent: ureq::Agent,
    location: GeoPoint,
    archive_url: String,
    forecast_url: String,
    max_attempts: u32,
}

impl OpenMeteoProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            location: GeoPoint::new(DEFAULT_WEATHER_LAT, DEFAULT_WEATHER_LNG),
            archive_url: OPEN_METEO_ARCHIVE_URL.to_string(),
            forecast_url: OPEN_METEO_FORECAST_URL.to_string(),
            max_attempts: 2,
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = location;
        self
    }

    pub fn with_base_urls(mut self, archive_url: &str, forecast_url: &str) -> Self {
        self.archive_url = archive_url.to_string();
        self.forecast_url = forecast_url.to_string();
        self
    }

    fn request(&self, endpoint: Endpoint, date: NaiveDate) -> Result<RawWeather, WeatherError> {
        let url = match endpoint {
            Endpoint::Archive => &self.archive_url,
            Endpoint::Forecast => &self.forecast_url,
        };
        let day = date.format("%Y-%m-%d").to_string();

        let response = self
            .agent
            .get(url)
            .query("latitude", &self.location.lat.to_string())
            .query("longitude", &self.location.lng.to_string())
            .query("start_date", &day)
            .query("end_date", &day)
            .query("daily", DAILY_FIELDS)
            .query("timezone", "auto")
            .call();

        match response {
            Ok(resp) => {
                let body = resp
                    .into_string()
                    .map_err(|e| WeatherError::Http(e.to_string()))?;
                parse_daily(&body)
            }
            Err(ureq::Error::Status(code, _)) => Err(WeatherError::Status(code)),
            Err(e) => Err(WeatherError::Http(e.to_string())),
        }
    }
}

fn is_retryable(err: &WeatherError) -> bool {
    match err {
        WeatherError::Http(_) => true,
        WeatherError::Status(code) => *code >= 500 || *code == 429,
        _ => false,
    }
}

impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &str {
        "open-meteo"
    }

    fn source(&self) -> WeatherSource {
        WeatherSource::Live
    }

    fn fetch(&self, date: NaiveDate) -> Result<RawWeather, WeatherError> {
        let endpoint = endpoint_for(date, Utc::now().date_naive())?;

        let mut attempt = 1;
        loop {
            match self.request(endpoint, date) {
                Ok(raw) => return Ok(raw),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    log::warn!("Open-Meteo attempt {} failed ({}), retrying", attempt, e);
                    attempt += 1;
                    thread::sleep(RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
