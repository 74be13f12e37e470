use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Defaults applied when a provider returns rainfall but no temperature/humidity
pub const DEFAULT_TEMPERATURE_C: f64 = 30.0;
pub const DEFAULT_HUMIDITY_PERCENT: u8 = 70;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Http(String),
    #[error("Weather service returned status {0}")]
    Status(u16),
    #[error("Could not parse weather response: {0}")]
    Parse(String),
    #[error("No weather record for {0}")]
    NotFound(String),
    #[error("Weather provider returned no {0}")]
    MissingValue(&'static str),
    #[error("Weather provider returned invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("Date {0} is beyond the forecast horizon")]
    OutOfRange(String),
    #[error("Historical store error: {0}")]
    Storage(String),
    #[error("Invalid weather configuration: {0}")]
    Config(String),
}

/// Where a weather reading came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Open-Meteo archive or forecast
    Live,
    /// Recorded observation from the historical table
    Historical,
    /// Fixed value supplied by the operator ("what-if" run)
    Simulated,
    /// Seasonal estimate used when nothing else answered
    Seasonal,
}

impl WeatherSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSource::Live => "live",
            WeatherSource::Historical => "historical",
            WeatherSource::Simulated => "simulated",
            WeatherSource::Seasonal => "seasonal",
        }
    }
}

impl fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(WeatherSource::Live),
            "historical" => Ok(WeatherSource::Historical),
            "simulated" => Ok(WeatherSource::Simulated),
            "seasonal" => Ok(WeatherSource::Seasonal),
            other => Err(format!("unknown weather source '{}'", other)),
        }
    }
}

/// Reading as a provider returned it, before sanitising
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawWeather {
    pub rainfall_24h_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
}

impl RawWeather {
    pub fn rainfall(mm: f64) -> Self {
        Self { rainfall_24h_mm: Some(mm), ..Default::default() }
    }
}

/// Sanitised daily weather for the prediction region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub rainfall_24h_mm: f64,
    pub temperature_c: f64,
    /// Whole percent, 0..=100
    pub humidity_percent: u8,
}

/// Weather as used by a run, with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeather {
    pub observation: WeatherObservation,
    pub source: WeatherSource,
    pub provider: String,
    /// True when the seasonal fallback had to be used
    pub degraded: bool,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ResolvedWeather {
    pub fn rainfall_mm(&self) -> f64 {
        self.observation.rainfall_24h_mm
    }
}

/// Validate a raw reading.
///
/// Missing or non-finite rainfall is an error so the caller can move on to
/// the next provider. Negative rainfall is clamped to zero and noted.
pub fn sanitize(raw: RawWeather, notes: &mut Vec<String>) -> Result<WeatherObservation, WeatherError> {
    let rainfall = raw.rainfall_24h_mm.ok_or(WeatherError::MissingValue("rainfall"))?;
    if !rainfall.is_finite() {
        return Err(WeatherError::InvalidValue { field: "rainfall", value: rainfall });
    }
    let rainfall = if rainfall < 0.0 {
        notes.push(format!("negative rainfall {} mm clamped to 0", rainfall));
        0.0
    } else {
        rainfall
    };

    let temperature_c = match raw.temperature_c {
        Some(t) if t.is_finite() => t,
        _ => DEFAULT_TEMPERATURE_C,
    };
    let humidity_percent = match raw.humidity_percent {
        Some(h) if h.is_finite() => h.clamp(0.0, 100.0).round() as u8,
        _ => DEFAULT_HUMIDITY_PERCENT,
    };

    Ok(WeatherObservation { rainfall_24h_mm: rainfall, temperature_c, humidity_percent })
}
