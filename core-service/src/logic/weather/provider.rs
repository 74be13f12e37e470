use chrono::NaiveDate;

use super::types::{RawWeather, WeatherError, WeatherSource};

/// A source of daily weather for the prediction region
pub trait WeatherProvider: Send + Sync {
    /// Short name for logs and run metadata
    fn name(&self) -> &str;

    fn source(&self) -> WeatherSource;

    fn fetch(&self, date: NaiveDate) -> Result<RawWeather, WeatherError>;
}

/// Returns the same reading for every date.
///
/// Used for simulation runs and for readings prefetched elsewhere.
#[derive(Debug, Clone)]
pub struct FixedWeatherProvider {
    name: String,
    source: WeatherSource,
    reading: RawWeather,
}

impl FixedWeatherProvider {
    /// Operator-supplied rainfall. Rejects negative or non-finite values.
    pub fn simulated(rainfall_mm: f64) -> Result<Self, WeatherError> {
        if !rainfall_mm.is_finite() || rainfall_mm < 0.0 {
            return Err(WeatherError::Config(format!(
                "simulated rainfall must be a finite value >= 0, got {}",
                rainfall_mm
            )));
        }
        Ok(Self::new("simulation", WeatherSource::Simulated, RawWeather::rainfall(rainfall_mm)))
    }

    pub fn new(name: &str, source: WeatherSource, reading: RawWeather) -> Self {
        Self { name: name.to_string(), source, reading }
    }
}

impl WeatherProvider for FixedWeatherProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> WeatherSource {
        self.source
    }

    fn fetch(&self, _date: NaiveDate) -> Result<RawWeather, WeatherError> {
        Ok(self.reading)
    }
}
