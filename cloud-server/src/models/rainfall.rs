//! Historical rainfall model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use waterlog_core::logic::weather::RawWeather;
use waterlog_core::{FixedWeatherProvider, WeatherSource};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RainfallRecord {
    pub record_date: NaiveDate,
    pub rainfall_24h: f64,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<i32>,
}

impl RainfallRecord {
    pub async fn find_by_date(pool: &PgPool, date: NaiveDate) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RainfallRecord>(
            "SELECT record_date, rainfall_24h, temperature_c, humidity_percent
             FROM historical_rainfall WHERE record_date = $1"
        )
        .bind(date)
        .fetch_optional(pool)
        .await
    }

    pub fn to_raw(&self) -> RawWeather {
        RawWeather {
            rainfall_24h_mm: Some(self.rainfall_24h),
            temperature_c: self.temperature_c,
            humidity_percent: self.humidity_percent.map(f64::from),
        }
    }

    /// Prefetched row served to the blocking pipeline as a historical provider
    pub fn into_provider(self) -> FixedWeatherProvider {
        FixedWeatherProvider::new("historical-postgres", WeatherSource::Historical, self.to_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterlog_core::WeatherProvider;

    #[test]
    fn test_record_serves_as_historical_provider() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 9).unwrap();
        let record = RainfallRecord {
            record_date: date,
            rainfall_24h: 153.0,
            temperature_c: Some(29.5),
            humidity_percent: Some(88),
        };

        let provider = record.into_provider();
        assert_eq!(provider.source(), WeatherSource::Historical);
        let raw = provider.fetch(date).unwrap();
        assert_eq!(raw.rainfall_24h_mm, Some(153.0));
        assert_eq!(raw.temperature_c, Some(29.5));
        assert_eq!(raw.humidity_percent, Some(88.0));
    }
}
