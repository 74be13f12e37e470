use std::sync::Arc;

use chrono::NaiveDate;

use super::provider::WeatherProvider;
use super::seasonal::seasonal_estimate;
use super::types::{sanitize, ResolvedWeather, WeatherSource};

/// Tries providers in order; the first valid reading wins. When all of them
/// fail the seasonal estimate is used and the result is flagged degraded.
#[derive(Clone, Default)]
pub struct WeatherResolver {
    providers: Vec<Arc<dyn WeatherProvider>>,
}

impl WeatherResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Never fails
    pub fn resolve(&self, date: NaiveDate) -> ResolvedWeather {
        let mut notes = Vec::new();

        for provider in &self.providers {
            let attempt = provider.fetch(date).and_then(|raw| sanitize(raw, &mut notes));
            match attempt {
                Ok(observation) => {
                    log::info!(
                        "Weather for {} from {}: {:.1} mm",
                        date,
                        provider.name(),
                        observation.rainfall_24h_mm
                    );
                    return ResolvedWeather {
                        observation,
                        source: provider.source(),
                        provider: provider.name().to_string(),
                        degraded: false,
                        notes,
                    };
                }
                Err(e) => {
                    log::warn!("Weather provider {} failed for {}: {}", provider.name(), date, e);
                    notes.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        let observation = seasonal_estimate(date);
        log::warn!(
            "No weather provider answered for {}, using seasonal estimate {:.1} mm",
            date,
            observation.rainfall_24h_mm
        );
        ResolvedWeather {
            observation,
            source: WeatherSource::Seasonal,
            provider: "seasonal".to_string(),
            degraded: true,
            notes,
        }
    }
}
