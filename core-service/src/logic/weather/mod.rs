//! Weather Module
//!
//! Daily rainfall for the prediction date from live, historical or fixed
//! providers, with a seasonal estimate as the last resort.

pub mod historical;
pub mod open_meteo;
pub mod provider;
pub mod resolver;
pub mod seasonal;
pub mod types;

pub use historical::SqliteRainfallProvider;
pub use open_meteo::OpenMeteoProvider;
pub use provider::{FixedWeatherProvider, WeatherProvider};
pub use resolver::WeatherResolver;
pub use seasonal::seasonal_estimate;
pub use types::{
    RawWeather, ResolvedWeather, WeatherError, WeatherObservation, WeatherSource, DEFAULT_HUMIDITY_PERCENT,
    DEFAULT_TEMPERATURE_C,
};
