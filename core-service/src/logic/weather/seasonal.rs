//! Seasonal fallback
//!
//! Used only when every configured provider failed. The estimate is drawn
//! from a generator seeded by the date, so reruns for the same date see the
//! same rainfall.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::logic::features::temporal::MONSOON_MONTHS;

use super::types::{WeatherObservation, DEFAULT_HUMIDITY_PERCENT, DEFAULT_TEMPERATURE_C};

pub const MONSOON_RAINFALL_MM: (f64, f64) = (40.0, 80.0);
pub const DRY_RAINFALL_MM: (f64, f64) = (0.0, 20.0);

pub fn seasonal_estimate(date: NaiveDate) -> WeatherObservation {
    let mut rng = StdRng::seed_from_u64(date.num_days_from_ce() as u64);
    let (low, high) = if MONSOON_MONTHS.contains(&date.month()) {
        MONSOON_RAINFALL_MM
    } else {
        DRY_RAINFALL_MM
    };

    WeatherObservation {
        rainfall_24h_mm: rng.gen_range(low..high),
        temperature_c: DEFAULT_TEMPERATURE_C,
        humidity_percent: DEFAULT_HUMIDITY_PERCENT,
    }
}
