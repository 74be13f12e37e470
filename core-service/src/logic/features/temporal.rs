//! Temporal Feature Extraction
//!
//! Calendar features for the prediction date. Day and month also get a
//! sin/cos encoding so December and January sit next to each other.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use super::vector::{FeatureExtractor, FeatureVector};

/// Months historically associated with the monsoon
pub const MONSOON_MONTHS: RangeInclusive<u32> = 6..=9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalFeatures {
    pub day_of_year: u32,
    pub month: u32,
}

impl TemporalFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day_of_year: date.ordinal(),
            month: date.month(),
        }
    }

    pub fn is_monsoon(&self) -> bool {
        MONSOON_MONTHS.contains(&self.month)
    }

    pub fn day_angle(&self) -> f64 {
        2.0 * PI * self.day_of_year as f64 / 365.0
    }

    pub fn month_angle(&self) -> f64 {
        2.0 * PI * self.month as f64 / 12.0
    }
}

impl FeatureExtractor for TemporalFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[8] = self.day_of_year as f64;
        vector.values[9] = self.month as f64;
        vector.values[10] = if self.is_monsoon() { 1.0 } else { 0.0 };
        vector.values[11] = self.day_angle().sin();
        vector.values[12] = self.day_angle().cos();
        vector.values[13] = self.month_angle().sin();
        vector.values[14] = self.month_angle().cos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monsoon_flag() {
        assert!(!TemporalFeatures::from_date(date(2024, 5, 31)).is_monsoon());
        assert!(TemporalFeatures::from_date(date(2024, 6, 1)).is_monsoon());
        assert!(TemporalFeatures::from_date(date(2024, 9, 30)).is_monsoon());
        assert!(!TemporalFeatures::from_date(date(2024, 10, 1)).is_monsoon());
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(TemporalFeatures::from_date(date(2023, 1, 1)).day_of_year, 1);
        assert_eq!(TemporalFeatures::from_date(date(2024, 12, 31)).day_of_year, 366);
    }

    #[test]
    fn test_cyclical_continuity_across_new_year() {
        let dec = TemporalFeatures::from_date(date(2023, 12, 31));
        let jan = TemporalFeatures::from_date(date(2024, 1, 1));
        let mut a = FeatureVector::new();
        let mut b = FeatureVector::new();
        dec.extract(&mut a);
        jan.extract(&mut b);

        // Raw day jumps by 364, the encoded position barely moves
        assert_eq!(a.values[8] - b.values[8], 364.0);
        assert!((a.values[11] - b.values[11]).abs() < 0.05);
        assert!((a.values[12] - b.values[12]).abs() < 0.05);
    }

    #[test]
    fn test_extract_slots() {
        let mut v = FeatureVector::new();
        TemporalFeatures::from_date(date(2024, 7, 15)).extract(&mut v);
        assert_eq!(v.get_by_name("month"), Some(7.0));
        assert_eq!(v.get_by_name("is_monsoon"), Some(1.0));
        let expected = (2.0 * PI * 7.0 / 12.0).sin();
        assert!((v.get_by_name("month_sin").unwrap() - expected).abs() < 1e-12);
        // Rainfall slots untouched
        assert_eq!(v.get_by_name("rainfall_24h"), Some(0.0));
    }
}
