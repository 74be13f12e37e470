use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::weather::WeatherSource;

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    /// Severity band for a cluster's maximum risk
    pub fn from_max_risk(max_risk: f64) -> Self {
        if max_risk > 0.85 {
            Severity::Critical
        } else if max_risk > 0.75 {
            Severity::High
        } else if max_risk > 0.65 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown severity '{}'", s))
    }
}

/// Structured explanation stored alongside every hotspot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub high_rainfall: bool,
    pub very_high_rainfall: bool,
    pub cluster_size: usize,
    pub max_risk_score: f64,
    pub rainfall_source: WeatherSource,
    #[serde(default)]
    pub degraded_weather: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub prediction_date: NaiveDate,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub severity: Severity,
    pub confidence_score: f64,
    pub predicted_rainfall_mm: f64,
    pub risk_factors: RiskFactors,
    pub radius_meters: u32,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_max_risk(0.99), Severity::Critical);
        assert_eq!(Severity::from_max_risk(0.86), Severity::Critical);
        assert_eq!(Severity::from_max_risk(0.85), Severity::High);
        assert_eq!(Severity::from_max_risk(0.76), Severity::High);
        assert_eq!(Severity::from_max_risk(0.75), Severity::Medium);
        assert_eq!(Severity::from_max_risk(0.66), Severity::Medium);
        assert_eq!(Severity::from_max_risk(0.65), Severity::Low);
        assert_eq!(Severity::from_max_risk(0.61), Severity::Low);
    }

    #[test]
    fn test_severity_is_monotone() {
        let mut last = Severity::Low;
        for i in 0..=1000 {
            let s = Severity::from_max_risk(i as f64 / 1000.0);
            assert!(s >= last);
            last = s;
        }
        assert_eq!(last, Severity::Critical);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("Medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn test_risk_factors_json() {
        let rf = RiskFactors {
            high_rainfall: true,
            very_high_rainfall: false,
            cluster_size: 12,
            max_risk_score: 0.91,
            rainfall_source: WeatherSource::Historical,
            degraded_weather: false,
        };
        let json = serde_json::to_value(&rf).unwrap();
        assert_eq!(json["rainfall_source"], "historical");
        assert_eq!(json["cluster_size"], 12);
    }
}
