//! Hotspot Assembler
//!
//! Turns clusters into persisted hotspot records: severity from the
//! cluster's max risk, confidence from its average, a human-readable name
//! and the risk factor blob.

use chrono::{DateTime, NaiveDate, Utc};

use crate::logic::clustering::Cluster;
use crate::logic::reference::ReferenceData;
use crate::logic::weather::WeatherSource;

use super::types::{Hotspot, RiskFactors, Severity};

pub const HIGH_RAINFALL_MM: f64 = 50.0;
pub const VERY_HIGH_RAINFALL_MM: f64 = 100.0;

/// Run-wide values every hotspot of a run shares
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyContext {
    pub prediction_date: NaiveDate,
    pub rainfall_mm: f64,
    pub rainfall_source: WeatherSource,
    pub degraded_weather: bool,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

pub struct HotspotAssembler<'a> {
    reference: &'a ReferenceData,
}

impl<'a> HotspotAssembler<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    pub fn assemble(&self, cluster: &Cluster, ctx: &AssemblyContext) -> Hotspot {
        let risk_factors = RiskFactors {
            high_rainfall: ctx.rainfall_mm > HIGH_RAINFALL_MM,
            very_high_rainfall: ctx.rainfall_mm > VERY_HIGH_RAINFALL_MM,
            cluster_size: cluster.size(),
            max_risk_score: cluster.max_risk,
            rainfall_source: ctx.rainfall_source,
            degraded_weather: ctx.degraded_weather,
        };

        Hotspot {
            prediction_date: ctx.prediction_date,
            name: self.reference.location_name(&cluster.centroid),
            lat: cluster.centroid.lat,
            lng: cluster.centroid.lng,
            severity: Severity::from_max_risk(cluster.max_risk),
            confidence_score: cluster.avg_risk.clamp(0.0, 1.0),
            predicted_rainfall_mm: ctx.rainfall_mm,
            risk_factors,
            radius_meters: cluster.radius_meters,
            model_version: ctx.model_version.clone(),
            created_at: ctx.created_at,
        }
    }

    pub fn assemble_all(&self, clusters: &[Cluster], ctx: &AssemblyContext) -> Vec<Hotspot> {
        clusters.iter().map(|c| self.assemble(c, ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clustering::ScoredPoint;
    use crate::logic::geo::GeoPoint;
    use chrono::TimeZone;

    fn ctx(rainfall_mm: f64) -> AssemblyContext {
        AssemblyContext {
            prediction_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            rainfall_mm,
            rainfall_source: WeatherSource::Simulated,
            degraded_weather: false,
            model_version: "v2.0.0".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 7, 15, 6, 0, 0).unwrap(),
        }
    }

    fn cluster_at(center: GeoPoint, max_risk: f64, avg_risk: f64) -> Cluster {
        Cluster {
            members: vec![ScoredPoint::new(center, max_risk); 4],
            centroid: center,
            max_risk,
            avg_risk,
            spread_deg: 0.0,
            radius_meters: 200,
        }
    }

    #[test]
    fn test_named_location_within_tolerance() {
        let reference = ReferenceData::delhi();
        let loc = &reference.named_locations[0];
        let center = GeoPoint::new(loc.lat + 0.01, loc.lng - 0.01);
        let h = HotspotAssembler::new(&reference).assemble(&cluster_at(center, 0.9, 0.8), &ctx(150.0));
        assert_eq!(h.name, loc.name);
        assert_eq!(h.severity, Severity::Critical);
        assert_eq!(h.confidence_score, 0.8);
        assert!(h.risk_factors.high_rainfall);
        assert!(h.risk_factors.very_high_rainfall);
        assert_eq!(h.risk_factors.cluster_size, 4);
    }

    #[test]
    fn test_fallback_name() {
        let reference = ReferenceData::delhi();
        let center = GeoPoint::new(28.4123, 76.8456);
        let h = HotspotAssembler::new(&reference).assemble(&cluster_at(center, 0.7, 0.68), &ctx(60.0));
        assert_eq!(h.name, "Area near 28.4123, 76.8456");
        assert_eq!(h.severity, Severity::Medium);
        assert!(h.risk_factors.high_rainfall);
        assert!(!h.risk_factors.very_high_rainfall);
    }

    #[test]
    fn test_rainfall_flags_are_strict() {
        let reference = ReferenceData::delhi();
        let c = cluster_at(GeoPoint::new(28.5, 77.0), 0.7, 0.7);
        let a = HotspotAssembler::new(&reference);
        assert!(!a.assemble(&c, &ctx(50.0)).risk_factors.high_rainfall);
        assert!(!a.assemble(&c, &ctx(100.0)).risk_factors.very_high_rainfall);
    }
}
