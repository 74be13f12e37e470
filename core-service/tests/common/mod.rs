#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use waterlog_core::logic::features::{feature_index, FEATURE_COUNT};
use waterlog_core::logic::geo::GeoPoint;
use waterlog_core::logic::grid::GridBounds;
use waterlog_core::logic::model::{Classifier, DecisionTree, StandardScaler, TreeNode};
use waterlog_core::logic::reference::NamedLocation;
use waterlog_core::{
    FixedWeatherProvider, ModelBundle, ModelRegistry, Pipeline, PipelineConfig, ReferenceData, WeatherResolver,
};

pub const ZONE: GeoPoint = GeoPoint::new(28.63, 77.23);
pub const ZONE_NAME: &str = "Test Junction";

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 6, 0, 0).unwrap()
}

/// One risk zone, one named location on top of it
pub fn reference() -> ReferenceData {
    ReferenceData {
        version: "test-1".to_string(),
        risk_zones: vec![ZONE],
        named_locations: vec![NamedLocation::new(ZONE_NAME, ZONE.lat, ZONE.lng)],
        name_tolerance_deg: 0.05,
        elevation_reference_lat: 28.7,
    }
}

/// rainfall > 100 mm and within 3 km of the zone → high risk, else low
fn rain_and_distance_tree(high: f64, low: f64) -> DecisionTree {
    let rain = feature_index("rainfall_24h").unwrap();
    let dist = feature_index("min_dist_to_risk_zone_km").unwrap();
    DecisionTree::new(vec![
        TreeNode::Split { feature: rain, threshold: 100.0, left: 1, right: 2 },
        TreeNode::Leaf(low),
        TreeNode::Split { feature: dist, threshold: 3.0, left: 3, right: 4 },
        TreeNode::Leaf(high),
        TreeNode::Leaf(low),
    ])
}

pub fn bundle() -> ModelBundle {
    ModelBundle::new(
        "v2.0.0",
        StandardScaler::identity(FEATURE_COUNT),
        Classifier::GradientBoosted { base_margin: -4.0, trees: vec![rain_and_distance_tree(8.0, 0.0)] },
        Classifier::RandomForest { trees: vec![rain_and_distance_tree(0.95, 0.05)] },
    )
}

pub fn registry() -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::with_model(bundle().into_model().unwrap()))
}

pub fn simulated(rain_mm: f64) -> WeatherResolver {
    WeatherResolver::new().with_provider(Arc::new(FixedWeatherProvider::simulated(rain_mm).unwrap()))
}

/// A 20 x 20 grid with the zone on row 10, column 10
pub fn config() -> PipelineConfig {
    PipelineConfig {
        bounds: GridBounds::around(ZONE, 0.1),
        live_weather: false,
        ..PipelineConfig::default()
    }
}

pub fn pipeline(rain_mm: f64) -> Pipeline {
    pipeline_with(config(), rain_mm)
}

pub fn pipeline_with(config: PipelineConfig, rain_mm: f64) -> Pipeline {
    Pipeline::new(config, Arc::new(reference()), registry(), simulated(rain_mm)).unwrap()
}
