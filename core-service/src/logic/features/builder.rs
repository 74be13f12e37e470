//! Feature Builder
//!
//! Turns `(date, point, rainfall)` into a `FeatureVector` laid out exactly as
//! `FEATURE_LAYOUT`. Pure: the same inputs always give the same vector.

use chrono::NaiveDate;
use thiserror::Error;

use crate::logic::geo::GeoPoint;
use crate::logic::grid::GridPoint;
use crate::logic::reference::ReferenceData;

use super::layout::LayoutMismatchError;
use super::rainfall::RainfallFeatures;
use super::spatial::SpatialFeatures;
use super::temporal::TemporalFeatures;
use super::vector::{FeatureExtractor, FeatureVector};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),
    #[error("Feature '{name}' is not finite ({value}) at {lat:.4}, {lng:.4}")]
    NonFinite {
        name: &'static str,
        value: f64,
        lat: f64,
        lng: f64,
    },
}

pub struct FeatureBuilder<'a> {
    reference: &'a ReferenceData,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        Self { reference }
    }

    /// Build the vector for a single point
    pub fn build(&self, date: NaiveDate, point: GeoPoint, rainfall_24h: f64) -> Result<FeatureVector, FeatureError> {
        let temporal = TemporalFeatures::from_date(date);
        let rainfall = RainfallFeatures::new(rainfall_24h);
        self.build_with(&temporal, &rainfall, point)
    }

    /// Build vectors for every grid point of a run. Date and rainfall are
    /// shared by the whole grid, so their families are computed once.
    pub fn build_grid(
        &self,
        date: NaiveDate,
        points: &[GridPoint],
        rainfall_24h: f64,
    ) -> Result<Vec<FeatureVector>, FeatureError> {
        let temporal = TemporalFeatures::from_date(date);
        let rainfall = RainfallFeatures::new(rainfall_24h);

        points
            .iter()
            .map(|p| self.build_with(&temporal, &rainfall, p.location()))
            .collect()
    }

    fn build_with(
        &self,
        temporal: &TemporalFeatures,
        rainfall: &RainfallFeatures,
        point: GeoPoint,
    ) -> Result<FeatureVector, FeatureError> {
        let spatial = SpatialFeatures::compute(point, self.reference);

        let mut vector = FeatureVector::new();
        rainfall.extract(&mut vector);
        spatial.extract(&mut vector);
        temporal.extract(&mut vector);

        vector.validate()?;
        if let Some((name, value)) = vector.first_non_finite() {
            return Err(FeatureError::NonFinite {
                name,
                value,
                lat: point.lat,
                lng: point.lng,
            });
        }

        Ok(vector)
    }
}
