//! Integration Tests for Feature Construction
//!
//! The three families together must fill every slot of the layout, in order.

#[cfg(test)]
mod integration_tests {
    use chrono::NaiveDate;

    use crate::logic::features::{
        builder::{FeatureBuilder, FeatureError},
        layout::{feature_index, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION},
        vector::FeatureVector,
    };
    use crate::logic::geo::GeoPoint;
    use crate::logic::grid::{generate_grid, GridBounds};
    use crate::logic::reference::ReferenceData;

    fn monsoon_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    fn value(v: &FeatureVector, name: &str) -> f64 {
        v.values[feature_index(name).unwrap()]
    }

    /// Every named slot gets the value its family computes
    #[test]
    fn test_all_families_fill_their_slots() {
        let reference = ReferenceData::delhi();
        let builder = FeatureBuilder::new(&reference);
        let v = builder.build(monsoon_day(), GeoPoint::new(28.6, 77.1), 40.0).unwrap();

        assert_eq!(v.values.len(), FEATURE_COUNT);
        assert_eq!(value(&v, "rainfall_24h"), 40.0);
        assert_eq!(value(&v, "rainfall_squared"), 1600.0);
        assert!((value(&v, "rainfall_log") - 41f64.ln()).abs() < 1e-12);
        assert_eq!(value(&v, "rainfall_intensity_num"), 3.0);
        assert_eq!(value(&v, "lat"), 28.6);
        assert_eq!(value(&v, "lng"), 77.1);
        assert!((value(&v, "elevation_proxy") - 0.1).abs() < 1e-9);
        assert!(value(&v, "min_dist_to_risk_zone_km") > 0.0);
        assert_eq!(value(&v, "day_of_year"), 197.0);
        assert_eq!(value(&v, "month"), 7.0);
        assert_eq!(value(&v, "is_monsoon"), 1.0);
    }

    /// Same inputs, same vector, every time
    #[test]
    fn test_builder_is_deterministic() {
        let reference = ReferenceData::delhi();
        let builder = FeatureBuilder::new(&reference);
        let a = builder.build(monsoon_day(), GeoPoint::new(28.55, 77.05), 87.5).unwrap();
        let b = builder.build(monsoon_day(), GeoPoint::new(28.55, 77.05), 87.5).unwrap();
        assert_eq!(a, b);
    }

    /// Grid building matches point-by-point building
    #[test]
    fn test_grid_matches_single_point_build() {
        let reference = ReferenceData::delhi();
        let builder = FeatureBuilder::new(&reference);
        let grid = generate_grid(&GridBounds::new(28.5, 28.53, 77.0, 77.03), 0.01).unwrap();

        let batch = builder.build_grid(monsoon_day(), &grid, 12.0).unwrap();
        assert_eq!(batch.len(), grid.len());
        for (p, v) in grid.iter().zip(&batch) {
            assert_eq!(*v, builder.build(monsoon_day(), p.location(), 12.0).unwrap());
        }
    }

    /// The vector carries the layout it was built with
    #[test]
    fn test_vectors_are_layout_tagged() {
        let reference = ReferenceData::delhi();
        let v = FeatureBuilder::new(&reference)
            .build(monsoon_day(), GeoPoint::new(28.7, 77.2), 0.0)
            .unwrap();
        assert!(v.validate().is_ok());
        assert_eq!((v.version, v.layout_hash), (FEATURE_VERSION, layout_hash()));
    }

    /// Non-finite rainfall never reaches the model
    #[test]
    fn test_non_finite_input_rejected() {
        let reference = ReferenceData::delhi();
        let builder = FeatureBuilder::new(&reference);
        let err = builder
            .build(monsoon_day(), GeoPoint::new(28.6, 77.1), f64::NAN)
            .unwrap_err();
        assert!(matches!(err, FeatureError::NonFinite { name: "rainfall_24h", .. }));
    }

    /// Spatial features move with the point, temporal and rainfall ones do not
    #[test]
    fn test_only_spatial_slots_vary_across_grid() {
        let reference = ReferenceData::delhi();
        let builder = FeatureBuilder::new(&reference);
        let a = builder.build(monsoon_day(), GeoPoint::new(28.45, 76.9), 30.0).unwrap();
        let b = builder.build(monsoon_day(), GeoPoint::new(28.85, 77.35), 30.0).unwrap();

        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            let spatial = matches!(*name, "lat" | "lng" | "elevation_proxy" | "min_dist_to_risk_zone_km");
            assert_eq!(a.values[i] != b.values[i], spatial, "{}", name);
        }
    }
}
