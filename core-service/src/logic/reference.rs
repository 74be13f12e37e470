//! Reference Data - versioned spatial lookup tables
//!
//! Known high-risk coordinates (feed the distance feature) and named
//! locations (feed hotspot naming). Injected into the pipeline rather than
//! compiled in, so a city can ship an updated table without a rebuild.
//! `ReferenceData::delhi()` is the built-in default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid reference data: {0}")]
    Invalid(String),
}

/// A known location used for labelling hotspots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl NamedLocation {
    pub fn new(name: &str, lat: f64, lng: f64) -> Self {
        Self { name: name.to_string(), lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Version tag of this table, recorded with every run
    pub version: String,
    /// Historically flooded coordinates
    pub risk_zones: Vec<GeoPoint>,
    /// Labels for hotspot naming
    pub named_locations: Vec<NamedLocation>,
    /// Max distance (degrees) for a named location to label a hotspot
    #[serde(default = "default_name_tolerance")]
    pub name_tolerance_deg: f64,
    /// Latitude the elevation proxy is measured from
    #[serde(default = "default_elevation_reference")]
    pub elevation_reference_lat: f64,
}

fn default_name_tolerance() -> f64 {
    0.05
}

fn default_elevation_reference() -> f64 {
    28.7
}

impl ReferenceData {
    /// Built-in Delhi tables
    pub fn delhi() -> Self {
        Self {
            version: "delhi-2024.1".to_string(),
            risk_zones: vec![
                GeoPoint::new(28.6330, 77.2285), // Minto Bridge
                GeoPoint::new(28.6304, 77.2425), // ITO
                GeoPoint::new(28.5910, 77.1610), // Dhaula Kuan
                GeoPoint::new(28.6139, 76.9830), // Najafgarh
            ],
            named_locations: vec![
                NamedLocation::new("Minto Bridge Area", 28.6330, 77.2285),
                NamedLocation::new("ITO Crossing Area", 28.6304, 77.2425),
                NamedLocation::new("Dhaula Kuan Area", 28.5910, 77.1610),
                NamedLocation::new("Najafgarh Area", 28.6139, 76.9830),
                NamedLocation::new("Kashmere Gate Area", 28.6675, 77.2282),
            ],
            name_tolerance_deg: default_name_tolerance(),
            elevation_reference_lat: default_elevation_reference(),
        }
    }

    /// Load and validate a reference table from a JSON file
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let data = fs::read(path)?;
        let reference: ReferenceData = serde_json::from_slice(&data)?;
        reference.validate()?;
        log::info!(
            "Loaded reference data {} ({} risk zones, {} named locations)",
            reference.version,
            reference.risk_zones.len(),
            reference.named_locations.len()
        );
        Ok(reference)
    }

    pub fn validate(&self) -> Result<(), ReferenceError> {
        if self.version.trim().is_empty() {
            return Err(ReferenceError::Invalid("missing version".to_string()));
        }
        if self.risk_zones.is_empty() {
            return Err(ReferenceError::Invalid("no risk zones".to_string()));
        }
        if let Some(p) = self.risk_zones.iter().find(|p| !p.is_finite()) {
            return Err(ReferenceError::Invalid(format!("non-finite risk zone {:?}", p)));
        }
        if let Some(loc) = self.named_locations.iter().find(|l| !l.point().is_finite()) {
            return Err(ReferenceError::Invalid(format!("non-finite location '{}'", loc.name)));
        }
        if !(self.name_tolerance_deg.is_finite() && self.name_tolerance_deg > 0.0) {
            return Err(ReferenceError::Invalid(format!(
                "name tolerance must be positive, got {}",
                self.name_tolerance_deg
            )));
        }
        if !self.elevation_reference_lat.is_finite() {
            return Err(ReferenceError::Invalid("non-finite elevation reference".to_string()));
        }
        Ok(())
    }

    /// Distance in km from `point` to the closest risk zone
    pub fn min_distance_to_risk_zone_km(&self, point: &GeoPoint) -> f64 {
        self.risk_zones
            .iter()
            .map(|zone| point.distance_km(zone))
            .fold(f64::INFINITY, f64::min)
    }

    /// Closest named location and its distance in degrees.
    /// Ties keep the earlier entry.
    pub fn nearest_location(&self, point: &GeoPoint) -> Option<(&NamedLocation, f64)> {
        let mut best: Option<(&NamedLocation, f64)> = None;
        for loc in &self.named_locations {
            let dist = point.distance_deg(&loc.point());
            match best {
                Some((_, d)) if d <= dist => {}
                _ => best = Some((loc, dist)),
            }
        }
        best
    }

    /// Best-effort label for a hotspot centre
    pub fn location_name(&self, point: &GeoPoint) -> String {
        match self.nearest_location(point) {
            Some((loc, dist)) if dist <= self.name_tolerance_deg => loc.name.clone(),
            _ => format!("Area near {:.4}, {:.4}", point.lat, point.lng),
        }
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::delhi()
    }
}
