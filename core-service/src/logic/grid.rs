//! Grid Generator
//!
//! Uniform lattice of candidate points over a bounding box. Rows run south to
//! north, columns west to east, and both ranges are half-open: the last
//! row/column can stop short of the max bound. That matches the lattice the
//! model was validated on, so keep it that way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geo::GeoPoint;

/// Slack for float drift when counting steps, so `(28.9 - 28.4) / 0.01`
/// yields 50 rows rather than 51.
const STEP_EPSILON: f64 = 1e-9;

/// Upper bound on points per run; scoring holds the whole grid in memory
pub const MAX_GRID_POINTS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Invalid grid bounds: {0}")]
    InvalidBounds(String),
    #[error("Grid step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("Grid of {rows}x{cols} points exceeds the limit of {MAX_GRID_POINTS}")]
    TooLarge { rows: usize, cols: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl GridBounds {
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self { lat_min, lat_max, lng_min, lng_max }
    }

    /// Bounds centred on `center`, `half_span` degrees in each direction
    pub fn around(center: GeoPoint, half_span: f64) -> Self {
        Self::new(
            center.lat - half_span,
            center.lat + half_span,
            center.lng - half_span,
            center.lng + half_span,
        )
    }

    pub fn validate(&self) -> Result<(), GridError> {
        let values = [self.lat_min, self.lat_max, self.lng_min, self.lng_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GridError::InvalidBounds(format!("non-finite bound in {:?}", self)));
        }
        if self.lat_min >= self.lat_max {
            return Err(GridError::InvalidBounds(format!(
                "lat_min {} >= lat_max {}",
                self.lat_min, self.lat_max
            )));
        }
        if self.lng_min >= self.lng_max {
            return Err(GridError::InvalidBounds(format!(
                "lng_min {} >= lng_max {}",
                self.lng_min, self.lng_max
            )));
        }
        Ok(())
    }
}

/// A candidate point. Ephemeral, lives for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
    pub row: usize,
    pub col: usize,
}

impl GridPoint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Number of values `min + i*step` strictly below `max`
fn axis_len(min: f64, max: f64, step: f64) -> usize {
    ((max - min) / step - STEP_EPSILON).ceil().max(0.0) as usize
}

/// Rows × columns a grid will have, without materialising it
pub fn grid_shape(bounds: &GridBounds, step: f64) -> Result<(usize, usize), GridError> {
    bounds.validate()?;
    if !(step.is_finite() && step > 0.0) {
        return Err(GridError::InvalidStep(step));
    }
    let rows = axis_len(bounds.lat_min, bounds.lat_max, step);
    let cols = axis_len(bounds.lng_min, bounds.lng_max, step);
    match rows.checked_mul(cols) {
        Some(n) if n <= MAX_GRID_POINTS => Ok((rows, cols)),
        _ => Err(GridError::TooLarge { rows, cols }),
    }
}

/// Generate the lattice in row-major order (latitude outer, longitude inner)
pub fn generate_grid(bounds: &GridBounds, step: f64) -> Result<Vec<GridPoint>, GridError> {
    let (rows, cols) = grid_shape(bounds, step)?;

    let mut points = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let lat = bounds.lat_min + row as f64 * step;
        for col in 0..cols {
            let lng = bounds.lng_min + col as f64 * step;
            points.push(GridPoint { lat, lng, row, col });
        }
    }

    log::debug!("Generated {}x{} grid ({} points, step {})", rows, cols, points.len(), step);
    Ok(points)
}
