//! Geographic Modulation
//!
//! Turns a coordinate into a bounded adjustment signal in [-1, 1]. The
//! sinusoidal signal stands in for a real geospatial feature; any
//! replacement must stay deterministic and depend on the coordinate only.

use crate::models::config::ModulationConfig;
use crate::models::types::{Coordinate, ModulationFactor};

/// Source of the coordinate-derived modulation signal
pub trait GeographicModulator: Send + Sync {
    fn modulate(&self, coordinate: &Coordinate) -> ModulationFactor;
}

/// `sin(lat · k_lat) · cos(lon · k_lon)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinusoidalModulator {
    k_lat: f64,
    k_lon: f64,
}

impl SinusoidalModulator {
    pub fn new(config: ModulationConfig) -> Self {
        Self {
            k_lat: config.k_lat,
            k_lon: config.k_lon,
        }
    }
}

impl Default for SinusoidalModulator {
    fn default() -> Self {
        Self::new(ModulationConfig::default())
    }
}

impl GeographicModulator for SinusoidalModulator {
    #[inline]
    fn modulate(&self, coordinate: &Coordinate) -> ModulationFactor {
        let signal =
            (coordinate.latitude() * self.k_lat).sin() * (coordinate.longitude() * self.k_lon).cos();
        ModulationFactor::new(signal)
    }
}

/// Constant signal regardless of location. Used to pin the pipeline in tests
/// and for what-if runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedModulator(pub ModulationFactor);

impl GeographicModulator for FixedModulator {
    fn modulate(&self, _coordinate: &Coordinate) -> ModulationFactor {
        self.0
    }
}
