//! Sub-score Calculation
//!
//! Combines a base feature value with the modulation signal and clamps the
//! result to the metric's declared range:
//!
//! - stability: base + m·10, clamped to [20, 95]
//! - capacity:  base + m·15, clamped to [30, 95]
//! - risk:      base − m·10, clamped to [5, 80] (higher modulation lowers risk)
//!
//! Rounding to the nearest integer happens exactly once, here.

use crate::models::config::{FeatureBounds, ScoringConfig};
use crate::models::types::{BaseFeatures, Metric, ModulationFactor, SubScores};

/// Score one metric. Total for any input: non-finite bases clamp like any
/// other out-of-range value, NaN lands on the declared minimum.
pub fn score(
    base_value: f64,
    bounds: &FeatureBounds,
    modulation: ModulationFactor,
    invert: bool,
) -> i32 {
    let adjustment = modulation.value() * bounds.modulation_weight;
    let raw = if invert {
        base_value - adjustment
    } else {
        base_value + adjustment
    };

    let clamped = if raw.is_nan() {
        bounds.declared_min
    } else {
        raw.clamp(bounds.declared_min, bounds.declared_max)
    };

    // Fractional declared bounds could round outside the range
    let rounded = clamped.round();
    let rounded = if rounded < bounds.declared_min {
        rounded + 1.0
    } else if rounded > bounds.declared_max {
        rounded - 1.0
    } else {
        rounded
    };

    rounded as i32
}

/// Scores all three metrics against one configuration
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    config: ScoringConfig,
}

impl ScoreCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score_metric(&self, metric: Metric, base_value: f64, modulation: ModulationFactor) -> i32 {
        let bounds = self.config.bounds(metric);
        score(base_value, bounds, modulation, bounds.invert)
    }

    pub fn score_all(&self, features: &BaseFeatures, modulation: ModulationFactor) -> SubScores {
        SubScores {
            stability: self.score_metric(Metric::Stability, features.stability, modulation),
            capacity: self.score_metric(Metric::Capacity, features.capacity, modulation),
            risk: self.score_metric(Metric::Risk, features.risk, modulation),
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
