//! Type definitions for the bankability engine
//! All core data structures flowing through the assessment pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    LATITUDE_MAX, LATITUDE_MIN, LONGITUDE_MAX, LONGITUDE_MIN, RISK_FACTOR_CAPACITY_TEXT,
    RISK_FACTOR_QUEUE_TEXT, RISK_FACTOR_REGULATORY_TEXT, RISK_FACTOR_STABILITY_TEXT,
};

// ============================================
// Coordinate
// ============================================

/// Validated geographic coordinate (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !latitude.is_finite() {
            return Err(AppError::invalid_coordinate("lat must be a finite number"));
        }
        if !longitude.is_finite() {
            return Err(AppError::invalid_coordinate("lon must be a finite number"));
        }
        if !(LATITUDE_MIN..=LATITUDE_MAX).contains(&latitude) {
            return Err(AppError::coordinate_out_of_range(format!(
                "lat {} outside [{}, {}]",
                latitude, LATITUDE_MIN, LATITUDE_MAX
            )));
        }
        if !(LONGITUDE_MIN..=LONGITUDE_MAX).contains(&longitude) {
            return Err(AppError::coordinate_out_of_range(format!(
                "lon {} outside [{}, {}]",
                longitude, LONGITUDE_MIN, LONGITUDE_MAX
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

// ============================================
// Modulation
// ============================================

/// Coordinate-derived adjustment signal, always within [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct ModulationFactor(f64);

impl ModulationFactor {
    pub const NEUTRAL: Self = Self(0.0);

    /// Wrap a raw signal, clamping into [-1, 1]. NaN collapses to neutral.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::NEUTRAL;
        }
        Self(value.clamp(-1.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// ============================================
// Features & Sub-scores
// ============================================

/// The three independent site metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Grid stability
    Stability,
    /// Transmission capacity
    Capacity,
    /// Interconnection queue risk
    Risk,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Stability, Metric::Capacity, Metric::Risk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Stability => "stability",
            Metric::Capacity => "capacity",
            Metric::Risk => "risk",
        }
    }
}

/// Raw base feature values supplied by a FeatureProvider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseFeatures {
    pub stability: f64,
    pub capacity: f64,
    pub risk: f64,
}

impl BaseFeatures {
    pub fn new(stability: f64, capacity: f64, risk: f64) -> Self {
        Self {
            stability,
            capacity,
            risk,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Stability => self.stability,
            Metric::Capacity => self.capacity,
            Metric::Risk => self.risk,
        }
    }

    /// Providers must hand over finite numbers only
    pub fn ensure_finite(&self) -> AppResult<()> {
        for metric in Metric::ALL {
            if !self.get(metric).is_finite() {
                return Err(AppError::provider_invalid_response(format!(
                    "base {} is not a finite number",
                    metric.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Rounded, bounded sub-scores for one site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub stability: i32,
    pub capacity: i32,
    pub risk: i32,
}

impl SubScores {
    pub fn get(&self, metric: Metric) -> i32 {
        match metric {
            Metric::Stability => self.stability,
            Metric::Capacity => self.capacity,
            Metric::Risk => self.risk,
        }
    }

    /// Aggregate used for rating classification: risk counts inverted
    pub fn aggregate(&self) -> f64 {
        (self.stability as f64 + self.capacity as f64 + (100.0 - self.risk as f64)) / 3.0
    }
}

// ============================================
// Rating
// ============================================

/// Bankability rating, declared from least to most desirable so that the
/// derived ordering follows desirability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BankabilityRating {
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl BankabilityRating {
    pub const ALL: [BankabilityRating; 4] = [
        BankabilityRating::Excellent,
        BankabilityRating::Good,
        BankabilityRating::Moderate,
        BankabilityRating::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BankabilityRating::Excellent => "Excellent",
            BankabilityRating::Good => "Good",
            BankabilityRating::Moderate => "Moderate",
            BankabilityRating::Poor => "Poor",
        }
    }

    /// Estimated approval timeline for the band. Single source of the estimate.
    pub fn timeline_months(&self) -> u32 {
        match self {
            BankabilityRating::Excellent => 12,
            BankabilityRating::Good => 18,
            BankabilityRating::Moderate => 24,
            BankabilityRating::Poor => 36,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            BankabilityRating::Excellent => "🟢",
            BankabilityRating::Good => "🟡",
            BankabilityRating::Moderate => "🟠",
            BankabilityRating::Poor => "🔴",
        }
    }
}

impl fmt::Display for BankabilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// Risk factors
// ============================================

/// Fixed catalog of risk explanations attached to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactor {
    /// Stability sub-score below threshold
    GridStability,
    /// Capacity sub-score below threshold
    TransmissionCapacity,
    /// Risk sub-score above threshold
    QueueCongestion,
    /// Aggregate below threshold
    RegulatoryTimeline,
}

impl RiskFactor {
    pub fn description(&self) -> &'static str {
        match self {
            RiskFactor::GridStability => RISK_FACTOR_STABILITY_TEXT,
            RiskFactor::TransmissionCapacity => RISK_FACTOR_CAPACITY_TEXT,
            RiskFactor::QueueCongestion => RISK_FACTOR_QUEUE_TEXT,
            RiskFactor::RegulatoryTimeline => RISK_FACTOR_REGULATORY_TEXT,
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ============================================
// Analysis result
// ============================================

/// Final assessment for one site. Only constructed by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub(crate) scores: SubScores,
    pub(crate) rating: BankabilityRating,
    pub(crate) timeline_months: u32,
    pub(crate) risk_factors: Vec<RiskFactor>,
}

impl AnalysisResult {
    pub fn stability(&self) -> i32 {
        self.scores.stability
    }

    pub fn capacity(&self) -> i32 {
        self.scores.capacity
    }

    pub fn risk(&self) -> i32 {
        self.scores.risk
    }

    pub fn scores(&self) -> SubScores {
        self.scores
    }

    pub fn rating(&self) -> BankabilityRating {
        self.rating
    }

    pub fn timeline_months(&self) -> u32 {
        self.timeline_months
    }

    pub fn risk_factors(&self) -> &[RiskFactor] {
        &self.risk_factors
    }

    pub fn aggregate(&self) -> f64 {
        self.scores.aggregate()
    }

    /// Plain-text site report
    pub fn summary(&self, coordinate: &Coordinate) -> String {
        let mut output = format!(
            "\n{} Bankability: {} | Site: {}\n",
            self.rating.emoji(),
            self.rating.as_str(),
            coordinate
        );
        output.push_str(&format!("   Grid stability:        {:>3}\n", self.scores.stability));
        output.push_str(&format!("   Transmission capacity: {:>3}\n", self.scores.capacity));
        output.push_str(&format!("   Interconnection risk:  {:>3}\n", self.scores.risk));
        output.push_str(&format!("   Aggregate:             {:.1}\n", self.aggregate()));
        output.push_str(&format!(
            "   Estimated timeline:    {} months\n",
            self.timeline_months
        ));

        if self.risk_factors.is_empty() {
            output.push_str("   Risk factors: none\n");
        } else {
            output.push_str("   Risk factors:\n");
            for factor in &self.risk_factors {
                output.push_str(&format!("     - {}\n", factor.description()));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_coordinate_accepts_domain_edges() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        let err = Coordinate::new(200.0, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::CoordinateOutOfRange);

        let err = Coordinate::new(0.0, -180.5).unwrap_err();
        assert_eq!(err.code, ErrorCode::CoordinateOutOfRange);
    }

    #[test]
    fn test_coordinate_rejects_non_finite() {
        let err = Coordinate::new(f64::NAN, 0.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinate);

        let err = Coordinate::new(0.0, f64::INFINITY).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_modulation_factor_is_bounded() {
        assert_eq!(ModulationFactor::new(3.0).value(), 1.0);
        assert_eq!(ModulationFactor::new(-3.0).value(), -1.0);
        assert_eq!(ModulationFactor::new(f64::NAN), ModulationFactor::NEUTRAL);
    }

    #[test]
    fn test_rating_ordering_follows_desirability() {
        assert!(BankabilityRating::Excellent > BankabilityRating::Good);
        assert!(BankabilityRating::Good > BankabilityRating::Moderate);
        assert!(BankabilityRating::Moderate > BankabilityRating::Poor);
    }

    #[test]
    fn test_timeline_per_band() {
        assert_eq!(BankabilityRating::Excellent.timeline_months(), 12);
        assert_eq!(BankabilityRating::Good.timeline_months(), 18);
        assert_eq!(BankabilityRating::Moderate.timeline_months(), 24);
        assert_eq!(BankabilityRating::Poor.timeline_months(), 36);
    }

    #[test]
    fn test_base_features_reject_nan() {
        let features = BaseFeatures::new(70.0, f64::NAN, 20.0);
        let err = features.ensure_finite().unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderInvalidResponse);
    }

    #[test]
    fn test_summary_lists_factors() {
        let result = AnalysisResult {
            scores: SubScores {
                stability: 60,
                capacity: 55,
                risk: 50,
            },
            rating: BankabilityRating::Poor,
            timeline_months: 36,
            risk_factors: vec![RiskFactor::GridStability, RiskFactor::QueueCongestion],
        };
        let coordinate = Coordinate::new(40.0, -100.0).unwrap();

        let summary = result.summary(&coordinate);
        assert!(summary.contains("Bankability: Poor"));
        assert!(summary.contains("36 months"));
        assert!(summary.contains("Grid stability concerns in target region"));
        assert!(summary.contains("High interconnection queue congestion"));
    }
}
