//! GridAI Library
//!
//! Bankability scoring for grid-interconnection sites. For a coordinate it
//! produces three bounded sub-scores, a categorical rating with an
//! estimated interconnection timeline, and the risk factors that explain
//! weak results:
//! - Grid stability (higher is better)
//! - Transmission capacity (higher is better)
//! - Interconnection risk (higher is worse)

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{BankabilityEngine, FixedModulator, GeographicModulator, SinusoidalModulator};
pub use models::{
    AnalysisResult, AppError, AppResult, BankabilityRating, BaseFeatures, Coordinate, ErrorCode,
    ErrorKind, ModulationFactor, RiskFactor, ScoringConfig, ServiceConfig, SubScores,
};
pub use providers::{
    FeatureProvider, HttpFeatureProvider, StaticFeatureProvider, SyntheticFeatureProvider,
};
pub use utils::{TelemetryCollector, TelemetryStats};
