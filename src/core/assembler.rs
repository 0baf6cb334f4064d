//! Result Assembly
//!
//! Packages already-computed pieces into an AnalysisResult. Nothing is
//! recomputed or re-clamped: a sub-score outside its declared range means
//! the scoring stage is broken and assembly fails loudly.

use tracing::error;

use crate::models::config::ScoringConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisResult, BankabilityRating, Metric, RiskFactor, SubScores};

pub fn assemble(
    config: &ScoringConfig,
    scores: SubScores,
    rating: BankabilityRating,
    timeline_months: u32,
    risk_factors: Vec<RiskFactor>,
) -> AppResult<AnalysisResult> {
    for metric in Metric::ALL {
        let bounds = config.bounds(metric);
        let value = scores.get(metric);
        if !bounds.contains(value) {
            error!(
                metric = metric.as_str(),
                value,
                min = bounds.declared_min,
                max = bounds.declared_max,
                "💥 Sub-score escaped its declared range"
            );
            return Err(AppError::subscore_out_of_bounds(format!(
                "{} score {} outside [{}, {}]",
                metric.as_str(),
                value,
                bounds.declared_min,
                bounds.declared_max
            )));
        }
    }

    Ok(AnalysisResult {
        scores,
        rating,
        timeline_months,
        risk_factors,
    })
}
