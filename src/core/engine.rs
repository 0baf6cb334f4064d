//! Bankability Engine
//!
//! Wires the pipeline together:
//! provider → modulator → scores → (rating, risk factors) → assembled result.
//!
//! The provider call is the only await point. It is bounded by a
//! caller-supplied deadline and nothing is assembled until it has returned,
//! so a cancelled or timed-out request never leaves a partial result behind.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::core::assembler::assemble;
use crate::core::modulator::{GeographicModulator, SinusoidalModulator};
use crate::core::rating::classify;
use crate::core::risk_factors::derive;
use crate::core::scoring::ScoreCalculator;
use crate::models::config::ScoringConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisResult, BaseFeatures, Coordinate, ModulationFactor};
use crate::providers::traits::FeatureProvider;

pub struct BankabilityEngine {
    config: ScoringConfig,
    calculator: ScoreCalculator,
    modulator: Arc<dyn GeographicModulator>,
    provider: Arc<dyn FeatureProvider>,
}

impl BankabilityEngine {
    pub fn new(config: ScoringConfig, provider: Arc<dyn FeatureProvider>) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            calculator: ScoreCalculator::new(config),
            modulator: Arc::new(SinusoidalModulator::new(config.modulation)),
            provider,
        })
    }

    /// Swap the geographic signal source
    pub fn with_modulator(mut self, modulator: Arc<dyn GeographicModulator>) -> Self {
        self.modulator = modulator;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Pure part of the pipeline: same inputs, same result
    pub fn evaluate(
        &self,
        features: &BaseFeatures,
        modulation: ModulationFactor,
    ) -> AppResult<AnalysisResult> {
        let scores = self.calculator.score_all(features, modulation);
        let (rating, timeline_months) = classify(scores.stability, scores.capacity, scores.risk);
        let risk_factors = derive(
            scores.stability,
            scores.capacity,
            scores.risk,
            scores.aggregate(),
        );

        assemble(&self.config, scores, rating, timeline_months, risk_factors)
    }

    /// Validate raw coordinates, then assess. Invalid input never reaches
    /// the provider.
    pub async fn assess(&self, lat: f64, lon: f64, deadline: Duration) -> AppResult<AnalysisResult> {
        let coordinate = Coordinate::new(lat, lon).map_err(|e| {
            warn!("🚫 Rejected coordinate lat={} lon={}: {}", lat, lon, e);
            e
        })?;
        self.assess_coordinate(&coordinate, deadline).await
    }

    pub async fn assess_coordinate(
        &self,
        coordinate: &Coordinate,
        deadline: Duration,
    ) -> AppResult<AnalysisResult> {
        let start = Instant::now();

        let features = match tokio::time::timeout(deadline, self.provider.fetch(coordinate)).await {
            Ok(Ok(features)) => features,
            Ok(Err(e)) => {
                warn!(
                    provider = self.provider.name(),
                    code = e.code_str(),
                    "⚠️ Feature provider failed for {}: {}",
                    coordinate,
                    e.message
                );
                return Err(e);
            }
            Err(_) => {
                warn!(
                    provider = self.provider.name(),
                    "⏱️ Feature provider timed out for {} after {}ms",
                    coordinate,
                    deadline.as_millis()
                );
                return Err(AppError::provider_timeout(deadline.as_millis()));
            }
        };
        features.ensure_finite()?;

        let modulation = self.modulator.modulate(coordinate);
        let result = self.evaluate(&features, modulation)?;

        info!(
            stability = result.stability(),
            capacity = result.capacity(),
            risk = result.risk(),
            latency_ms = start.elapsed().as_millis() as u64,
            "✅ {} → {} ({} months, {} risk factors)",
            coordinate,
            result.rating(),
            result.timeline_months(),
            result.risk_factors().len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modulator::FixedModulator;
    use crate::models::errors::{ErrorCode, ErrorKind};
    use crate::models::types::{BankabilityRating, RiskFactor};
    use crate::providers::fixed::StaticFeatureProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DEADLINE: Duration = Duration::from_secs(1);

    fn engine_with(features: BaseFeatures, modulation: f64) -> BankabilityEngine {
        let provider = Arc::new(StaticFeatureProvider::new(features));
        BankabilityEngine::new(ScoringConfig::default(), provider)
            .unwrap()
            .with_modulator(Arc::new(FixedModulator(ModulationFactor::new(modulation))))
    }

    /// Counts calls, optionally never answers
    struct CountingProvider {
        calls: AtomicUsize,
        hang: bool,
    }

    #[async_trait]
    impl FeatureProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self, _coordinate: &Coordinate) -> AppResult<BaseFeatures> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Err(AppError::provider_failed("upstream exploded"))
        }
    }

    #[tokio::test]
    async fn test_worked_example() {
        let engine = engine_with(BaseFeatures::new(75.0, 70.0, 35.0), 0.5);
        let result = engine.assess(40.0, -100.0, DEADLINE).await.unwrap();

        assert_eq!(result.stability(), 80);
        assert_eq!(result.capacity(), 78);
        assert_eq!(result.risk(), 30);
        assert_eq!(result.rating(), BankabilityRating::Good);
        assert_eq!(result.timeline_months(), 18);
        assert!(result.risk_factors().is_empty());
    }

    #[tokio::test]
    async fn test_poor_site_collects_factors_in_order() {
        let engine = engine_with(BaseFeatures::new(60.0, 50.0, 55.0), -0.5);
        let result = engine.assess(10.0, 10.0, DEADLINE).await.unwrap();

        // 55, 43 (42.5 rounds away from zero), 60
        assert_eq!(result.stability(), 55);
        assert_eq!(result.capacity(), 43);
        assert_eq!(result.risk(), 60);
        assert_eq!(result.rating(), BankabilityRating::Poor);
        assert_eq!(result.timeline_months(), 36);
        assert_eq!(
            result.risk_factors(),
            &[
                RiskFactor::GridStability,
                RiskFactor::TransmissionCapacity,
                RiskFactor::QueueCongestion,
                RiskFactor::RegulatoryTimeline,
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_coordinate_skips_provider() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            hang: false,
        });
        let engine = BankabilityEngine::new(ScoringConfig::default(), provider.clone()).unwrap();

        let err = engine.assess(200.0, 0.0, DEADLINE).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            hang: false,
        });
        let engine = BankabilityEngine::new(ScoringConfig::default(), provider.clone()).unwrap();

        let err = engine.assess(0.0, 0.0, DEADLINE).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderFailed);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_timeout() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            hang: true,
        });
        let engine = BankabilityEngine::new(ScoringConfig::default(), provider).unwrap();

        let err = engine
            .assess(0.0, 0.0, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderTimeout);
        assert_eq!(err.code.http_status(), 504);
    }

    #[tokio::test]
    async fn test_non_finite_provider_output_rejected() {
        let engine = engine_with(BaseFeatures::new(f64::NAN, 70.0, 35.0), 0.0);
        let err = engine.assess(0.0, 0.0, DEADLINE).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderInvalidResponse);
    }

    #[tokio::test]
    async fn test_deterministic_for_same_inputs() {
        let provider = Arc::new(StaticFeatureProvider::new(BaseFeatures::new(71.0, 64.0, 22.0)));
        let engine = BankabilityEngine::new(ScoringConfig::default(), provider).unwrap();

        let first = engine.assess(51.5, -0.12, DEADLINE).await.unwrap();
        for _ in 0..10 {
            assert_eq!(engine.assess(51.5, -0.12, DEADLINE).await.unwrap(), first);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config.capacity.base_min = 95.0;
        let provider = Arc::new(StaticFeatureProvider::new(BaseFeatures::new(70.0, 70.0, 30.0)));
        assert!(BankabilityEngine::new(config, provider).is_err());
    }
}
