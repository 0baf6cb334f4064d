//! Synthetic Feature Provider
//!
//! Stand-in for real grid data: integer base values drawn uniformly from
//! each metric's base range (upper bound exclusive). The RNG is injected so
//! seeded runs are reproducible.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::models::config::{FeatureBounds, ScoringConfig};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{BaseFeatures, Coordinate};
use crate::providers::traits::FeatureProvider;

pub struct SyntheticFeatureProvider {
    rng: Mutex<StdRng>,
    stability: FeatureBounds,
    capacity: FeatureBounds,
    risk: FeatureBounds,
    latency: Duration,
}

impl SyntheticFeatureProvider {
    pub fn new(config: &ScoringConfig, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            stability: config.stability,
            capacity: config.capacity,
            risk: config.risk,
            latency: Duration::ZERO,
        }
    }

    /// Reproducible sequence
    pub fn seeded(config: &ScoringConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: &ScoringConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    /// Add an artificial delay to every lookup
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn draw(rng: &mut StdRng, bounds: &FeatureBounds) -> f64 {
        let low = bounds.base_min.ceil() as i64;
        let high = bounds.base_max.floor() as i64;
        if high <= low {
            return low as f64;
        }
        rng.gen_range(low..high) as f64
    }
}

#[async_trait]
impl FeatureProvider for SyntheticFeatureProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> AppResult<BaseFeatures> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let features = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| AppError::provider_failed("synthetic RNG lock poisoned"))?;
            BaseFeatures::new(
                Self::draw(&mut rng, &self.stability),
                Self::draw(&mut rng, &self.capacity),
                Self::draw(&mut rng, &self.risk),
            )
        };

        debug!("🎲 Synthetic features for {}: {:?}", coordinate, features);
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Coordinate {
        Coordinate::new(40.0, -105.0).unwrap()
    }

    #[tokio::test]
    async fn test_values_within_base_ranges() {
        let config = ScoringConfig::default();
        let provider = SyntheticFeatureProvider::seeded(&config, 7);

        for _ in 0..500 {
            let f = provider.fetch(&site()).await.unwrap();
            assert!((60.0..90.0).contains(&f.stability), "stability {}", f.stability);
            assert!((50.0..90.0).contains(&f.capacity), "capacity {}", f.capacity);
            assert!((10.0..60.0).contains(&f.risk), "risk {}", f.risk);
            assert_eq!(f.stability.fract(), 0.0);
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_sequence() {
        let config = ScoringConfig::default();
        let a = SyntheticFeatureProvider::seeded(&config, 42);
        let b = SyntheticFeatureProvider::seeded(&config, 42);

        for _ in 0..20 {
            assert_eq!(a.fetch(&site()).await.unwrap(), b.fetch(&site()).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_degenerate_range_returns_min() {
        let mut config = ScoringConfig::default();
        config.risk.base_min = 25.0;
        config.risk.base_max = 25.0;
        let provider = SyntheticFeatureProvider::seeded(&config, 1);

        let f = provider.fetch(&site()).await.unwrap();
        assert_eq!(f.risk, 25.0);
    }
}
