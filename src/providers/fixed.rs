//! Static feature provider: same base values for every site

use async_trait::async_trait;

use crate::models::errors::AppResult;
use crate::models::types::{BaseFeatures, Coordinate};
use crate::providers::traits::FeatureProvider;

#[derive(Debug, Clone, Copy)]
pub struct StaticFeatureProvider {
    features: BaseFeatures,
}

impl StaticFeatureProvider {
    pub fn new(features: BaseFeatures) -> Self {
        Self { features }
    }
}

#[async_trait]
impl FeatureProvider for StaticFeatureProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _coordinate: &Coordinate) -> AppResult<BaseFeatures> {
        self.features.ensure_finite()?;
        Ok(self.features)
    }
}
