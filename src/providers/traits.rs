//! FeatureProvider seam
//!
//! The engine never knows where base feature values come from. Everything
//! non-deterministic or I/O bound lives behind this trait.

use async_trait::async_trait;

use crate::models::errors::AppResult;
use crate::models::types::{BaseFeatures, Coordinate};

#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Fetch raw base feature values for one site. Called at most once per
    /// assessment; retries, if any, are the provider's own business.
    async fn fetch(&self, coordinate: &Coordinate) -> AppResult<BaseFeatures>;
}
