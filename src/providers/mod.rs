//! Providers Module - External Data Sources
//!
//! Base feature values for a site come from here: a seedable synthetic
//! stand-in, a static stub, or a remote feature service.

pub mod fixed;
pub mod http;
pub mod synthetic;
pub mod traits;

pub use fixed::*;
pub use http::*;
pub use synthetic::*;
pub use traits::*;

use std::sync::Arc;
use tracing::info;

use crate::models::config::{ProviderKind, ServiceConfig};
use crate::models::errors::AppResult;

/// Build the provider selected by configuration
pub fn from_config(config: &ServiceConfig) -> AppResult<Arc<dyn FeatureProvider>> {
    let provider: Arc<dyn FeatureProvider> = match &config.provider {
        ProviderKind::Synthetic { seed } => {
            let provider = match seed {
                Some(seed) => SyntheticFeatureProvider::seeded(&config.scoring, *seed),
                None => SyntheticFeatureProvider::from_entropy(&config.scoring),
            };
            Arc::new(provider.with_latency(config.simulated_latency))
        }
        ProviderKind::Http { base_url } => {
            Arc::new(HttpFeatureProvider::new(base_url.clone(), config.provider_timeout)?)
        }
    };

    info!("🔌 Feature provider: {}", provider.name());
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_synthetic() {
        let config = ServiceConfig {
            provider: ProviderKind::Synthetic { seed: Some(7) },
            ..ServiceConfig::default()
        };
        let provider = from_config(&config).unwrap();
        assert_eq!(provider.name(), "synthetic");
    }

    #[test]
    fn test_from_config_http() {
        let config = ServiceConfig {
            provider: ProviderKind::Http {
                base_url: "http://127.0.0.1:9".to_string(),
            },
            ..ServiceConfig::default()
        };
        let provider = from_config(&config).unwrap();
        assert_eq!(provider.name(), "http");
    }
}
