//! Configuration module for the bankability engine
//!
//! Scoring constants live in utils/constants.rs; this module turns them into
//! explicit configuration values that are passed in at construction time.

use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::Metric;
use crate::utils::constants::{
    CAPACITY_BASE_MAX, CAPACITY_BASE_MIN, CAPACITY_DECLARED_MAX, CAPACITY_DECLARED_MIN,
    CAPACITY_WEIGHT, DEFAULT_HOST, DEFAULT_K_LAT, DEFAULT_K_LON, DEFAULT_PORT,
    DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_RATE_LIMIT_PER_MINUTE, ENV_HOST, ENV_PLATFORM_PORT,
    ENV_PORT, ENV_PROVIDER, ENV_PROVIDER_TIMEOUT_MS, ENV_PROVIDER_URL, ENV_RATE_LIMIT, ENV_SEED,
    ENV_SIMULATED_LATENCY_MS, ENV_TRUST_FORWARDED, RISK_BASE_MAX, RISK_BASE_MIN, RISK_DECLARED_MAX,
    RISK_DECLARED_MIN, RISK_WEIGHT, STABILITY_BASE_MAX, STABILITY_BASE_MIN, STABILITY_DECLARED_MAX,
    STABILITY_DECLARED_MIN, STABILITY_WEIGHT,
};

// ============================================
// Scoring configuration
// ============================================

/// Per-metric bounds and modulation weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBounds {
    /// Lowest sub-score the metric may report
    pub declared_min: f64,
    /// Highest sub-score the metric may report
    pub declared_max: f64,
    /// Range providers draw base values from
    pub base_min: f64,
    pub base_max: f64,
    /// Scale applied to the modulation factor
    pub modulation_weight: f64,
    /// Subtract modulation instead of adding it
    pub invert: bool,
}

impl FeatureBounds {
    pub fn stability() -> Self {
        Self {
            declared_min: STABILITY_DECLARED_MIN,
            declared_max: STABILITY_DECLARED_MAX,
            base_min: STABILITY_BASE_MIN,
            base_max: STABILITY_BASE_MAX,
            modulation_weight: STABILITY_WEIGHT,
            invert: false,
        }
    }

    pub fn capacity() -> Self {
        Self {
            declared_min: CAPACITY_DECLARED_MIN,
            declared_max: CAPACITY_DECLARED_MAX,
            base_min: CAPACITY_BASE_MIN,
            base_max: CAPACITY_BASE_MAX,
            modulation_weight: CAPACITY_WEIGHT,
            invert: false,
        }
    }

    pub fn risk() -> Self {
        Self {
            declared_min: RISK_DECLARED_MIN,
            declared_max: RISK_DECLARED_MAX,
            base_min: RISK_BASE_MIN,
            base_max: RISK_BASE_MAX,
            modulation_weight: RISK_WEIGHT,
            invert: true,
        }
    }

    /// Whether an integer sub-score sits inside the declared range
    pub fn contains(&self, score: i32) -> bool {
        let score = score as f64;
        score >= self.declared_min && score <= self.declared_max
    }

    fn validate(&self, metric: Metric) -> AppResult<()> {
        let key = metric.as_str();
        let values = [
            self.declared_min,
            self.declared_max,
            self.base_min,
            self.base_max,
            self.modulation_weight,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::invalid_config(key, "bounds must be finite"));
        }
        if self.declared_min > self.declared_max {
            return Err(AppError::invalid_config(key, "declared_min exceeds declared_max"));
        }
        if self.base_min > self.base_max {
            return Err(AppError::invalid_config(key, "base_min exceeds base_max"));
        }
        // Integer scores must exist inside the declared range after rounding
        if self.declared_min.ceil() > self.declared_max.floor() {
            return Err(AppError::invalid_config(
                key,
                "declared range contains no integer score",
            ));
        }
        Ok(())
    }
}

/// Frequencies of the periodic geographic signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationConfig {
    pub k_lat: f64,
    pub k_lon: f64,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self {
            k_lat: DEFAULT_K_LAT,
            k_lon: DEFAULT_K_LON,
        }
    }
}

/// Complete scoring configuration, one FeatureBounds per metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub stability: FeatureBounds,
    pub capacity: FeatureBounds,
    pub risk: FeatureBounds,
    pub modulation: ModulationConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stability: FeatureBounds::stability(),
            capacity: FeatureBounds::capacity(),
            risk: FeatureBounds::risk(),
            modulation: ModulationConfig::default(),
        }
    }
}

impl ScoringConfig {
    pub fn bounds(&self, metric: Metric) -> &FeatureBounds {
        match metric {
            Metric::Stability => &self.stability,
            Metric::Capacity => &self.capacity,
            Metric::Risk => &self.risk,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        for metric in Metric::ALL {
            self.bounds(metric).validate(metric)?;
        }
        if !self.modulation.k_lat.is_finite() || !self.modulation.k_lon.is_finite() {
            return Err(AppError::invalid_config(
                "modulation",
                "frequencies must be finite",
            ));
        }
        Ok(())
    }
}

// ============================================
// Service configuration
// ============================================

/// Which FeatureProvider backs the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// Seedable random stand-in
    Synthetic { seed: Option<u64> },
    /// Remote feature service
    Http { base_url: String },
}

/// Runtime configuration for the API service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub provider: ProviderKind,
    /// Deadline for one FeatureProvider call
    pub provider_timeout: Duration,
    /// Requests per client per minute
    pub rate_limit_per_minute: u32,
    /// Artificial delay added to synthetic lookups
    pub simulated_latency: Duration,
    /// Take the client address from forwarding headers
    pub trust_forwarded_headers: bool,
    pub scoring: ScoringConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            provider: ProviderKind::Synthetic { seed: None },
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            simulated_latency: Duration::ZERO,
            trust_forwarded_headers: false,
            scoring: ScoringConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys fall back to defaults;
    /// set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get(ENV_HOST).unwrap_or(defaults.host);

        let port_source = get(ENV_PLATFORM_PORT)
            .map(|raw| (ENV_PLATFORM_PORT, raw))
            .or_else(|| get(ENV_PORT).map(|raw| (ENV_PORT, raw)));
        let port = match port_source {
            Some((key, raw)) => parse_value::<u16>(key, &raw)?,
            None => defaults.port,
        };

        let seed = get(ENV_SEED)
            .map(|raw| parse_value::<u64>(ENV_SEED, &raw))
            .transpose()?;

        let provider = match get(ENV_PROVIDER).as_deref().map(str::trim) {
            None | Some("synthetic") => ProviderKind::Synthetic { seed },
            Some("http") => {
                let base_url = get(ENV_PROVIDER_URL).ok_or_else(|| AppError::missing_env(ENV_PROVIDER_URL))?;
                ProviderKind::Http {
                    base_url: base_url.trim_end_matches('/').to_string(),
                }
            }
            Some(other) => {
                return Err(AppError::invalid_config(
                    ENV_PROVIDER,
                    format!("unknown provider '{}', expected synthetic or http", other),
                ))
            }
        };

        let provider_timeout = match get(ENV_PROVIDER_TIMEOUT_MS) {
            Some(raw) => {
                let ms = parse_value::<u64>(ENV_PROVIDER_TIMEOUT_MS, &raw)?;
                if ms == 0 {
                    return Err(AppError::invalid_config(
                        ENV_PROVIDER_TIMEOUT_MS,
                        "timeout must be greater than zero",
                    ));
                }
                Duration::from_millis(ms)
            }
            None => defaults.provider_timeout,
        };

        let rate_limit_per_minute = match get(ENV_RATE_LIMIT) {
            Some(raw) => parse_value::<u32>(ENV_RATE_LIMIT, &raw)?,
            None => defaults.rate_limit_per_minute,
        };

        let simulated_latency = match get(ENV_SIMULATED_LATENCY_MS) {
            Some(raw) => Duration::from_millis(parse_value::<u64>(ENV_SIMULATED_LATENCY_MS, &raw)?),
            None => defaults.simulated_latency,
        };

        let trust_forwarded_headers = match get(ENV_TRUST_FORWARDED) {
            Some(raw) => parse_value::<bool>(ENV_TRUST_FORWARDED, &raw)?,
            None => defaults.trust_forwarded_headers,
        };

        let config = Self {
            host,
            port,
            provider,
            provider_timeout,
            rate_limit_per_minute,
            simulated_latency,
            trust_forwarded_headers,
            scoring: defaults.scoring,
        };
        config.scoring.validate()?;

        info!(
            "⚙️ Config loaded: provider={:?}, timeout={}ms, rate_limit={}/min",
            config.provider,
            config.provider_timeout.as_millis(),
            config.rate_limit_per_minute
        );

        Ok(config)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| AppError::invalid_config(key, format!("'{}' ({})", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_scoring_config_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.risk.invert);
        assert!(!config.stability.invert);
        assert_eq!(config.capacity.modulation_weight, 15.0);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut config = ScoringConfig::default();
        config.stability.declared_min = 99.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_env_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.provider, ProviderKind::Synthetic { seed: None });
        assert_eq!(config.provider_timeout, Duration::from_millis(5_000));
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("GRIDAI_PORT", "7000"),
            ("GRIDAI_PROVIDER", "http"),
            ("GRIDAI_PROVIDER_URL", "http://features.local/"),
            ("GRIDAI_PROVIDER_TIMEOUT_MS", "250"),
            ("GRIDAI_RATE_LIMIT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(
            config.provider,
            ProviderKind::Http {
                base_url: "http://features.local".to_string()
            }
        );
        assert_eq!(config.provider_timeout, Duration::from_millis(250));
        assert_eq!(config.rate_limit_per_minute, 10);
    }

    #[test]
    fn test_env_seed_for_synthetic_provider() {
        let config = ServiceConfig::from_lookup(lookup(&[("GRIDAI_SEED", "42")])).unwrap();
        assert_eq!(config.provider, ProviderKind::Synthetic { seed: Some(42) });
    }

    #[test]
    fn test_env_invalid_values() {
        let err = ServiceConfig::from_lookup(lookup(&[("GRIDAI_PORT", "not-a-port")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);

        let err =
            ServiceConfig::from_lookup(lookup(&[("GRIDAI_PROVIDER_TIMEOUT_MS", "0")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);

        let err = ServiceConfig::from_lookup(lookup(&[("GRIDAI_PROVIDER", "oracle")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_bad_port_reports_key_that_was_read() {
        let err = ServiceConfig::from_lookup(lookup(&[("PORT", "eighty"), ("GRIDAI_PORT", "7000")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
        assert!(err.message.starts_with("PORT:"), "{}", err.message);

        let err = ServiceConfig::from_lookup(lookup(&[("GRIDAI_PORT", "99999")])).unwrap_err();
        assert!(err.message.starts_with("GRIDAI_PORT:"), "{}", err.message);
    }

    #[test]
    fn test_trust_forwarded_flag() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.trust_forwarded_headers);

        let config =
            ServiceConfig::from_lookup(lookup(&[("GRIDAI_TRUST_FORWARDED", "true")])).unwrap();
        assert!(config.trust_forwarded_headers);

        let err = ServiceConfig::from_lookup(lookup(&[("GRIDAI_TRUST_FORWARDED", "yes")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn test_http_provider_requires_url() {
        let err = ServiceConfig::from_lookup(lookup(&[("GRIDAI_PROVIDER", "http")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingEnv);
    }
}
