//! Constants Module - Single Source of Truth
//!
//! Score ranges, thresholds, catalog texts and environment variable names
//! used across the engine, the providers and the API.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "GridAI";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound feature requests
pub const USER_AGENT: &str = concat!("GridAI/", env!("CARGO_PKG_VERSION"));

// ============================================
// COORDINATE DOMAIN
// ============================================

pub const LATITUDE_MIN: f64 = -90.0;
pub const LATITUDE_MAX: f64 = 90.0;
pub const LONGITUDE_MIN: f64 = -180.0;
pub const LONGITUDE_MAX: f64 = 180.0;

// ============================================
// GEOGRAPHIC MODULATION
// ============================================

/// Latitude frequency (radians per degree)
pub const DEFAULT_K_LAT: f64 = 0.1;
/// Longitude frequency (radians per degree)
pub const DEFAULT_K_LON: f64 = 0.1;

// ============================================
// METRIC BOUNDS
// ============================================

/// Grid stability: declared [20, 95], base [60, 90], weight 10
pub const STABILITY_DECLARED_MIN: f64 = 20.0;
pub const STABILITY_DECLARED_MAX: f64 = 95.0;
pub const STABILITY_BASE_MIN: f64 = 60.0;
pub const STABILITY_BASE_MAX: f64 = 90.0;
pub const STABILITY_WEIGHT: f64 = 10.0;

/// Transmission capacity: declared [30, 95], base [50, 90], weight 15
pub const CAPACITY_DECLARED_MIN: f64 = 30.0;
pub const CAPACITY_DECLARED_MAX: f64 = 95.0;
pub const CAPACITY_BASE_MIN: f64 = 50.0;
pub const CAPACITY_BASE_MAX: f64 = 90.0;
pub const CAPACITY_WEIGHT: f64 = 15.0;

/// Interconnection risk: declared [5, 80], base [10, 60], weight 10 (inverted)
pub const RISK_DECLARED_MIN: f64 = 5.0;
pub const RISK_DECLARED_MAX: f64 = 80.0;
pub const RISK_BASE_MIN: f64 = 10.0;
pub const RISK_BASE_MAX: f64 = 60.0;
pub const RISK_WEIGHT: f64 = 10.0;

// ============================================
// RATING THRESHOLDS (inclusive lower bounds)
// ============================================

pub const EXCELLENT_THRESHOLD: f64 = 80.0;
pub const GOOD_THRESHOLD: f64 = 70.0;
pub const MODERATE_THRESHOLD: f64 = 60.0;

// ============================================
// RISK FACTOR RULES
// ============================================

pub const STABILITY_CONCERN_BELOW: i32 = 70;
pub const CAPACITY_CONCERN_BELOW: i32 = 60;
pub const QUEUE_CONGESTION_ABOVE: i32 = 40;
pub const REGULATORY_CONCERN_BELOW: f64 = 65.0;

pub const RISK_FACTOR_STABILITY_TEXT: &str = "Grid stability concerns in target region";
pub const RISK_FACTOR_CAPACITY_TEXT: &str = "Limited transmission capacity available";
pub const RISK_FACTOR_QUEUE_TEXT: &str = "High interconnection queue congestion";
pub const RISK_FACTOR_REGULATORY_TEXT: &str = "Regulatory approval timeline uncertainty";

// ============================================
// SERVICE DEFAULTS
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Batch limits
pub const MAX_BATCH_SITES: usize = 100;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;
pub const MAX_BATCH_CONCURRENCY: usize = 20;

// ============================================
// ENVIRONMENT VARIABLES
// ============================================

pub const ENV_HOST: &str = "GRIDAI_HOST";
pub const ENV_PORT: &str = "GRIDAI_PORT";
/// Platform-provided port, takes precedence over GRIDAI_PORT
pub const ENV_PLATFORM_PORT: &str = "PORT";
pub const ENV_PROVIDER: &str = "GRIDAI_PROVIDER";
pub const ENV_PROVIDER_URL: &str = "GRIDAI_PROVIDER_URL";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "GRIDAI_PROVIDER_TIMEOUT_MS";
pub const ENV_SEED: &str = "GRIDAI_SEED";
pub const ENV_RATE_LIMIT: &str = "GRIDAI_RATE_LIMIT";
pub const ENV_SIMULATED_LATENCY_MS: &str = "GRIDAI_SIMULATED_LATENCY_MS";
/// Key rate limits on X-Forwarded-For / X-Real-IP (only behind a trusted proxy)
pub const ENV_TRUST_FORWARDED: &str = "GRIDAI_TRUST_FORWARDED";
