//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be traced in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VAL_xxx: request validation errors
//! - PROVIDER_xxx: feature provider errors
//! - ENGINE_xxx: internal scoring invariants
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Coarse error taxonomy the boundary layer maps onto transport codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied bad input; nothing was computed
    Validation,
    /// Upstream feature source failed or timed out
    Provider,
    /// Internal defect in the scoring pipeline
    InvariantViolation,
    /// Transport-level rejection (rate limiting)
    Api,
    /// Startup configuration problem
    Config,
    Internal,
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors
    // ============================================
    /// Body is not valid JSON or has the wrong shape
    MalformedRequest,
    /// lat or lon absent
    MissingCoordinate,
    /// lat or lon not a finite number
    InvalidCoordinate,
    /// lat or lon outside the WGS84 domain
    CoordinateOutOfRange,
    /// Batch request empty or too large
    InvalidBatch,

    // ============================================
    // Provider Errors
    // ============================================
    /// Provider call failed
    ProviderFailed,
    /// Provider did not answer before the deadline
    ProviderTimeout,
    /// Provider answered with unusable data
    ProviderInvalidResponse,

    // ============================================
    // Engine Errors
    // ============================================
    /// Sub-score outside its declared range at assembly
    SubScoreOutOfBounds,

    // ============================================
    // API Errors
    // ============================================
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Validation Errors
            Self::MalformedRequest => "VAL_MALFORMED_REQUEST",
            Self::MissingCoordinate => "VAL_MISSING_COORDINATE",
            Self::InvalidCoordinate => "VAL_INVALID_COORDINATE",
            Self::CoordinateOutOfRange => "VAL_COORDINATE_OUT_OF_RANGE",
            Self::InvalidBatch => "VAL_INVALID_BATCH",

            // Provider Errors
            Self::ProviderFailed => "PROVIDER_FAILED",
            Self::ProviderTimeout => "PROVIDER_TIMEOUT",
            Self::ProviderInvalidResponse => "PROVIDER_INVALID_RESPONSE",

            // Engine Errors
            Self::SubScoreOutOfBounds => "ENGINE_SUBSCORE_OUT_OF_BOUNDS",

            // API Errors
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            // Configuration Errors
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequest
            | Self::MissingCoordinate
            | Self::InvalidCoordinate
            | Self::CoordinateOutOfRange
            | Self::InvalidBatch => ErrorKind::Validation,
            Self::ProviderFailed | Self::ProviderTimeout | Self::ProviderInvalidResponse => {
                ErrorKind::Provider
            }
            Self::SubScoreOutOfBounds => ErrorKind::InvariantViolation,
            Self::ApiRateLimited => ErrorKind::Api,
            Self::ConfigMissingEnv | Self::ConfigInvalidValue => ErrorKind::Config,
            Self::ApiInternalError | Self::Unknown => ErrorKind::Internal,
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ProviderTimeout => 504,
            Self::ApiRateLimited => 429,
            _ => match self.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::Provider => 502,
                _ => 500,
            },
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Malformed request body
    pub fn malformed_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRequest, msg)
    }

    /// Required coordinate field absent
    pub fn missing_coordinate(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingCoordinate,
            format!("missing required field: {}", field),
        )
    }

    /// Coordinate not a finite number
    pub fn invalid_coordinate(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCoordinate, msg)
    }

    /// Coordinate outside its domain
    pub fn coordinate_out_of_range(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CoordinateOutOfRange, msg)
    }

    /// Invalid batch request
    pub fn invalid_batch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidBatch, msg)
    }

    /// Provider failure
    pub fn provider_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderFailed, msg)
    }

    /// Provider timeout
    pub fn provider_timeout(timeout_ms: u128) -> Self {
        Self::new(
            ErrorCode::ProviderTimeout,
            format!("feature provider timed out after {}ms", timeout_ms),
        )
    }

    /// Provider returned unusable data
    pub fn provider_invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderInvalidResponse, msg)
    }

    /// Sub-score escaped its declared range
    pub fn subscore_out_of_bounds(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SubScoreOutOfBounds, msg)
    }

    /// Rate limit exceeded
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(
            ErrorCode::ApiRateLimited,
            format!("rate limit exceeded, retry after {} seconds", retry_after_secs),
        )
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(key: &str, msg: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("{}: {}", key, msg.into()),
        )
    }

    /// Required environment variable absent
    pub fn missing_env(key: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("missing environment variable: {}", key),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::with_source(ErrorCode::ProviderTimeout, "feature request timed out", err)
        } else if err.is_decode() {
            Self::with_source(
                ErrorCode::ProviderInvalidResponse,
                "feature response could not be decoded",
                err,
            )
        } else {
            Self::with_source(ErrorCode::ProviderFailed, "feature request failed", err)
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::MalformedRequest, err.to_string(), err)
    }
}
