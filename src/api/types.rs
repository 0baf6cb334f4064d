//! API Request/Response Types

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, warn};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{AnalysisResult, BankabilityRating, Coordinate};
use crate::utils::telemetry::TelemetryStats;
use crate::utils::constants::DEFAULT_BATCH_CONCURRENCY;

// ============================================
// Errors
// ============================================

/// Failure body: `{ "error": "..." }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = self.code_str(), status = status.as_u16(), "❌ {}", self.message);
        } else {
            warn!(code = self.code_str(), status = status.as_u16(), "🚫 {}", self.message);
        }

        let mut response = (
            status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response();
        response
            .headers_mut()
            .insert("X-Error-Code", HeaderValue::from_static(self.code.as_str()));
        response
    }
}

// ============================================
// Site Analysis
// ============================================

/// `{ "lat": number, "lon": number }`. Fields are kept raw so that missing
/// and non-numeric values get distinct errors.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteRequest {
    #[serde(default)]
    pub lat: Option<serde_json::Value>,
    #[serde(default)]
    pub lon: Option<serde_json::Value>,
}

impl SiteRequest {
    pub fn from_slice(body: &[u8]) -> AppResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn coordinate(&self) -> AppResult<Coordinate> {
        let lat = numeric_field("lat", self.lat.as_ref())?;
        let lon = numeric_field("lon", self.lon.as_ref())?;
        Coordinate::new(lat, lon)
    }
}

fn numeric_field(name: &str, value: Option<&serde_json::Value>) -> AppResult<f64> {
    match value {
        None | Some(serde_json::Value::Null) => Err(AppError::missing_coordinate(name)),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::invalid_coordinate(format!("{} must be a finite number", name))),
        Some(_) => Err(AppError::invalid_coordinate(format!(
            "{} must be a number",
            name
        ))),
    }
}

/// Success body for one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub grid_stability_score: i32,
    pub transmission_capacity_score: i32,
    pub interconnection_risk_score: i32,
    pub bankability_rating: BankabilityRating,
    pub estimated_timeline_months: u32,
    pub risk_factors: Vec<String>,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            grid_stability_score: result.stability(),
            transmission_capacity_score: result.capacity(),
            interconnection_risk_score: result.risk(),
            bankability_rating: result.rating(),
            estimated_timeline_months: result.timeline_months(),
            risk_factors: result
                .risk_factors()
                .iter()
                .map(|f| f.description().to_string())
                .collect(),
        }
    }
}

// ============================================
// Batch Analysis
// ============================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchAnalysisRequest {
    pub sites: Vec<SiteRequest>,
    /// Max concurrent assessments (default: 10, max: 20)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

#[derive(Debug, Serialize)]
pub struct BatchAnalysisData {
    pub total_requested: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    /// Successful assessments per rating
    pub ratings: BTreeMap<String, usize>,
    pub results: Vec<BatchSiteResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchSiteResult {
    /// Position in the request
    pub index: usize,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: f64,
}

impl BatchSiteResult {
    pub fn success(index: usize, result: &AnalysisResult, latency_ms: f64) -> Self {
        Self {
            index,
            status: "success".to_string(),
            result: Some(result.into()),
            error: None,
            latency_ms,
        }
    }

    pub fn failure(index: usize, error: &AppError, latency_ms: f64) -> Self {
        Self {
            index,
            status: "error".to_string(),
            result: None,
            error: Some(error.message.clone()),
            latency_ms,
        }
    }
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: TelemetryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider: String,
    pub timestamp: i64,
}
