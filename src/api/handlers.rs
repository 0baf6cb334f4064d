//! API Request Handlers

use axum::{
    body::Bytes,
    extract::{Json, State},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::engine::BankabilityEngine;
use crate::models::config::ServiceConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::AnalysisResult;
use crate::providers;
use crate::utils::constants::{APP_VERSION, MAX_BATCH_CONCURRENCY, MAX_BATCH_SITES};
use crate::utils::telemetry::TelemetryCollector;

/// Shared application state
pub struct AppState {
    pub engine: Arc<BankabilityEngine>,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Deadline for each FeatureProvider call
    pub provider_timeout: Duration,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        engine: Arc<BankabilityEngine>,
        telemetry: Arc<TelemetryCollector>,
        rate_limiter: Arc<RateLimiter>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            telemetry,
            rate_limiter,
            provider_timeout,
            start_time: Instant::now(),
        }
    }

    /// Build engine, provider and limiter from service configuration
    pub fn from_config(config: &ServiceConfig, telemetry: Arc<TelemetryCollector>) -> AppResult<Self> {
        let provider = providers::from_config(config)?;
        let engine = BankabilityEngine::new(config.scoring, provider)?;
        let rate_limiter = RateLimiter::per_minute(config.rate_limit_per_minute)
            .trusting_forwarded_headers(config.trust_forwarded_headers);

        Ok(Self::new(
            Arc::new(engine),
            telemetry,
            Arc::new(rate_limiter),
            config.provider_timeout,
        ))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Parse, validate and assess one site body, recording the outcome
    async fn assess_body(&self, body: &[u8]) -> AppResult<AnalysisResult> {
        let start = Instant::now();

        let outcome = match SiteRequest::from_slice(body).and_then(|req| req.coordinate()) {
            Ok(coordinate) => {
                self.engine
                    .assess_coordinate(&coordinate, self.provider_timeout)
                    .await
            }
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(result) => self
                .telemetry
                .record_assessment(result.rating(), start.elapsed().as_millis() as u64),
            Err(e) => self.telemetry.record_failure(e.kind()),
        }

        outcome
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        provider: state.engine.provider_name().to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

// ============================================
// Site Analysis
// ============================================

pub async fn analyze_site(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, AppError> {
    let result = state.assess_body(&body).await?;
    Ok(Json(AnalysisResponse::from(&result)))
}

// ============================================
// Batch Analysis
// ============================================

pub async fn batch_analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BatchAnalysisData>, AppError> {
    let start = Instant::now();

    let req: BatchAnalysisRequest = serde_json::from_slice(&body)?;

    if req.sites.is_empty() {
        return Err(AppError::invalid_batch("sites array cannot be empty"));
    }
    if req.sites.len() > MAX_BATCH_SITES {
        return Err(AppError::invalid_batch(format!(
            "Maximum {} sites per batch request",
            MAX_BATCH_SITES
        )));
    }

    let total_requested = req.sites.len();
    let concurrency = req.concurrency.clamp(1, MAX_BATCH_CONCURRENCY);
    info!("📦 Batch of {} sites (concurrency {})", total_requested, concurrency);

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = AbortOnDrop(Vec::with_capacity(total_requested));

    for (index, site) in req.sites.into_iter().enumerate() {
        let sem = semaphore.clone();
        let state = state.clone();

        tasks.0.push(tokio::spawn(async move {
            let permit = match sem.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let err = AppError::internal("batch semaphore closed");
                    return BatchSiteResult::failure(index, &err, 0.0);
                }
            };

            let item_start = Instant::now();
            let outcome = match site.coordinate() {
                Ok(coordinate) => {
                    state
                        .engine
                        .assess_coordinate(&coordinate, state.provider_timeout)
                        .await
                }
                Err(e) => Err(e),
            };
            drop(permit);

            let latency_ms = item_start.elapsed().as_secs_f64() * 1000.0;
            match outcome {
                Ok(result) => {
                    state
                        .telemetry
                        .record_assessment(result.rating(), latency_ms as u64);
                    BatchSiteResult::success(index, &result, latency_ms)
                }
                Err(e) => {
                    state.telemetry.record_failure(e.kind());
                    BatchSiteResult::failure(index, &e, latency_ms)
                }
            }
        }));
    }

    // Collect results in request order
    let mut results = Vec::with_capacity(total_requested);
    for (index, handle) in tasks.0.iter_mut().enumerate() {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("❌ Batch task {} panicked: {}", index, e);
                let err = AppError::internal("assessment task failed");
                results.push(BatchSiteResult::failure(index, &err, 0.0));
            }
        }
    }

    let mut ratings = BTreeMap::new();
    for result in results.iter().filter_map(|r| r.result.as_ref()) {
        *ratings
            .entry(result.bankability_rating.as_str().to_string())
            .or_insert(0) += 1;
    }
    let total_succeeded = results.iter().filter(|r| r.result.is_some()).count();

    Ok(Json(BatchAnalysisData {
        total_requested,
        total_succeeded,
        total_failed: total_requested - total_succeeded,
        ratings,
        results,
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}

/// Aborts batch tasks still running when the request future is dropped
struct AbortOnDrop<T>(Vec<JoinHandle<T>>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsData> {
    let stats = state.telemetry.get_stats();

    info!(
        "📊 Stats: {} assessed, {} failed, {:.1}ms avg",
        stats.total_assessed, stats.total_failed, stats.avg_latency_ms
    );

    Json(StatsData {
        stats,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    })
}
