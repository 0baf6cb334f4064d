//! HTTP Feature Provider
//!
//! Fetches base feature values from a remote feature service:
//!
//! `GET {base_url}/features?lat={lat}&lon={lon}` →
//! `{ "stability": number, "capacity": number, "risk": number }`
//!
//! The engine bounds the whole call with its own deadline; the client
//! timeout here is only a backstop.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{BaseFeatures, Coordinate};
use crate::providers::traits::FeatureProvider;
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Wire format of the feature service
#[derive(Debug, Deserialize)]
struct FeatureResponse {
    stability: f64,
    capacity: f64,
    risk: f64,
}

pub struct HttpFeatureProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeatureProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorCode::ConfigInvalidValue,
                    "failed to build feature HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn features_url(&self) -> String {
        format!("{}/features", self.base_url)
    }
}

#[async_trait]
impl FeatureProvider for HttpFeatureProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, coordinate: &Coordinate) -> AppResult<BaseFeatures> {
        let url = self.features_url();
        debug!("🌐 Fetching features for {} from {}", coordinate, url);

        let response = self
            .client
            .get(&url)
            .query(&[("lat", coordinate.latitude()), ("lon", coordinate.longitude())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("⚠️ Feature service answered {} for {}", status, coordinate);
            return Err(AppError::provider_failed(format!(
                "feature service returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: FeatureResponse = response.json().await?;
        let features = BaseFeatures::new(body.stability, body.capacity, body.risk);
        features.ensure_finite()?;

        Ok(features)
    }
}
