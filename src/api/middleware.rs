//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handlers::AppState;
use crate::models::errors::AppError;
use crate::utils::constants::DEFAULT_RATE_LIMIT_PER_MINUTE;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Rate limiter configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
    /// Key on X-Forwarded-For / X-Real-IP instead of the peer address.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_RATE_LIMIT_PER_MINUTE,
            window_duration: Duration::from_secs(60),
            trust_forwarded_headers: false,
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_secs: u64,
}

/// Fixed-window, in-memory rate limiter keyed by client
pub struct RateLimiter {
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    pub fn per_minute(requests: u32) -> Self {
        Self::new(RateLimitConfig {
            requests_per_window: requests,
            ..RateLimitConfig::default()
        })
    }

    pub fn trusting_forwarded_headers(mut self, trust: bool) -> Self {
        self.config.trust_forwarded_headers = trust;
        self
    }

    /// Bucket key for a request: forwarded client address when trusted,
    /// otherwise the peer socket address
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let forwarded = if self.config.trust_forwarded_headers {
            forwarded_client(headers)
        } else {
            None
        };

        forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_secs,
            };
        }

        entry.0 += 1;
        RateDecision {
            allowed: true,
            remaining: self.config.requests_per_window - entry.0,
            reset_secs,
        }
    }

    /// Drop clients idle for more than two windows
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window_duration;
        self.requests
            .retain(|_, (_, started)| now.duration_since(*started) < window * 2);
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodically evict stale rate limit entries
pub fn start_cleanup_task(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.cleanup();
            debug!("🧹 Rate limiter tracking {} clients", limiter.tracked_clients());
        }
    })
}

fn is_health_path(path: &str) -> bool {
    path == "/health" || path == "/v1/health"
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = state.rate_limiter.client_key(request.headers(), peer);
    let decision = state.rate_limiter.check(&key);

    if !decision.allowed {
        warn!(key = %key, "🚦 Rate limit exceeded");
        return AppError::rate_limited(decision.reset_secs).into_response();
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", decision.remaining.into());
    headers.insert("X-RateLimit-Reset", decision.reset_secs.into());

    response
}

/// Request logging middleware
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let mut response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_enforced_per_key() {
        let limiter = RateLimiter::per_minute(2);

        let first = limiter.check("a");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        assert!(limiter.check("a").allowed);

        let third = limiter.check("a");
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert!(third.reset_secs <= 60);

        // Other clients unaffected
        assert!(limiter.check("b").allowed);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 1,
            window_duration: Duration::from_millis(10),
            ..RateLimitConfig::default()
        });

        assert!(limiter.check("a").allowed);
        assert!(!limiter.check("a").allowed);
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("a").allowed);
    }

    #[test]
    fn test_cleanup_drops_stale_entries() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 5,
            window_duration: Duration::from_millis(5),
            ..RateLimitConfig::default()
        });
        limiter.check("a");
        limiter.check("b");
        assert_eq!(limiter.tracked_clients(), 2);

        std::thread::sleep(Duration::from_millis(15));
        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    fn peer(ip: &str) -> Option<SocketAddr> {
        Some(SocketAddr::new(ip.parse().unwrap(), 40_000))
    }

    #[test]
    fn test_client_key_uses_peer_address_by_default() {
        let limiter = RateLimiter::default();
        let mut headers = HeaderMap::new();
        assert_eq!(limiter.client_key(&headers, None), "unknown");
        assert_eq!(limiter.client_key(&headers, peer("192.0.2.10")), "192.0.2.10");

        // Forwarding headers are client-controlled unless a proxy sets them
        headers.insert("X-Forwarded-For", HeaderValue::from_static("1.1.1.1"));
        headers.insert("X-Real-IP", HeaderValue::from_static("2.2.2.2"));
        assert_eq!(limiter.client_key(&headers, peer("192.0.2.10")), "192.0.2.10");
    }

    #[test]
    fn test_client_key_trusted_forwarding_headers() {
        let limiter = RateLimiter::default().trusting_forwarded_headers(true);
        let mut headers = HeaderMap::new();
        assert_eq!(limiter.client_key(&headers, peer("10.0.0.1")), "10.0.0.1");

        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(limiter.client_key(&headers, peer("10.0.0.1")), "10.0.0.2");

        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(limiter.client_key(&headers, peer("10.0.0.1")), "203.0.113.7");
    }
}
