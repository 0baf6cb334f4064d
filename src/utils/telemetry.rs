//! Telemetry Module
//!
//! In-process counters for assessments served since startup:
//! - ratings handed out per band
//! - failures per error kind
//! - average latency
//!
//! Nothing here is persisted and no site coordinates are kept.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::models::errors::ErrorKind;
use crate::models::types::BankabilityRating;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Default)]
pub struct TelemetryStats {
    /// Completed assessments
    pub total_assessed: u64,
    /// Requests that ended in an error
    pub total_failed: u64,
    /// Rejected before any computation
    pub validation_rejections: u64,
    /// Feature provider failures and timeouts
    pub provider_failures: u64,
    /// Internal invariant violations (should stay at zero)
    pub invariant_violations: u64,
    /// Completed assessments per rating
    pub ratings: HashMap<String, u64>,
    /// Average assessment latency (ms)
    pub avg_latency_ms: f64,
    /// Session start (unix seconds)
    pub period_start: i64,
    /// Snapshot time (unix seconds)
    pub period_end: i64,
}

impl TelemetryStats {
    /// Plain-text summary, printed at shutdown
    pub fn summary(&self) -> String {
        let mut output = String::from("📊 Assessment summary\n");
        output.push_str(&format!("   Assessed:               {}\n", self.total_assessed));
        output.push_str(&format!("   Failed:                 {}\n", self.total_failed));
        output.push_str(&format!("     validation:           {}\n", self.validation_rejections));
        output.push_str(&format!("     provider:             {}\n", self.provider_failures));
        output.push_str(&format!("     invariant:            {}\n", self.invariant_violations));
        for rating in BankabilityRating::ALL {
            let count = self.ratings.get(rating.as_str()).copied().unwrap_or(0);
            output.push_str(&format!("   {:<23} {}\n", format!("{}:", rating), count));
        }
        output.push_str(&format!("   Avg latency:            {:.2}ms\n", self.avg_latency_ms));
        output
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_assessed: AtomicU64,
    total_failed: AtomicU64,
    validation_rejections: AtomicU64,
    provider_failures: AtomicU64,
    invariant_violations: AtomicU64,
    total_latency_ms: AtomicU64,
    rating_counts: RwLock<HashMap<BankabilityRating, u64>>,
    session_start: i64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_assessed: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            invariant_violations: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            rating_counts: RwLock::new(HashMap::new()),
            session_start: chrono::Utc::now().timestamp(),
        }
    }

    /// Record a completed assessment
    pub fn record_assessment(&self, rating: BankabilityRating, latency_ms: u64) {
        self.total_assessed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if let Ok(mut counts) = self.rating_counts.write() {
            *counts.entry(rating).or_insert(0) += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, kind: ErrorKind) {
        self.total_failed.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            ErrorKind::Validation => &self.validation_rejections,
            ErrorKind::Provider => &self.provider_failures,
            ErrorKind::InvariantViolation => &self.invariant_violations,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_assessed = self.total_assessed.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_assessed > 0 {
            total_latency as f64 / total_assessed as f64
        } else {
            0.0
        };

        let ratings = self
            .rating_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(rating, count)| (rating.as_str().to_string(), *count))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_assessed,
            total_failed: self.total_failed.load(Ordering::Relaxed),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
            ratings,
            avg_latency_ms,
            period_start: self.session_start,
            period_end: chrono::Utc::now().timestamp(),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_basic() {
        let collector = TelemetryCollector::new();

        collector.record_assessment(BankabilityRating::Good, 10);
        collector.record_assessment(BankabilityRating::Good, 20);
        collector.record_assessment(BankabilityRating::Poor, 30);
        collector.record_failure(ErrorKind::Validation);
        collector.record_failure(ErrorKind::Provider);

        let stats = collector.get_stats();
        assert_eq!(stats.total_assessed, 3);
        assert_eq!(stats.total_failed, 2);
        assert_eq!(stats.validation_rejections, 1);
        assert_eq!(stats.provider_failures, 1);
        assert_eq!(stats.ratings.get("Good"), Some(&2));
        assert_eq!(stats.ratings.get("Poor"), Some(&1));
        assert_eq!(stats.avg_latency_ms, 20.0);
    }

    #[test]
    fn test_empty_collector() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_assessed, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert!(stats.ratings.is_empty());
    }

    #[test]
    fn test_summary_lists_every_band() {
        let collector = TelemetryCollector::new();
        collector.record_assessment(BankabilityRating::Excellent, 5);

        let summary = collector.get_stats().summary();
        assert!(summary.contains("Excellent:"));
        assert!(summary.contains("Moderate:"));
        assert!(summary.contains("Assessed:               1"));
    }
}
