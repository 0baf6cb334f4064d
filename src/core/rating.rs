//! Bankability Rating Classification
//!
//! aggregate = (stability + capacity + (100 − risk)) / 3
//!
//! | aggregate ≥ | rating    | timeline |
//! |-------------|-----------|----------|
//! | 80          | Excellent | 12       |
//! | 70          | Good      | 18       |
//! | 60          | Moderate  | 24       |
//! | else        | Poor      | 36       |

use crate::models::types::{BankabilityRating, SubScores};
use crate::utils::constants::{EXCELLENT_THRESHOLD, GOOD_THRESHOLD, MODERATE_THRESHOLD};

/// Map an aggregate onto its band. Thresholds are inclusive lower bounds,
/// first match wins.
pub fn rating_for_aggregate(aggregate: f64) -> BankabilityRating {
    if aggregate >= EXCELLENT_THRESHOLD {
        BankabilityRating::Excellent
    } else if aggregate >= GOOD_THRESHOLD {
        BankabilityRating::Good
    } else if aggregate >= MODERATE_THRESHOLD {
        BankabilityRating::Moderate
    } else {
        BankabilityRating::Poor
    }
}

/// Classify three sub-scores into (rating, timeline_months)
pub fn classify(stability: i32, capacity: i32, risk: i32) -> (BankabilityRating, u32) {
    let scores = SubScores {
        stability,
        capacity,
        risk,
    };
    let rating = rating_for_aggregate(scores.aggregate());
    (rating, rating.timeline_months())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example_is_good() {
        // (80 + 78 + 70) / 3 = 76
        assert_eq!(classify(80, 78, 30), (BankabilityRating::Good, 18));
    }

    #[test]
    fn test_threshold_boundaries_inclusive() {
        assert_eq!(rating_for_aggregate(80.0), BankabilityRating::Excellent);
        assert_eq!(rating_for_aggregate(79.999), BankabilityRating::Good);
        assert_eq!(rating_for_aggregate(70.0), BankabilityRating::Good);
        assert_eq!(rating_for_aggregate(69.999), BankabilityRating::Moderate);
        assert_eq!(rating_for_aggregate(60.0), BankabilityRating::Moderate);
        assert_eq!(rating_for_aggregate(59.999), BankabilityRating::Poor);
    }

    #[test]
    fn test_exact_aggregate_from_integers() {
        // (90 + 90 + (100 - 40)) / 3 = 80 exactly
        assert_eq!(classify(90, 90, 40), (BankabilityRating::Excellent, 12));
        // (90 + 89 + 60) / 3 = 79.67
        assert_eq!(classify(90, 89, 40), (BankabilityRating::Good, 18));
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(95, 95, 5), (BankabilityRating::Excellent, 12));
        assert_eq!(classify(20, 30, 80), (BankabilityRating::Poor, 36));
    }

    #[test]
    fn test_monotonic_in_aggregate() {
        let mut previous = rating_for_aggregate(0.0);
        let mut aggregate = 0.0;
        while aggregate <= 100.0 {
            let current = rating_for_aggregate(aggregate);
            assert!(current >= previous, "rating dropped at {}", aggregate);
            previous = current;
            aggregate += 0.125;
        }
    }

    #[test]
    fn test_timeline_follows_rating() {
        for (s, c, r) in [(95, 95, 5), (80, 78, 30), (65, 60, 40), (20, 30, 80)] {
            let (rating, timeline) = classify(s, c, r);
            assert_eq!(timeline, rating.timeline_months());
        }
    }
}
