//! Risk Factor Derivation
//!
//! Independent threshold rules evaluated in a fixed order. Output order is
//! evaluation order, not severity.

use crate::models::types::RiskFactor;
use crate::utils::constants::{
    CAPACITY_CONCERN_BELOW, QUEUE_CONGESTION_ABOVE, REGULATORY_CONCERN_BELOW,
    STABILITY_CONCERN_BELOW,
};

/// Derive the explanations that apply to one site
pub fn derive(stability: i32, capacity: i32, risk: i32, aggregate: f64) -> Vec<RiskFactor> {
    let rules = [
        (stability < STABILITY_CONCERN_BELOW, RiskFactor::GridStability),
        (capacity < CAPACITY_CONCERN_BELOW, RiskFactor::TransmissionCapacity),
        (risk > QUEUE_CONGESTION_ABOVE, RiskFactor::QueueCongestion),
        (aggregate < REGULATORY_CONCERN_BELOW, RiskFactor::RegulatoryTimeline),
    ];

    rules
        .into_iter()
        .filter_map(|(fired, factor)| fired.then_some(factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_fire() {
        assert!(derive(80, 78, 30, 76.0).is_empty());
    }

    #[test]
    fn test_all_fire_in_order() {
        let factors = derive(50, 40, 70, 40.0);
        assert_eq!(
            factors,
            vec![
                RiskFactor::GridStability,
                RiskFactor::TransmissionCapacity,
                RiskFactor::QueueCongestion,
                RiskFactor::RegulatoryTimeline,
            ]
        );
    }

    #[test]
    fn test_order_preserved_for_subsets() {
        let factors = derive(90, 50, 20, 70.0);
        assert_eq!(factors, vec![RiskFactor::TransmissionCapacity]);

        let factors = derive(60, 90, 45, 68.3);
        assert_eq!(
            factors,
            vec![RiskFactor::GridStability, RiskFactor::QueueCongestion]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(derive(70, 60, 40, 65.0).is_empty());
        assert_eq!(derive(69, 60, 40, 65.0), vec![RiskFactor::GridStability]);
        assert_eq!(derive(70, 59, 40, 65.0), vec![RiskFactor::TransmissionCapacity]);
        assert_eq!(derive(70, 60, 41, 65.0), vec![RiskFactor::QueueCongestion]);
        assert_eq!(derive(70, 60, 40, 64.99), vec![RiskFactor::RegulatoryTimeline]);
    }

    #[test]
    fn test_catalog_texts() {
        let texts: Vec<&str> = derive(50, 40, 70, 40.0)
            .iter()
            .map(|f| f.description())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Grid stability concerns in target region",
                "Limited transmission capacity available",
                "High interconnection queue congestion",
                "Regulatory approval timeline uncertainty",
            ]
        );
    }
}
