//! Portfolio-level aggregate types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived portfolio aggregates.
///
/// Recomputed whole whenever the security set changes; never mutated
/// incrementally. Only valid records with a market value contribute to
/// `total_value` and `allocation`; everything else shows up in
/// `excluded_count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of actual values of contributing records
    pub total_value: f64,

    /// Reporting currency, if one could be determined
    pub currency: Option<String>,

    /// Number of records contributing to the total
    pub security_count: usize,

    /// Records excluded from totals (invalid ISIN or missing value)
    pub excluded_count: usize,

    /// Asset class name to allocation percentage; percentages sum to
    /// 100 within rounding tolerance. Classes with zero holdings are
    /// omitted.
    pub allocation: BTreeMap<String, f64>,

    /// Coarse diversification indicator in [0, 100]; more classes and a
    /// more even split score higher
    pub diversification_score: f64,
}

impl PortfolioSummary {
    /// Allocation percentage for one asset class, 0.0 if absent.
    pub fn allocation_for(&self, asset_class: &str) -> f64 {
        self.allocation.get(asset_class).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_for_missing_class() {
        let summary = PortfolioSummary::default();
        assert_eq!(summary.allocation_for("equity"), 0.0);
    }
}
