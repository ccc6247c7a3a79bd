//! Portfolio aggregation.
//!
//! Totals, per-asset-class allocation and a coarse diversification score,
//! computed whole from the current record set. Records with an invalid
//! identifier or no market value are counted but never summed.

use std::collections::{BTreeMap, HashMap};

use crate::model::{DiagnosticKind, Diagnostics, PortfolioSummary, SecurityRecord};

/// Aggregate a record set into a portfolio summary.
///
/// The reporting currency is the single currency the contributing records
/// share; with mixed currencies the most frequent one is used and a
/// diagnostic is recorded, since cross-currency sums without FX rates are
/// only indicative.
pub fn aggregate(records: &[SecurityRecord], diagnostics: &mut Diagnostics) -> PortfolioSummary {
    let contributing: Vec<&SecurityRecord> =
        records.iter().filter(|r| r.contributes_to_totals()).collect();
    let excluded_count = records.len() - contributing.len();

    let total_value: f64 = contributing
        .iter()
        .filter_map(|r| r.actual_value)
        .sum();

    let mut by_class: BTreeMap<&'static str, f64> = BTreeMap::new();
    for record in &contributing {
        if let Some(value) = record.actual_value {
            *by_class.entry(record.asset_class.as_str()).or_insert(0.0) += value;
        }
    }

    let mut allocation: BTreeMap<String, f64> = BTreeMap::new();
    let mut largest_share = 0.0f64;
    if total_value > 0.0 {
        for (class, value) in &by_class {
            let share = value / total_value;
            largest_share = largest_share.max(share);
            allocation.insert((*class).to_string(), share * 100.0);
        }
    }

    let diversification_score = if contributing.is_empty() || total_value <= 0.0 {
        0.0
    } else {
        ((1.0 - largest_share) * 100.0).clamp(0.0, 100.0)
    };

    PortfolioSummary {
        total_value,
        currency: reporting_currency(&contributing, diagnostics),
        security_count: contributing.len(),
        excluded_count,
        allocation,
        diversification_score,
    }
}

fn reporting_currency(
    contributing: &[&SecurityRecord],
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in contributing {
        if let Some(currency) = record.currency.as_deref() {
            *counts.entry(currency).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }
    if counts.len() > 1 {
        let mut seen: Vec<&str> = counts.keys().copied().collect();
        seen.sort_unstable();
        diagnostics.record(
            DiagnosticKind::MixedCurrencies,
            None,
            format!("positions in {}", seen.join(", ")),
        );
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(currency, _)| currency.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetClass, Provenance};

    fn record(value: f64, class: AssetClass, currency: &str) -> SecurityRecord {
        let mut r = SecurityRecord::new(Provenance::Fallback { page_index: 0 });
        r.is_valid_isin = true;
        r.actual_value = Some(value);
        r.asset_class = class;
        r.currency = Some(currency.to_string());
        r
    }

    #[test]
    fn test_totals_and_allocation_sum() {
        let records = vec![
            record(60000.0, AssetClass::Equity, "CHF"),
            record(30000.0, AssetClass::Bond, "CHF"),
            record(10000.0, AssetClass::Cash, "CHF"),
        ];
        let mut diagnostics = Diagnostics::new();
        let summary = aggregate(&records, &mut diagnostics);

        assert_eq!(summary.total_value, 100000.0);
        assert_eq!(summary.security_count, 3);
        assert_eq!(summary.excluded_count, 0);
        assert_eq!(summary.currency.as_deref(), Some("CHF"));

        let sum: f64 = summary.allocation.values().sum();
        assert!((sum - 100.0).abs() < 0.1);
        assert!((summary.allocation_for("equity") - 60.0).abs() < 1e-9);
        // Largest share 60% leaves a score of 40.
        assert!((summary.diversification_score - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_and_valueless_records_excluded() {
        let mut invalid = record(5000.0, AssetClass::Equity, "CHF");
        invalid.is_valid_isin = false;
        let mut valueless = record(0.0, AssetClass::Bond, "CHF");
        valueless.actual_value = None;

        let records = vec![record(10000.0, AssetClass::Equity, "CHF"), invalid, valueless];
        let mut diagnostics = Diagnostics::new();
        let summary = aggregate(&records, &mut diagnostics);

        assert_eq!(summary.total_value, 10000.0);
        assert_eq!(summary.security_count, 1);
        assert_eq!(summary.excluded_count, 2);
    }

    #[test]
    fn test_single_class_scores_zero() {
        let records = vec![
            record(10000.0, AssetClass::Equity, "USD"),
            record(20000.0, AssetClass::Equity, "USD"),
        ];
        let mut diagnostics = Diagnostics::new();
        let summary = aggregate(&records, &mut diagnostics);
        assert_eq!(summary.diversification_score, 0.0);
        assert_eq!(summary.allocation.len(), 1);
    }

    #[test]
    fn test_mixed_currencies_reported() {
        let records = vec![
            record(10000.0, AssetClass::Equity, "USD"),
            record(20000.0, AssetClass::Bond, "CHF"),
            record(5000.0, AssetClass::Cash, "CHF"),
        ];
        let mut diagnostics = Diagnostics::new();
        let summary = aggregate(&records, &mut diagnostics);

        assert_eq!(summary.currency.as_deref(), Some("CHF"));
        assert_eq!(diagnostics.count(DiagnosticKind::MixedCurrencies), 1);
    }

    #[test]
    fn test_empty_records() {
        let mut diagnostics = Diagnostics::new();
        let summary = aggregate(&[], &mut diagnostics);
        assert_eq!(summary.total_value, 0.0);
        assert_eq!(summary.security_count, 0);
        assert!(summary.allocation.is_empty());
        assert_eq!(summary.diversification_score, 0.0);
        assert!(summary.currency.is_none());
    }
}
