//! End-to-end pipeline tests over synthetic statement text.

use finrecon::{
    analyze_pages, analyze_text, AssetClass, ColumnType, DiagnosticKind, DocumentType, Error,
    RawPage,
};

#[test]
fn test_ruled_statement_end_to_end() {
    let text = "\
Portfolio Statement as of 31.12.2024

| ISIN         | Name             | Qty | Price  | Value    | Currency |
| US0378331005 | APPLE INC        | 100 | 150.25 | 15025.00 | USD      |
";
    let analysis = analyze_text(text).unwrap();

    assert_eq!(analysis.document_type, DocumentType::PortfolioStatement);
    assert_eq!(analysis.tables.len(), 1);
    assert_eq!(
        analysis.tables[0].column_types,
        vec![
            ColumnType::Identifier,
            ColumnType::Description,
            ColumnType::Quantity,
            ColumnType::Price,
            ColumnType::Value,
            ColumnType::CurrencyCode,
        ]
    );

    assert_eq!(analysis.securities.len(), 1);
    let record = &analysis.securities[0];
    assert_eq!(record.isin.as_deref(), Some("US0378331005"));
    assert!(record.is_valid_isin);
    assert_eq!(record.description.as_deref(), Some("APPLE INC"));
    assert_eq!(record.quantity, Some(100.0));
    assert_eq!(record.current_price, Some(150.25));
    assert_eq!(record.actual_value, Some(15025.0));
    assert_eq!(record.currency.as_deref(), Some("USD"));
    assert!(!record.provenance.is_fallback());

    assert_eq!(analysis.summary.total_value, 15025.0);
    assert_eq!(analysis.summary.security_count, 1);
    assert_eq!(analysis.summary.currency.as_deref(), Some("USD"));
}

#[test]
fn test_tableless_document_falls_back_to_raw_text() {
    // Single-spaced lines defeat both extraction strategies on purpose.
    let text = "\
Holdings overview
CH0012032048 ROCHE HOLDING AG CHF 9'800 0.8%
US5949181045 MICROSOFT CORP USD 42'000 3.4%
DE0007164600 SAP SE EUR 18'750 1.5%";
    let analysis = analyze_text(text).unwrap();

    assert!(analysis.tables.is_empty());
    assert_eq!(analysis.securities.len(), 3);
    assert!(analysis
        .securities
        .iter()
        .all(|r| r.provenance.is_fallback() && r.is_valid_isin));

    let microsoft = &analysis.securities[1];
    assert_eq!(microsoft.currency.as_deref(), Some("USD"));
    assert_eq!(microsoft.actual_value, Some(42000.0));
    assert_eq!(microsoft.weight_percent, Some(3.4));
    assert_eq!(analysis.diagnostics.count(DiagnosticKind::NoTables), 1);
}

#[test]
fn test_invalid_checksum_kept_but_excluded_from_totals() {
    let text = "\
| ISIN         | Name       | Value    |
| US0378331005 | APPLE INC  | 10000.00 |
| US0378331004 | BROKEN ROW | 5000.00  |
";
    let analysis = analyze_text(text).unwrap();

    assert_eq!(analysis.securities.len(), 2);
    let broken = analysis
        .securities
        .iter()
        .find(|r| r.isin.as_deref() == Some("US0378331004"))
        .unwrap();
    assert!(!broken.is_valid_isin);
    assert_eq!(broken.actual_value, Some(5000.0));

    assert_eq!(analysis.summary.total_value, 10000.0);
    assert_eq!(analysis.summary.security_count, 1);
    assert_eq!(analysis.summary.excluded_count, 1);
    assert_eq!(analysis.diagnostics.invalid_isin_count(), 1);
}

#[test]
fn test_allocation_sums_to_hundred() {
    let text = "\
| ISIN         | Name            | Value    | Currency |
| US0378331005 | APPLE INC       | 60000.00 | CHF      |
| US5949181045 | GOVERNMENT BOND | 30000.00 | CHF      |
| CH0012032048 | CASH ACCOUNT    | 10000.00 | CHF      |
";
    let analysis = analyze_text(text).unwrap();
    let summary = &analysis.summary;

    assert_eq!(summary.total_value, 100000.0);
    let sum: f64 = summary.allocation.values().sum();
    assert!((sum - 100.0).abs() < 0.1, "allocation sums to {}", sum);
    assert!((summary.allocation_for("equity") - 60.0).abs() < 1e-9);
    assert!((summary.allocation_for("bond") - 30.0).abs() < 1e-9);
    assert!((summary.allocation_for("cash") - 10.0).abs() < 1e-9);
    assert!((summary.diversification_score - 40.0).abs() < 1e-9);

    let classes: Vec<AssetClass> = analysis.securities.iter().map(|r| r.asset_class).collect();
    assert_eq!(
        classes,
        vec![AssetClass::Equity, AssetClass::Bond, AssetClass::Cash]
    );
}

#[test]
fn test_bond_line_reconciliation() {
    // Layout: CCY NOMINAL COUPON% ISSUER YEAR PRICE ACTUAL WEIGHT%
    let text = "XS2530507273 USD 200'000 4.5% DEUTSCHE BANK 2026 99.3080 198'745 1.02%";
    let analysis = analyze_text(text).unwrap();

    assert_eq!(analysis.securities.len(), 1);
    let record = &analysis.securities[0];
    assert_eq!(record.isin.as_deref(), Some("XS2530507273"));
    assert_eq!(record.currency.as_deref(), Some("USD"));
    assert_eq!(record.nominal_value, Some(200000.0));
    assert_eq!(record.actual_value, Some(198745.0));
    assert_eq!(record.weight_percent, Some(1.02));
    assert_eq!(record.coupon, Some(4.5));
    assert_eq!(record.current_price, Some(99.308));
}

#[test]
fn test_empty_document_is_the_only_hard_error() {
    assert!(matches!(analyze_text(""), Err(Error::EmptyDocument)));
    assert!(matches!(analyze_pages(vec![]), Err(Error::EmptyDocument)));

    // Garbled content is not an error.
    let analysis = analyze_text("@#!$ l1l1l1 ...").unwrap();
    assert!(analysis.securities.is_empty());
    assert_eq!(analysis.summary.total_value, 0.0);
}

#[test]
fn test_blank_page_between_content_pages() {
    let pages = vec![
        RawPage::new(0, "Portfolio Statement"),
        RawPage::new(1, "   "),
        RawPage::new(2, "US0378331005 APPLE INC USD 15'025 1.1%"),
    ];
    let analysis = analyze_pages(pages).unwrap();

    assert_eq!(analysis.diagnostics.count(DiagnosticKind::EmptyPage), 1);
    assert_eq!(analysis.securities.len(), 1);
    assert_eq!(analysis.securities[0].provenance.page_index(), 2);
}

#[test]
fn test_duplicate_isin_across_pages_merges() {
    let pages = vec![
        RawPage::new(0, "US0378331005 APPLE INC USD 15'025 1.1%"),
        RawPage::new(1, "carried forward US0378331005"),
    ];
    let analysis = analyze_pages(pages).unwrap();

    assert_eq!(analysis.securities.len(), 1);
    assert_eq!(analysis.securities[0].actual_value, Some(15025.0));
}

#[test]
fn test_wrapped_description_survives_ruled_extraction() {
    let text = "\
+--------------+------------------+----------+
| ISIN         | Name             | Value    |
+--------------+------------------+----------+
| US5949181045 | MICROSOFT CORP   | 42'000   |
|              | REGISTERED SHS   |          |
+--------------+------------------+----------+";
    let analysis = analyze_text(text).unwrap();

    assert_eq!(analysis.securities.len(), 1);
    assert_eq!(
        analysis.securities[0].description.as_deref(),
        Some("MICROSOFT CORP REGISTERED SHS")
    );
    assert_eq!(analysis.securities[0].actual_value, Some(42000.0));
}

#[test]
fn test_account_statement_detected() {
    let text = "\
Account Statement
Opening balance 1'000.00
Closing balance 1'250.00";
    let analysis = analyze_text(text).unwrap();
    assert_eq!(analysis.document_type, DocumentType::AccountStatement);
}
