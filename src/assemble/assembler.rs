//! ISIN-anchored security record assembly.
//!
//! Classified tables are the primary channel: any table with an
//! identifier column yields one record per ISIN row, pulling the other
//! fields from their typed columns. Rows (or whole documents) without
//! usable table structure fall back to raw-text scanning with a
//! fixed-radius context window around each ISIN match.

use std::collections::HashMap;

use crate::classify::{ClassifiedTable, ColumnType, KeywordTable};
use crate::model::{
    AssetClass, DiagnosticKind, Diagnostics, Provenance, RawPage, SecurityRecord,
};

use super::isin::{find_isins, is_isin_format, validate_isin};
use super::reconcile::{normalize_number, normalize_percent, ValueReconciler};

/// Default context window radius around a raw-text ISIN match, in
/// characters.
pub const DEFAULT_CONTEXT_RADIUS: usize = 300;

/// Builds security records from classified tables and raw page text.
pub struct SecurityAssembler {
    keywords: KeywordTable,
    reconciler: ValueReconciler,
    context_radius: usize,
}

impl SecurityAssembler {
    /// Create an assembler with the built-in keyword table.
    pub fn new() -> Self {
        Self::with_options(KeywordTable::builtin(), DEFAULT_CONTEXT_RADIUS)
    }

    /// Create an assembler with a custom keyword table and context
    /// window radius.
    pub fn with_options(keywords: KeywordTable, context_radius: usize) -> Self {
        Self {
            reconciler: ValueReconciler::with_keywords(keywords.clone()),
            keywords,
            context_radius,
        }
    }

    /// Assemble records for one document.
    ///
    /// Invalid-format identifiers are retained and flagged rather than
    /// dropped, so audit can see why something was excluded from totals.
    /// Duplicate ISINs merge by filling missing fields only.
    pub fn assemble(
        &self,
        tables: &[ClassifiedTable],
        pages: &[RawPage],
        diagnostics: &mut Diagnostics,
    ) -> Vec<SecurityRecord> {
        let mut records: Vec<SecurityRecord> = Vec::new();
        let mut by_isin: HashMap<String, usize> = HashMap::new();

        let mut any_identifier_table = false;
        for table in tables {
            let Some(id_col) = table.column_of_type(ColumnType::Identifier) else {
                continue;
            };
            any_identifier_table = true;
            for row in table.body_rows() {
                if let Some(record) = self.assemble_row(table, id_col, row, diagnostics) {
                    merge_record(&mut records, &mut by_isin, record);
                }
            }
        }

        if !any_identifier_table {
            // No classified table anchors identifiers anywhere in the
            // document: scan the raw text instead.
            log::debug!("no identifier column in any table, scanning raw text");
            for page in pages {
                let matches = find_isins(&page.text);
                for (i, (offset, isin)) in matches.iter().enumerate() {
                    let next_offset = matches.get(i + 1).map(|(o, _)| *o);
                    let record = self.assemble_from_text(
                        page,
                        *offset,
                        isin.clone(),
                        next_offset,
                        diagnostics,
                    );
                    merge_record(&mut records, &mut by_isin, record);
                }
            }
        }

        records
    }

    fn assemble_row(
        &self,
        table: &ClassifiedTable,
        id_col: usize,
        row: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Option<SecurityRecord> {
        let id_cell = row.get(id_col)?;
        // Subtotal and spacer rows have no identifier; skip them.
        let isin = id_cell
            .split(|c: char| c.is_whitespace())
            .find(|t| is_isin_format(t))?
            .to_string();

        let page_index = table.table.page_index;
        let mut record = SecurityRecord::new(Provenance::Table {
            table_id: table.table.table_id(),
            page_index,
        });
        record.is_valid_isin = validate_isin(&isin);
        if !record.is_valid_isin {
            diagnostics.record(
                DiagnosticKind::InvalidIsin,
                Some(page_index),
                format!("checksum failed: {}", isin),
            );
        }
        record.isin = Some(isin);

        for (col, column_type) in table.column_types.iter().enumerate() {
            if col == id_col {
                continue;
            }
            let Some(cell) = row.get(col) else { continue };
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match column_type {
                ColumnType::Description => {
                    record.description = Some(cell.replace('\n', " "));
                }
                ColumnType::Quantity => {
                    record.quantity = self.number_or_report(cell, page_index, diagnostics);
                }
                ColumnType::Price => {
                    record.current_price = self.number_or_report(cell, page_index, diagnostics);
                }
                ColumnType::AcquisitionPrice => {
                    record.acquisition_price =
                        self.number_or_report(cell, page_index, diagnostics);
                }
                ColumnType::Value => {
                    record.actual_value = self.number_or_report(cell, page_index, diagnostics);
                }
                ColumnType::CurrencyCode => {
                    let token = cell.to_uppercase();
                    if self.keywords.is_currency_code(&token) || token.len() == 3 {
                        record.currency = Some(token);
                    }
                }
                ColumnType::Date => {
                    record.maturity = self.reconciler_maturity(cell);
                }
                ColumnType::Coupon => {
                    record.coupon = normalize_percent(cell).or_else(|| normalize_number(cell));
                }
                ColumnType::Percentage => {
                    record.weight_percent =
                        normalize_percent(cell).or_else(|| normalize_number(cell));
                }
                _ => {}
            }
        }

        // Tables missing description or value columns leave gaps; scan
        // the row as unstructured text to fill them.
        if record.description.is_none() || record.actual_value.is_none() {
            let row_text = row.join("  ").replace('\n', " ");
            self.reconciler.reconcile(&mut record, &row_text, diagnostics);
        }

        record.asset_class = self.classify_asset_class(&record);
        Some(record)
    }

    fn assemble_from_text(
        &self,
        page: &RawPage,
        offset: usize,
        isin: String,
        next_offset: Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> SecurityRecord {
        let mut record = SecurityRecord::new(Provenance::Fallback {
            page_index: page.index,
        });
        record.is_valid_isin = validate_isin(&isin);
        if !record.is_valid_isin {
            diagnostics.record(
                DiagnosticKind::InvalidIsin,
                Some(page.index),
                format!("checksum failed: {}", isin),
            );
        }

        let window = fallback_window(
            &page.text,
            offset,
            isin.len(),
            next_offset,
            self.context_radius,
        );
        // The name tokens on the match line are the best description
        // guess available without table structure.
        let line = window.lines().next().unwrap_or("");
        let name_tokens: Vec<&str> = line
            .split_whitespace()
            .filter(|t| *t != isin)
            .filter(|t| t.chars().any(|c| c.is_alphabetic()))
            .filter(|t| !t.ends_with('%'))
            .filter(|t| {
                !(t.len() == 3
                    && t.chars().all(|c| c.is_ascii_uppercase())
                    && self.keywords.is_currency_code(t))
            })
            .collect();
        if !name_tokens.is_empty() {
            record.description = Some(name_tokens.join(" "));
        }

        record.isin = Some(isin);
        self.reconciler.reconcile(&mut record, window, diagnostics);
        record.asset_class = self.classify_asset_class(&record);
        record
    }

    fn number_or_report(
        &self,
        cell: &str,
        page_index: usize,
        diagnostics: &mut Diagnostics,
    ) -> Option<f64> {
        let parsed = normalize_number(cell);
        if parsed.is_none() {
            diagnostics.record(
                DiagnosticKind::UnparsableToken,
                Some(page_index),
                format!("cell value: {}", cell),
            );
        }
        parsed
    }

    fn reconciler_maturity(&self, cell: &str) -> Option<chrono::NaiveDate> {
        // Reuse the reconciler's date handling via a throwaway record.
        let mut probe = SecurityRecord::new(Provenance::Fallback { page_index: 0 });
        let mut scratch = Diagnostics::new();
        self.reconciler.reconcile(&mut probe, cell, &mut scratch);
        probe.maturity
    }

    /// Coarse asset classification from description keywords plus
    /// maturity/coupon presence.
    fn classify_asset_class(&self, record: &SecurityRecord) -> AssetClass {
        let description = record
            .description
            .as_deref()
            .unwrap_or("")
            .to_lowercase();

        let matches_any =
            |set: &[String]| set.iter().any(|kw| description.contains(kw.as_str()));

        if matches_any(&self.keywords.cash_keywords) {
            return AssetClass::Cash;
        }
        if matches_any(&self.keywords.structured_keywords) {
            return AssetClass::StructuredProduct;
        }
        if matches_any(&self.keywords.fund_keywords) {
            return AssetClass::Fund;
        }
        if matches_any(&self.keywords.bond_keywords)
            || (record.maturity.is_some() && record.coupon.is_some())
        {
            return AssetClass::Bond;
        }
        if !description.is_empty() {
            return AssetClass::Equity;
        }
        AssetClass::Other
    }
}

impl Default for SecurityAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_record(
    records: &mut Vec<SecurityRecord>,
    by_isin: &mut HashMap<String, usize>,
    record: SecurityRecord,
) {
    if let Some(isin) = record.isin.clone() {
        if let Some(&index) = by_isin.get(&isin) {
            records[index].merge_missing(&record);
            return;
        }
        by_isin.insert(isin, records.len());
    }
    records.push(record);
}

/// Context window for a raw-text ISIN match.
///
/// Starts at the match's own line and runs up to `radius` characters past
/// the identifier, truncated before the line holding the next match so
/// neighboring positions never bleed into each other's windows.
fn fallback_window(
    text: &str,
    offset: usize,
    match_len: usize,
    next_offset: Option<usize>,
    radius: usize,
) -> &str {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut end = (offset + match_len + radius).min(text.len());
    if let Some(next) = next_offset {
        let next_line_start = text[..next].rfind('\n').map(|i| i + 1).unwrap_or(0);
        if next_line_start > offset {
            end = end.min(next_line_start);
        }
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ColumnClassifier;
    use crate::model::{CandidateTable, Region};

    fn classified(rows: Vec<Vec<&str>>) -> ClassifiedTable {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        let end = rows.len().saturating_sub(1);
        let table = CandidateTable::new(rows, 0, "ruled", 0.9, Region::new(0, end));
        ColumnClassifier::new().classify_table(table)
    }

    #[test]
    fn test_assemble_from_classified_table() {
        let table = classified(vec![
            vec!["ISIN", "Name", "Qty", "Price", "Value", "Currency"],
            vec!["US0378331005", "APPLE INC", "100", "150.25", "15025.00", "USD"],
        ]);
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[table], &[], &mut diagnostics);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.isin.as_deref(), Some("US0378331005"));
        assert!(record.is_valid_isin);
        assert_eq!(record.description.as_deref(), Some("APPLE INC"));
        assert_eq!(record.quantity, Some(100.0));
        assert_eq!(record.current_price, Some(150.25));
        assert_eq!(record.actual_value, Some(15025.0));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.asset_class, AssetClass::Equity);
        assert!(!record.provenance.is_fallback());
    }

    #[test]
    fn test_invalid_checksum_kept_and_flagged() {
        let table = classified(vec![
            vec!["ISIN", "Name", "Value"],
            vec!["US0378331004", "APPLE INC", "15025.00"],
        ]);
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[table], &[], &mut diagnostics);

        assert_eq!(records.len(), 1);
        assert!(!records[0].is_valid_isin);
        assert_eq!(diagnostics.invalid_isin_count(), 1);
    }

    #[test]
    fn test_subtotal_rows_skipped() {
        let table = classified(vec![
            vec!["ISIN", "Name", "Value"],
            vec!["US0378331005", "APPLE INC", "15025.00"],
            vec!["", "Subtotal equities", "15025.00"],
        ]);
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[table], &[], &mut diagnostics);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_raw_text_fallback_yields_all_isins() {
        let text = "\
Holdings overview
CH0012032048 ROCHE HOLDING AG CHF 9'800 0.8%
US5949181045 MICROSOFT CORP USD 42'000 3.4%
DE0007164600 SAP SE EUR 18'750 1.5%";
        let pages = vec![RawPage::new(0, text)];
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[], &pages, &mut diagnostics);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.provenance.is_fallback()));
        assert!(records.iter().all(|r| r.is_valid_isin));
        assert_eq!(records[1].currency.as_deref(), Some("USD"));
        assert_eq!(records[1].actual_value, Some(42000.0));
    }

    #[test]
    fn test_duplicate_isin_merges_fields() {
        let text = "US0378331005 APPLE INC USD 15'025 1.1%\nsee also US0378331005 ref";
        let pages = vec![RawPage::new(0, text)];
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[], &pages, &mut diagnostics);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actual_value, Some(15025.0));
    }

    #[test]
    fn test_bond_classification_from_context() {
        let text = "XS1796209082 2.25% EMITTENT MEDIUM TERM NOTE 15.06.2026 USD 100'000 98'500 1.0%";
        let pages = vec![RawPage::new(0, text)];
        let mut diagnostics = Diagnostics::new();
        let records = SecurityAssembler::new().assemble(&[], &pages, &mut diagnostics);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset_class, AssetClass::Bond);
        assert_eq!(records[0].nominal_value, Some(100000.0));
        assert_eq!(records[0].actual_value, Some(98500.0));
    }

    #[test]
    fn test_fallback_window_snaps_char_boundaries() {
        let text = "ééééé US0378331005 ééééé";
        let found = find_isins(text);
        assert_eq!(found.len(), 1);
        let (offset, isin) = &found[0];
        let window = fallback_window(text, *offset, isin.len(), None, 4);
        assert!(window.contains("US0378331005"));
    }

    #[test]
    fn test_fallback_window_stops_before_next_match() {
        let text = "US0378331005 APPLE INC USD 15'025\nCH0012032048 ROCHE CHF 9'800";
        let found = find_isins(text);
        assert_eq!(found.len(), 2);
        let window = fallback_window(text, found[0].0, 12, Some(found[1].0), 300);
        assert!(window.contains("APPLE"));
        assert!(!window.contains("ROCHE"));
    }
}
