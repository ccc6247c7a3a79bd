//! Per-column semantic type classification.
//!
//! A prioritized cascade of pattern checks: each check computes a match
//! ratio over the column's non-empty values, and wins once the ratio
//! exceeds 0.5 or the header text alone signals the type. Identifier and
//! currency-code patterns run first because they are the most specific
//! and the least likely to false-positive against generic numbers.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::BoundedCache;
use crate::model::CandidateTable;

use super::keywords::KeywordTable;

/// Semantic type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// ISIN-format identifiers
    Identifier,
    /// ISO 4217 currency codes
    CurrencyCode,
    /// Calendar dates
    Date,
    /// Percentages
    Percentage,
    /// Current market price
    Price,
    /// Purchase/cost price
    AcquisitionPrice,
    /// Market value amounts
    Value,
    /// Nominal units held
    Quantity,
    /// Security names
    Description,
    /// Coupon or interest rate
    Coupon,
    /// Numeric without a clearer role
    Numeric,
    /// Free text
    Text,
    /// No values at all
    Empty,
}

/// Match-ratio threshold above which a content check wins.
const MATCH_THRESHOLD: f64 = 0.5;

/// Column classifier with pre-compiled patterns.
pub struct ColumnClassifier {
    keywords: KeywordTable,
    isin_re: Regex,
    currency_re: Regex,
    date_re: Regex,
    percent_re: Regex,
    numeric_re: Regex,
}

impl ColumnClassifier {
    /// Create a classifier using the built-in keyword table.
    pub fn new() -> Self {
        Self::with_keywords(KeywordTable::builtin())
    }

    /// Create a classifier with a custom keyword table.
    pub fn with_keywords(keywords: KeywordTable) -> Self {
        Self {
            keywords,
            isin_re: Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$").unwrap(),
            currency_re: Regex::new(r"^[A-Z]{3}$").unwrap(),
            date_re: Regex::new(r"^(?:\d{1,2}[./]\d{1,2}[./]\d{4}|\d{4}-\d{2}-\d{2})$").unwrap(),
            percent_re: Regex::new(r"^[+-]?\d+(?:[.,]\d+)?\s*%$").unwrap(),
            numeric_re: Regex::new(
                r"^[$€£]?\s*[+-]?(?:\d{1,3}(?:[',’.\x20]\d{3})+|\d+)(?:[.,]\d+)?$",
            )
            .unwrap(),
        }
    }

    /// The keyword table in use.
    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// Classify one column from its header and cell values.
    ///
    /// Empty cells are ignored for ratio computation; a column with no
    /// non-empty values classifies as [`ColumnType::Empty`].
    pub fn classify(&self, header: &str, values: &[&str]) -> ColumnType {
        let non_empty: Vec<&str> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();

        if non_empty.is_empty() {
            return ColumnType::Empty;
        }

        let ratio = |pred: &dyn Fn(&str) -> bool| -> f64 {
            let hits = non_empty.iter().filter(|v| pred(v)).count();
            hits as f64 / non_empty.len() as f64
        };

        let isin_ratio = ratio(&|v| self.isin_re.is_match(v));
        if isin_ratio > MATCH_THRESHOLD {
            return ColumnType::Identifier;
        }

        let currency_ratio = ratio(&|v| self.currency_re.is_match(v));
        if currency_ratio > MATCH_THRESHOLD
            || KeywordTable::header_matches(header, &self.keywords.currency_headers)
        {
            if currency_ratio > 0.0 || !header.is_empty() {
                return ColumnType::CurrencyCode;
            }
        }

        let date_ratio = ratio(&|v| self.date_re.is_match(v));
        if date_ratio > MATCH_THRESHOLD
            || (date_ratio > 0.0
                && KeywordTable::header_matches(header, &self.keywords.date_headers))
        {
            return ColumnType::Date;
        }

        let percent_ratio = ratio(&|v| self.percent_re.is_match(v));
        let coupon_header = KeywordTable::header_matches(header, &self.keywords.coupon_headers);
        if coupon_header && percent_ratio > 0.0 {
            return ColumnType::Coupon;
        }
        if percent_ratio > MATCH_THRESHOLD {
            return ColumnType::Percentage;
        }

        let numeric_ratio = ratio(&|v| self.numeric_re.is_match(v));
        if numeric_ratio > MATCH_THRESHOLD {
            // Headers disambiguate the price-like family.
            if KeywordTable::header_matches(header, &self.keywords.quantity_headers) {
                return ColumnType::Quantity;
            }
            if KeywordTable::header_matches(header, &self.keywords.acquisition_headers) {
                return ColumnType::AcquisitionPrice;
            }
            if KeywordTable::header_matches(header, &self.keywords.value_headers) {
                return ColumnType::Value;
            }
            if KeywordTable::header_matches(header, &self.keywords.price_headers) {
                return ColumnType::Price;
            }
            return ColumnType::Numeric;
        }

        // Header evidence can override sub-threshold content: headers are
        // more reliable than noisy OCR cells.
        if KeywordTable::header_matches(header, &self.keywords.description_headers) {
            return ColumnType::Description;
        }
        if KeywordTable::header_matches(header, &self.keywords.quantity_headers) {
            return ColumnType::Quantity;
        }
        if KeywordTable::header_matches(header, &self.keywords.value_headers) {
            return ColumnType::Value;
        }
        if KeywordTable::header_matches(header, &self.keywords.acquisition_headers) {
            return ColumnType::AcquisitionPrice;
        }
        if KeywordTable::header_matches(header, &self.keywords.price_headers) {
            return ColumnType::Price;
        }

        ColumnType::Text
    }

    /// Classify every column of a candidate table.
    ///
    /// The first row is treated as a header when none of its cells looks
    /// numeric; otherwise the table is taken as header-less and columns
    /// classify on content alone.
    pub fn classify_table(&self, table: CandidateTable) -> ClassifiedTable {
        let has_header = self.detect_header(&table);
        let body_start = if has_header { 1 } else { 0 };
        let column_count = table.column_count();

        let mut column_types = Vec::with_capacity(column_count);
        for col in 0..column_count {
            let header = if has_header {
                table.cell(0, col).unwrap_or("").trim()
            } else {
                ""
            };
            let full_column = table.column(col);
            let body: Vec<&str> = full_column[body_start.min(full_column.len())..].to_vec();
            column_types.push(self.classify(header, &body));
        }

        log::debug!(
            "classified table {} columns as {:?} (header: {})",
            column_count,
            column_types,
            has_header
        );

        ClassifiedTable {
            table,
            column_types,
            has_header,
        }
    }

    /// Classify a table, reusing cached results for repeated headers.
    ///
    /// Statement tables repeat the same header row across pages, so a
    /// non-empty header that was already typed skips the content cascade.
    /// Header-less columns never hit the cache.
    pub fn classify_table_cached(
        &self,
        table: CandidateTable,
        cache: &mut BoundedCache<String, ColumnType>,
    ) -> ClassifiedTable {
        let has_header = self.detect_header(&table);
        let body_start = if has_header { 1 } else { 0 };
        let column_count = table.column_count();

        let mut column_types = Vec::with_capacity(column_count);
        for col in 0..column_count {
            let header = if has_header {
                table.cell(0, col).unwrap_or("").trim()
            } else {
                ""
            };
            if !header.is_empty() {
                if let Some(cached) = cache.get(&header.to_lowercase()) {
                    column_types.push(*cached);
                    continue;
                }
            }
            let full_column = table.column(col);
            let body: Vec<&str> = full_column[body_start.min(full_column.len())..].to_vec();
            let column_type = self.classify(header, &body);
            if !header.is_empty() && column_type != ColumnType::Empty {
                cache.insert(header.to_lowercase(), column_type);
            }
            column_types.push(column_type);
        }

        ClassifiedTable {
            table,
            column_types,
            has_header,
        }
    }

    /// Check whether a cell value looks numeric, percent or date shaped.
    fn looks_data(&self, value: &str) -> bool {
        self.numeric_re.is_match(value)
            || self.percent_re.is_match(value)
            || self.date_re.is_match(value)
            || self.isin_re.is_match(value)
    }

    fn detect_header(&self, table: &CandidateTable) -> bool {
        if table.row_count() < 2 {
            return false;
        }
        let first = &table.rows[0];
        let non_empty: Vec<&str> = first
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        !non_empty.is_empty() && non_empty.iter().all(|c| !self.looks_data(c))
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A selected table with per-column semantic types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedTable {
    /// The underlying grid
    pub table: CandidateTable,

    /// Semantic type per column index
    pub column_types: Vec<ColumnType>,

    /// Whether row 0 is a header row
    pub has_header: bool,
}

impl ClassifiedTable {
    /// Index of the first column of the given type.
    pub fn column_of_type(&self, column_type: ColumnType) -> Option<usize> {
        self.column_types.iter().position(|t| *t == column_type)
    }

    /// Data rows, excluding any header row.
    pub fn body_rows(&self) -> &[Vec<String>] {
        let start = if self.has_header { 1 } else { 0 };
        &self.table.rows[start.min(self.table.rows.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Region;

    fn classifier() -> ColumnClassifier {
        ColumnClassifier::new()
    }

    #[test]
    fn test_identifier_without_header() {
        // ISIN-shaped values classify as identifier regardless of header
        // evidence.
        let values = vec!["US0378331005", "CH0012032048", "DE0007164600"];
        assert_eq!(classifier().classify("", &values), ColumnType::Identifier);
    }

    #[test]
    fn test_currency_code_column() {
        let values = vec!["USD", "CHF", "EUR"];
        assert_eq!(classifier().classify("", &values), ColumnType::CurrencyCode);
    }

    #[test]
    fn test_date_column() {
        let values = vec!["31.12.2024", "15.06.2026", "2027-01-30"];
        assert_eq!(classifier().classify("", &values), ColumnType::Date);
    }

    #[test]
    fn test_percentage_column() {
        let values = vec!["1.02%", "3.5 %", "0.75%"];
        assert_eq!(classifier().classify("", &values), ColumnType::Percentage);
    }

    #[test]
    fn test_price_family_disambiguated_by_header() {
        let c = classifier();
        let values = vec!["150.25", "99.30", "1'250.00"];
        assert_eq!(c.classify("Price", &values), ColumnType::Price);
        assert_eq!(c.classify("Cost Price", &values), ColumnType::AcquisitionPrice);
        assert_eq!(c.classify("Market Value", &values), ColumnType::Value);
        assert_eq!(c.classify("", &values), ColumnType::Numeric);
    }

    #[test]
    fn test_quantity_needs_header_keyword() {
        let c = classifier();
        let values = vec!["100", "2'000", "50"];
        assert_eq!(c.classify("Nominal", &values), ColumnType::Quantity);
        assert_eq!(c.classify("Qty", &values), ColumnType::Quantity);
        assert_eq!(c.classify("", &values), ColumnType::Numeric);
    }

    #[test]
    fn test_description_by_header_override() {
        let values = vec!["APPLE INC", "NESTLE SA", "2.5% UBS 2027"];
        assert_eq!(
            classifier().classify("Name", &values),
            ColumnType::Description
        );
    }

    #[test]
    fn test_coupon_with_partial_percent_ratio() {
        let values = vec!["2.5%", "n/a", "1.25%", ""];
        assert_eq!(classifier().classify("Coupon", &values), ColumnType::Coupon);
    }

    #[test]
    fn test_empty_column() {
        let values = vec!["", "  ", "\t"];
        assert_eq!(classifier().classify("Anything", &values), ColumnType::Empty);
    }

    #[test]
    fn test_garbled_ocr_falls_back_to_text() {
        let values = vec!["@#!$", "l1l1l1", "..."];
        assert_eq!(classifier().classify("", &values), ColumnType::Text);
    }

    #[test]
    fn test_classification_idempotent() {
        let c = classifier();
        let values = vec!["USD", "CHF", "EUR"];
        let first = c.classify("Ccy", &values);
        for _ in 0..3 {
            assert_eq!(c.classify("Ccy", &values), first);
        }
    }

    #[test]
    fn test_classify_table_spec_layout() {
        let table = CandidateTable::new(
            vec![
                vec![
                    "ISIN".into(),
                    "Name".into(),
                    "Qty".into(),
                    "Price".into(),
                    "Value".into(),
                    "Currency".into(),
                ],
                vec![
                    "US0378331005".into(),
                    "APPLE INC".into(),
                    "100".into(),
                    "150.25".into(),
                    "15025.00".into(),
                    "USD".into(),
                ],
            ],
            0,
            "ruled",
            0.9,
            Region::new(0, 1),
        );

        let classified = classifier().classify_table(table);
        assert!(classified.has_header);
        assert_eq!(
            classified.column_types,
            vec![
                ColumnType::Identifier,
                ColumnType::Description,
                ColumnType::Quantity,
                ColumnType::Price,
                ColumnType::Value,
                ColumnType::CurrencyCode,
            ]
        );
    }

    #[test]
    fn test_cached_header_reused_across_tables() {
        let c = classifier();
        let mut cache: BoundedCache<String, ColumnType> = BoundedCache::new(16);

        let first = CandidateTable::new(
            vec![
                vec!["Market Value".into()],
                vec!["15025.00".into()],
                vec!["9800.50".into()],
            ],
            0,
            "ruled",
            0.9,
            Region::new(0, 2),
        );
        let classified = c.classify_table_cached(first, &mut cache);
        assert_eq!(classified.column_types, vec![ColumnType::Value]);
        assert_eq!(cache.get(&"market value".to_string()), Some(&ColumnType::Value));

        // Same header on a later page, garbled cells: cache decides.
        let second = CandidateTable::new(
            vec![
                vec!["Market Value".into()],
                vec!["##".into()],
                vec!["??".into()],
            ],
            1,
            "ruled",
            0.9,
            Region::new(0, 2),
        );
        let classified = c.classify_table_cached(second, &mut cache);
        assert_eq!(classified.column_types, vec![ColumnType::Value]);
    }

    #[test]
    fn test_headerless_table() {
        let table = CandidateTable::new(
            vec![
                vec!["US0378331005".into(), "100".into()],
                vec!["CH0012032048".into(), "50".into()],
            ],
            0,
            "whitespace",
            0.8,
            Region::new(0, 1),
        );
        let classified = classifier().classify_table(table);
        assert!(!classified.has_header);
        assert_eq!(classified.column_types[0], ColumnType::Identifier);
        assert_eq!(classified.body_rows().len(), 2);
    }
}
