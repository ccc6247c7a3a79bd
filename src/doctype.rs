//! Document type detection.
//!
//! Labels a block of extracted text by counting keyword occurrences per
//! category. Pure function: no signal yields [`DocumentType::Unknown`],
//! which downstream stages handle by falling back to generic extraction
//! rules.

use serde::{Deserialize, Serialize};

use crate::classify::KeywordTable;

/// Category of a financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Bank account statement with bookings
    AccountStatement,
    /// Fund fact sheet
    FundFactSheet,
    /// Annual or interim financial report
    FinancialReport,
    /// Custody/portfolio statement with positions
    PortfolioStatement,
    /// No recognizable signal
    #[default]
    Unknown,
}

impl DocumentType {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::AccountStatement => "account_statement",
            DocumentType::FundFactSheet => "fund_fact_sheet",
            DocumentType::FinancialReport => "financial_report",
            DocumentType::PortfolioStatement => "portfolio_statement",
            DocumentType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a document from its text.
///
/// Scores each label by counting case-insensitive occurrences of its
/// keyword set. The highest score wins; ties break in favor of the label
/// declared earlier in the keyword table. All-zero scores yield
/// [`DocumentType::Unknown`].
pub fn classify_document_type(text: &str, keywords: &KeywordTable) -> DocumentType {
    let haystack = text.to_lowercase();

    let mut best = DocumentType::Unknown;
    let mut best_score = 0usize;

    for (doc_type, signals) in &keywords.document_types {
        let score: usize = signals
            .iter()
            .map(|kw| haystack.matches(kw.as_str()).count())
            .sum();
        log::debug!("doctype: {} scored {}", doc_type, score);
        // Strictly greater keeps the earlier-declared label on ties.
        if score > best_score {
            best_score = score;
            best = *doc_type;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_statement_detected() {
        let text = "Vermögensausweis\nPositions as of 31.12.2024\nAsset Allocation\n";
        let doc_type = classify_document_type(text, &KeywordTable::builtin());
        assert_eq!(doc_type, DocumentType::PortfolioStatement);
    }

    #[test]
    fn test_fact_sheet_detected() {
        let text = "XYZ Fund Factsheet\nFund objective: growth.\nOngoing charges 0.45%\nUCITS V";
        let doc_type = classify_document_type(text, &KeywordTable::builtin());
        assert_eq!(doc_type, DocumentType::FundFactSheet);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let text = "lorem ipsum dolor sit amet";
        let doc_type = classify_document_type(text, &KeywordTable::builtin());
        assert_eq!(doc_type, DocumentType::Unknown);
    }

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(
            classify_document_type("", &KeywordTable::builtin()),
            DocumentType::Unknown
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "account statement with holdings and positions";
        let table = KeywordTable::builtin();
        let first = classify_document_type(text, &table);
        for _ in 0..3 {
            assert_eq!(classify_document_type(text, &table), first);
        }
    }
}
