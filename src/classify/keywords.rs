//! Static keyword lookup tables driving classification.
//!
//! Treated as configuration data rather than code: the built-in table is
//! loaded once per analysis run and test suites can substitute alternate
//! keyword sets without touching classifier logic. All matching is
//! case-insensitive; entries are stored lowercase.

use crate::doctype::DocumentType;

/// Versioned keyword sets for document, column and asset-class
/// classification.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    /// Table version, for diagnostics and test substitution
    pub version: String,

    /// Document-type signals, in tie-break priority order
    pub document_types: Vec<(DocumentType, Vec<String>)>,

    /// Header keywords signalling a quantity column
    pub quantity_headers: Vec<String>,

    /// Header keywords signalling a description column
    pub description_headers: Vec<String>,

    /// Header keywords signalling a current-price column
    pub price_headers: Vec<String>,

    /// Header keywords signalling an acquisition-price column
    pub acquisition_headers: Vec<String>,

    /// Header keywords signalling a market-value column
    pub value_headers: Vec<String>,

    /// Header keywords signalling a coupon/rate column
    pub coupon_headers: Vec<String>,

    /// Header keywords signalling a currency column
    pub currency_headers: Vec<String>,

    /// Header keywords signalling a date column
    pub date_headers: Vec<String>,

    /// Description keywords marking fixed-income instruments
    pub bond_keywords: Vec<String>,

    /// Description keywords marking funds
    pub fund_keywords: Vec<String>,

    /// Description keywords marking structured products
    pub structured_keywords: Vec<String>,

    /// Description keywords marking cash positions
    pub cash_keywords: Vec<String>,

    /// ISO 4217 codes accepted as position currencies
    pub currency_codes: Vec<String>,
}

fn lower(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl KeywordTable {
    /// The built-in table, covering English and German statement
    /// vocabulary.
    pub fn builtin() -> Self {
        Self {
            version: "builtin-2025.2".to_string(),
            document_types: vec![
                (
                    DocumentType::PortfolioStatement,
                    lower(&[
                        "portfolio statement",
                        "portfolio overview",
                        "asset statement",
                        "vermögensausweis",
                        "depotauszug",
                        "holdings",
                        "positions",
                        "asset allocation",
                    ]),
                ),
                (
                    DocumentType::AccountStatement,
                    lower(&[
                        "account statement",
                        "kontoauszug",
                        "statement of account",
                        "opening balance",
                        "closing balance",
                        "booking date",
                        "value date",
                        "debit",
                        "credit",
                    ]),
                ),
                (
                    DocumentType::FundFactSheet,
                    lower(&[
                        "fact sheet",
                        "factsheet",
                        "fund objective",
                        "ongoing charges",
                        "ter",
                        "share class",
                        "ucits",
                        "benchmark",
                        "nav per share",
                    ]),
                ),
                (
                    DocumentType::FinancialReport,
                    lower(&[
                        "annual report",
                        "semi-annual report",
                        "geschäftsbericht",
                        "balance sheet",
                        "income statement",
                        "cash flow",
                        "auditor",
                        "notes to the financial statements",
                    ]),
                ),
            ],
            quantity_headers: lower(&[
                "quantity", "qty", "nominal", "units", "shares", "anzahl", "stück", "menge",
                "holding",
            ]),
            description_headers: lower(&[
                "description",
                "name",
                "security",
                "instrument",
                "bezeichnung",
                "titel",
                "position",
            ]),
            price_headers: lower(&["price", "kurs", "quote", "rate", "market price", "nav"]),
            acquisition_headers: lower(&[
                "acquisition",
                "purchase",
                "cost",
                "einstand",
                "kaufkurs",
                "cost price",
                "avg price",
            ]),
            value_headers: lower(&[
                "value",
                "market value",
                "valuation",
                "amount",
                "wert",
                "kurswert",
                "betrag",
                "total",
            ]),
            coupon_headers: lower(&["coupon", "zins", "interest", "yield", "rendite"]),
            currency_headers: lower(&["currency", "ccy", "währung", "whg"]),
            date_headers: lower(&[
                "date", "maturity", "verfall", "fälligkeit", "datum", "expiry",
            ]),
            bond_keywords: lower(&[
                "bond", "note", "notes", "anleihe", "obligation", "treasury", "fixed rate",
                "floating rate", "frn", "medium term",
            ]),
            fund_keywords: lower(&[
                "fund", "fonds", "etf", "ucits", "sicav", "index fund", "trust",
            ]),
            structured_keywords: lower(&[
                "structured", "certificate", "zertifikat", "barrier", "autocall",
                "reverse convertible", "warrant",
            ]),
            cash_keywords: lower(&[
                "cash", "current account", "call deposit", "money market", "konto", "liquidity",
            ]),
            currency_codes: lower(&[
                "usd", "eur", "chf", "gbp", "jpy", "cad", "aud", "nzd", "sek", "nok", "dkk",
                "sgd", "hkd", "cny", "pln", "czk", "huf", "zar", "ils", "try", "mxn", "brl",
            ]),
        }
    }

    /// Check whether a header string contains any keyword from `set`.
    pub fn header_matches(header: &str, set: &[String]) -> bool {
        if header.is_empty() {
            return false;
        }
        let header = header.to_lowercase();
        set.iter().any(|kw| header.contains(kw.as_str()))
    }

    /// Check whether a token is a known currency code.
    pub fn is_currency_code(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.currency_codes.iter().any(|c| *c == token)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}
