//! Security record types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a security record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Assembled from a classified table row
    Table {
        /// Identifier of the source table
        table_id: String,
        /// Zero-based page index
        page_index: usize,
    },
    /// Assembled from raw-text scanning when no usable table existed
    Fallback {
        /// Zero-based page index
        page_index: usize,
    },
}

impl Provenance {
    /// Page the record was found on.
    pub fn page_index(&self) -> usize {
        match self {
            Provenance::Table { page_index, .. } => *page_index,
            Provenance::Fallback { page_index } => *page_index,
        }
    }

    /// Whether the record came from the raw-text fallback channel.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::Fallback { .. })
    }
}

/// Coarse asset classification of a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Fixed-income instrument
    Bond,
    /// Listed share
    Equity,
    /// Investment fund / ETF
    Fund,
    /// Structured product or certificate
    StructuredProduct,
    /// Cash or money-market position
    Cash,
    /// Anything that could not be classified
    #[default]
    Other,
}

impl AssetClass {
    /// Stable lowercase name, used as allocation map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Bond => "bond",
            AssetClass::Equity => "equity",
            AssetClass::Fund => "fund",
            AssetClass::StructuredProduct => "structured_product",
            AssetClass::Cash => "cash",
            AssetClass::Other => "other",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized security position extracted from one document.
///
/// Records failing the ISIN checksum are retained with
/// `is_valid_isin = false` for audit; they never contribute to portfolio
/// totals. Fields are filled by the assembler and refined by the
/// reconciler; a populated field is never overwritten by lower-confidence
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// ISIN, if an identifier-shaped token was found
    pub isin: Option<String>,

    /// Whether the identifier passed the ISO 6166 checksum
    pub is_valid_isin: bool,

    /// Security name / description
    pub description: Option<String>,

    /// Nominal units held
    pub quantity: Option<f64>,

    /// Purchase price per unit
    pub acquisition_price: Option<f64>,

    /// Current market price per unit
    pub current_price: Option<f64>,

    /// Nominal (face) value
    pub nominal_value: Option<f64>,

    /// Actual/market value in the position currency
    pub actual_value: Option<f64>,

    /// ISO 4217 currency code of the position
    pub currency: Option<String>,

    /// Maturity date, for dated instruments
    pub maturity: Option<NaiveDate>,

    /// Coupon or yield in percent
    pub coupon: Option<f64>,

    /// Percent-of-assets weight reported by the statement
    pub weight_percent: Option<f64>,

    /// Coarse asset classification
    pub asset_class: AssetClass,

    /// Source of the record
    pub provenance: Provenance,
}

impl SecurityRecord {
    /// Create an empty record with the given provenance.
    pub fn new(provenance: Provenance) -> Self {
        Self {
            isin: None,
            is_valid_isin: false,
            description: None,
            quantity: None,
            acquisition_price: None,
            current_price: None,
            nominal_value: None,
            actual_value: None,
            currency: None,
            maturity: None,
            coupon: None,
            weight_percent: None,
            asset_class: AssetClass::Other,
            provenance,
        }
    }

    /// Whether the record contributes to portfolio totals.
    pub fn contributes_to_totals(&self) -> bool {
        self.is_valid_isin && self.actual_value.is_some()
    }

    /// Fill any field that is still empty from `other`, leaving populated
    /// fields untouched. Used when the same ISIN appears more than once.
    pub fn merge_missing(&mut self, other: &SecurityRecord) {
        fn fill<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if dst.is_none() {
                *dst = src.clone();
            }
        }
        fill(&mut self.description, &other.description);
        fill(&mut self.quantity, &other.quantity);
        fill(&mut self.acquisition_price, &other.acquisition_price);
        fill(&mut self.current_price, &other.current_price);
        fill(&mut self.nominal_value, &other.nominal_value);
        fill(&mut self.actual_value, &other.actual_value);
        fill(&mut self.currency, &other.currency);
        fill(&mut self.maturity, &other.maturity);
        fill(&mut self.coupon, &other.coupon);
        fill(&mut self.weight_percent, &other.weight_percent);
        if self.asset_class == AssetClass::Other {
            self.asset_class = other.asset_class;
        }
    }
}
