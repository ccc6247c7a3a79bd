//! # finrecon
//!
//! Reconciliation core for financial-document extraction pipelines.
//!
//! Takes raw per-page text from an upstream OCR/text-extraction layer and
//! produces structured portfolio data: document type, classified tables,
//! ISIN-anchored security records with reconciled values, and portfolio
//! aggregates. Extraction quality problems degrade to nulls plus
//! diagnostics; only an empty document fails hard.
//!
//! ## Quick Start
//!
//! ```
//! use finrecon::{analyze_text, JsonFormat};
//!
//! fn main() -> finrecon::Result<()> {
//!     let analysis = analyze_text(
//!         "Portfolio Statement\n\
//!          US0378331005  APPLE INC  USD  15'025.00  1.1%",
//!     )?;
//!
//!     println!("{}", analysis.to_json(JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Document typing**: portfolio statement, account statement, fact
//!   sheet, financial report
//! - **Multi-strategy table extraction**: ruled grids and whitespace
//!   alignment, with deterministic region selection
//! - **Column classification**: per-column semantic types from content
//!   patterns and header keywords
//! - **Value reconciliation**: locale-aware number normalization and the
//!   nominal/actual positional heuristic
//! - **Parallel processing**: uses Rayon for multi-page documents

pub mod aggregate;
pub mod assemble;
pub mod cache;
pub mod classify;
pub mod doctype;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use assemble::{SecurityAssembler, ValueReconciler};
pub use cache::BoundedCache;
pub use classify::{ClassifiedTable, ColumnClassifier, ColumnType, KeywordTable};
pub use doctype::{classify_document_type, DocumentType};
pub use error::{Error, Result};
pub use extract::{GridExtractor, TableExtractionStrategy};
pub use model::{
    AssetClass, CandidateTable, DiagnosticEvent, DiagnosticKind, Diagnostics, PortfolioSummary,
    Provenance, RawPage, Region, SecurityRecord,
};
pub use options::AnalyzeOptions;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// JSON output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Single-line output
    #[default]
    Compact,
    /// Indented output
    Pretty,
}

/// Complete result of analyzing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Detected document category
    pub document_type: DocumentType,

    /// Selected tables with per-column types, in reading order
    pub tables: Vec<ClassifiedTable>,

    /// Assembled security records
    pub securities: Vec<SecurityRecord>,

    /// Portfolio aggregates over the records
    pub summary: PortfolioSummary,

    /// Everything that went wrong without being fatal
    pub diagnostics: Diagnostics,
}

impl DocumentAnalysis {
    /// Serialize the analysis to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let out = match format {
            JsonFormat::Compact => serde_json::to_string(self),
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
        };
        out.map_err(|e| Error::Serialize(e.to_string()))
    }
}

/// Analyze pre-extracted pages with default options.
pub fn analyze_pages(pages: Vec<RawPage>) -> Result<DocumentAnalysis> {
    Analyzer::new().analyze(pages)
}

/// Analyze pre-extracted pages with custom options.
pub fn analyze_pages_with_options(
    pages: Vec<RawPage>,
    options: AnalyzeOptions,
) -> Result<DocumentAnalysis> {
    Analyzer::with_options(options).analyze(pages)
}

/// Analyze a single text blob. Form feeds (`\x0C`) split pages.
pub fn analyze_text(text: &str) -> Result<DocumentAnalysis> {
    let pages: Vec<RawPage> = text
        .split('\u{000C}')
        .enumerate()
        .map(|(index, page_text)| RawPage::new(index, page_text))
        .collect();
    analyze_pages(pages)
}

/// Builder for configuring and running a document analysis.
///
/// # Example
///
/// ```
/// use finrecon::{Analyzer, RawPage};
///
/// let pages = vec![RawPage::new(0, "US0378331005  APPLE INC  USD  15'025")];
/// let analysis = Analyzer::new()
///     .sequential()
///     .with_context_radius(200)
///     .analyze(pages)?;
/// # Ok::<(), finrecon::Error>(())
/// ```
pub struct Analyzer {
    options: AnalyzeOptions,
    extractor: GridExtractor,
    provided: Vec<CandidateTable>,
}

impl Analyzer {
    /// Create an analyzer with default options and built-in strategies.
    pub fn new() -> Self {
        Self::with_options(AnalyzeOptions::default())
    }

    /// Create an analyzer from prepared options.
    pub fn with_options(options: AnalyzeOptions) -> Self {
        Self {
            options,
            extractor: GridExtractor::new(),
            provided: Vec::new(),
        }
    }

    /// Disable parallel page extraction.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the raw-text context window radius.
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.options = self.options.with_context_radius(radius);
        self
    }

    /// Set the header classification cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.options = self.options.with_cache_capacity(capacity);
        self
    }

    /// Set how many leading pages feed document-type detection.
    pub fn with_doctype_pages(mut self, pages: usize) -> Self {
        self.options = self.options.with_doctype_pages(pages);
        self
    }

    /// Substitute the keyword table.
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.options = self.options.with_keywords(keywords);
        self
    }

    /// Supply upstream-detected candidate tables. They enter the same
    /// selection pool as locally extracted ones.
    pub fn with_tables(mut self, tables: Vec<CandidateTable>) -> Self {
        self.provided.extend(tables);
        self
    }

    /// Register an additional extraction strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn TableExtractionStrategy>) -> Self {
        self.extractor.register(strategy);
        self
    }

    /// Run the full pipeline over the given pages.
    ///
    /// Stages run in order: text normalization, document typing, table
    /// extraction and selection, column classification, record assembly,
    /// aggregation. A document with no pages, or only blank ones, is the
    /// single fatal case.
    pub fn analyze(self, pages: Vec<RawPage>) -> Result<DocumentAnalysis> {
        if pages.is_empty() || pages.iter().all(|p| p.is_blank()) {
            return Err(Error::EmptyDocument);
        }

        // NFKC folds full-width digits and compatibility forms that OCR
        // output is full of.
        let pages: Vec<RawPage> = pages
            .into_iter()
            .map(|mut page| {
                page.text = page.text.nfkc().collect();
                page
            })
            .collect();

        let mut diagnostics = Diagnostics::new();
        let options = self.options;

        let doctype_text: String = pages
            .iter()
            .take(options.doctype_pages.max(1))
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let document_type = classify_document_type(&doctype_text, &options.keywords);
        log::debug!("document classified as {}", document_type);

        let candidates = self.extractor.extract_document(
            &pages,
            self.provided,
            options.parallel,
            &mut diagnostics,
        );

        let classifier = ColumnClassifier::with_keywords(options.keywords.clone());
        let mut header_cache: BoundedCache<String, ColumnType> =
            BoundedCache::new(options.cache_capacity);
        let tables: Vec<ClassifiedTable> = candidates
            .into_iter()
            .map(|table| classifier.classify_table_cached(table, &mut header_cache))
            .collect();

        for table in &tables {
            for (col, column_type) in table.column_types.iter().enumerate() {
                if *column_type == ColumnType::Numeric {
                    diagnostics.record(
                        DiagnosticKind::AmbiguousColumn,
                        Some(table.table.page_index),
                        format!(
                            "column {} of table {} is numeric with no clearer role",
                            col,
                            table.table.table_id()
                        ),
                    );
                }
            }
        }

        let assembler =
            SecurityAssembler::with_options(options.keywords.clone(), options.context_radius);
        let securities = assembler.assemble(&tables, &pages, &mut diagnostics);

        let summary = aggregate(&securities, &mut diagnostics);

        Ok(DocumentAnalysis {
            document_type,
            tables,
            securities,
            summary,
            diagnostics,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
