//! Analysis options.

use crate::classify::KeywordTable;

/// Default capacity of the header classification cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Options controlling a document analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Whether to extract pages in parallel
    pub parallel: bool,

    /// Context window radius, in characters, around raw-text ISIN matches
    pub context_radius: usize,

    /// Capacity of the header classification cache (0 disables caching)
    pub cache_capacity: usize,

    /// How many leading pages feed document-type detection
    pub doctype_pages: usize,

    /// Keyword sets driving classification
    pub keywords: KeywordTable,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            context_radius: crate::assemble::DEFAULT_CONTEXT_RADIUS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            doctype_pages: 3,
            keywords: KeywordTable::builtin(),
        }
    }
}

impl AnalyzeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel page extraction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel page extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the raw-text context window radius.
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// Set the header classification cache capacity (0 disables it).
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set how many leading pages feed document-type detection.
    pub fn with_doctype_pages(mut self, pages: usize) -> Self {
        self.doctype_pages = pages;
        self
    }

    /// Substitute the keyword table.
    pub fn with_keywords(mut self, keywords: KeywordTable) -> Self {
        self.keywords = keywords;
        self
    }
}
