//! Multi-strategy table extraction and selection.
//!
//! Financial tables vary between ruled and ruleless layouts, so every page
//! runs through an ordered list of independent strategies. Overlapping
//! candidates are resolved by a deterministic selection reducer: the
//! highest-scoring grid wins its region outright. Selection never merges
//! grids, since merging misaligned grids corrupts cell alignment.

mod ruled;
mod whitespace;

pub use ruled::{RuledLineConfig, RuledLineStrategy};
pub use whitespace::{WhitespaceAlignmentConfig, WhitespaceAlignmentStrategy};

use rayon::prelude::*;

use crate::model::{CandidateTable, DiagnosticKind, Diagnostics, RawPage};

/// A table extraction strategy.
///
/// Implementations report zero candidates for pages where they find
/// nothing; they never fail. The extractor always tries every registered
/// strategy, so one strategy coming up empty never gives up on a page.
pub trait TableExtractionStrategy: Send + Sync {
    /// Strategy name, used as the candidate's provenance tag.
    fn name(&self) -> &'static str;

    /// Extract candidate tables from one page.
    fn extract(&self, page: &RawPage) -> Vec<CandidateTable>;
}

/// Runs registered strategies over pages and selects the winning
/// candidate per region.
pub struct GridExtractor {
    strategies: Vec<Box<dyn TableExtractionStrategy>>,
}

impl GridExtractor {
    /// Create an extractor with the built-in strategies: ruled-line first,
    /// whitespace alignment second.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(RuledLineStrategy::new()),
                Box::new(WhitespaceAlignmentStrategy::new()),
            ],
        }
    }

    /// Create an extractor with a custom strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn TableExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Append a strategy. Registration order is the tie-break order
    /// during selection.
    pub fn register(&mut self, strategy: Box<dyn TableExtractionStrategy>) {
        self.strategies.push(strategy);
    }

    /// Run every strategy over one page. No selection is applied here.
    pub fn extract_page(&self, page: &RawPage) -> Vec<CandidateTable> {
        let mut candidates = Vec::new();
        for strategy in &self.strategies {
            let found = strategy.extract(page);
            log::debug!(
                "strategy {} found {} candidate(s) on page {}",
                strategy.name(),
                found.len(),
                page.index
            );
            candidates.extend(found);
        }
        candidates
    }

    /// Extract and select tables for a whole document.
    ///
    /// `provided` are upstream-supplied candidates that enter the same
    /// selection pool as extracted ones. Pages are independent, so
    /// extraction fans out across them when `parallel` is set; selection
    /// runs after the join since it needs all candidates.
    pub fn extract_document(
        &self,
        pages: &[RawPage],
        provided: Vec<CandidateTable>,
        parallel: bool,
        diagnostics: &mut Diagnostics,
    ) -> Vec<CandidateTable> {
        let per_page: Vec<(usize, bool, Vec<CandidateTable>)> = if parallel {
            pages
                .par_iter()
                .map(|page| (page.index, page.is_blank(), self.extract_page(page)))
                .collect()
        } else {
            pages
                .iter()
                .map(|page| (page.index, page.is_blank(), self.extract_page(page)))
                .collect()
        };

        let mut candidates = provided;
        for (page_index, blank, tables) in per_page {
            if blank {
                diagnostics.record(DiagnosticKind::EmptyPage, Some(page_index), "page has no text");
            } else if tables.is_empty() {
                diagnostics.record(
                    DiagnosticKind::NoTables,
                    Some(page_index),
                    "no strategy produced a table",
                );
            }
            candidates.extend(tables);
        }

        let (selected, rejected) = select_candidates(candidates);
        for table in &rejected {
            diagnostics.record(
                DiagnosticKind::TableRejected,
                Some(table.page_index),
                format!(
                    "{} candidate at lines {}-{} lost region selection (accuracy {:.2})",
                    table.strategy, table.region.start_line, table.region.end_line, table.accuracy
                ),
            );
        }
        selected
    }
}

impl Default for GridExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the best-scoring candidate per overlapping page region.
///
/// Deterministic: candidates are ordered by accuracy descending, then page,
/// then start line, then strategy name; the greedy pass keeps a candidate
/// only if it overlaps no already-kept region on the same page.
pub fn select_candidates(
    mut candidates: Vec<CandidateTable>,
) -> (Vec<CandidateTable>, Vec<CandidateTable>) {
    candidates.retain(|t| !t.is_empty());
    candidates.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.page_index.cmp(&b.page_index))
            .then(a.region.start_line.cmp(&b.region.start_line))
            .then(a.strategy.cmp(&b.strategy))
    });

    let mut kept: Vec<CandidateTable> = Vec::new();
    let mut rejected: Vec<CandidateTable> = Vec::new();

    for candidate in candidates {
        let clashes = kept
            .iter()
            .any(|k| k.page_index == candidate.page_index && k.region.overlaps(&candidate.region));
        if clashes {
            rejected.push(candidate);
        } else {
            kept.push(candidate);
        }
    }

    // Stable reading order for downstream assembly.
    kept.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.region.start_line.cmp(&b.region.start_line))
    });

    (kept, rejected)
}
