//! Candidate table types.

use serde::{Deserialize, Serialize};

/// The line span a table occupies on its page.
///
/// Used by the selection reducer to decide whether two candidates describe
/// the same region. Bounds are inclusive line indexes into the page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// First page line covered by the table
    pub start_line: usize,
    /// Last page line covered by the table
    pub end_line: usize,
}

impl Region {
    /// Create a region covering the given inclusive line span.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Check whether two regions overlap.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start_line <= other.end_line && other.start_line <= self.end_line
    }
}

/// One candidate parse of a tabular region.
///
/// Several candidates may describe overlapping regions of the same page;
/// only the best-scoring one survives selection. Multi-line cell content is
/// kept inside a single cell string with `\n` as the line-break marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTable {
    /// Rows of cell strings, outer Vec ordered top to bottom
    pub rows: Vec<Vec<String>>,

    /// Zero-based page index the table was found on
    pub page_index: usize,

    /// Name of the extraction strategy that produced this candidate
    pub strategy: String,

    /// Self-reported accuracy score in [0, 1]
    pub accuracy: f32,

    /// Line span on the page, for overlap selection
    pub region: Region,
}

impl CandidateTable {
    /// Create a candidate table.
    pub fn new(
        rows: Vec<Vec<String>>,
        page_index: usize,
        strategy: impl Into<String>,
        accuracy: f32,
        region: Region,
    ) -> Self {
        Self {
            rows,
            page_index,
            strategy: strategy.into(),
            accuracy: accuracy.clamp(0.0, 1.0),
            region,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, from the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Check whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value at (row, column), if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(|s| s.as_str())
    }

    /// All values of one column, top to bottom. Missing cells in ragged
    /// rows yield empty strings so row indexes stay aligned.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.get(index).map(|s| s.as_str()).unwrap_or(""))
            .collect()
    }

    /// A stable identifier for provenance tracking.
    pub fn table_id(&self) -> String {
        format!(
            "p{}:{}-{}:{}",
            self.page_index, self.region.start_line, self.region.end_line, self.strategy
        )
    }
}
