//! Whitespace-alignment table extraction.
//!
//! Detects ruleless tables by the column discipline OCR text keeps even
//! without drawn borders: cell starts line up at the same character
//! offsets across rows. Lines are split into spans at runs of two or more
//! spaces, column edges are found by bucketed offset voting, and rows are
//! rebuilt by assigning spans to their nearest edge. Indented single-span
//! lines inside a table append to the previous row's cell with a `\n`
//! marker instead of becoming rows of their own.

use std::collections::{HashMap, HashSet};

use crate::model::{CandidateTable, RawPage, Region};

use super::TableExtractionStrategy;

/// Configuration for the whitespace-alignment strategy.
#[derive(Debug, Clone)]
pub struct WhitespaceAlignmentConfig {
    /// Minimum multi-span rows for a region to count as a table
    pub min_rows: usize,
    /// Minimum detected columns
    pub min_columns: usize,
    /// Bucket size in characters when voting for column edges
    pub bucket_size: usize,
    /// Minimum fraction of rows an edge must appear in
    pub min_alignment_ratio: f32,
    /// Minimum characters between two distinct column edges
    pub min_column_gap: usize,
    /// Alignment tolerance in characters when matching spans to edges
    pub tolerance: usize,
}

impl Default for WhitespaceAlignmentConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            bucket_size: 2,
            min_alignment_ratio: 0.5,
            min_column_gap: 3,
            tolerance: 2,
        }
    }
}

/// One aligned text fragment on a line.
#[derive(Debug, Clone)]
struct Span {
    start: usize,
    text: String,
}

/// Extracts tables from ruleless, whitespace-aligned layouts.
pub struct WhitespaceAlignmentStrategy {
    config: WhitespaceAlignmentConfig,
}

impl WhitespaceAlignmentStrategy {
    /// Create the strategy with default configuration.
    pub fn new() -> Self {
        Self {
            config: WhitespaceAlignmentConfig::default(),
        }
    }

    /// Create the strategy with custom configuration.
    pub fn with_config(config: WhitespaceAlignmentConfig) -> Self {
        Self { config }
    }

    /// Vote for column edges across the multi-span lines.
    fn detect_edges(&self, lines: &[&(usize, Vec<Span>)]) -> Vec<usize> {
        if lines.is_empty() {
            return vec![];
        }

        let mut edge_counts: HashMap<usize, usize> = HashMap::new();
        for (_, spans) in lines {
            // Count each bucket only once per line.
            let mut line_buckets: HashSet<usize> = HashSet::new();
            for span in spans {
                line_buckets.insert(span.start / self.config.bucket_size);
            }
            for bucket in line_buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((lines.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<usize> = edge_counts
            .iter()
            .filter(|(_, count)| **count >= min_occurrences)
            .map(|(bucket, _)| bucket * self.config.bucket_size)
            .collect();
        edges.sort_unstable();

        // Merge edges closer than the minimum column gap.
        let mut merged: Vec<usize> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    fn alignment_score(&self, spans: &[Span], edges: &[usize]) -> f32 {
        if spans.is_empty() || edges.is_empty() {
            return 0.0;
        }
        let aligned = spans
            .iter()
            .filter(|s| {
                edges
                    .iter()
                    .any(|e| s.start.abs_diff(*e) <= self.config.tolerance)
            })
            .count();
        aligned as f32 / spans.len() as f32
    }

    /// Column index a span belongs to: the edge range containing its
    /// start, with tolerance for slightly early starts, else the nearest
    /// edge.
    fn column_for(&self, start: usize, edges: &[usize]) -> usize {
        let tol = self.config.tolerance;
        for (i, &edge) in edges.iter().enumerate() {
            let next = edges.get(i + 1).copied().unwrap_or(usize::MAX);
            if start + tol >= edge && start + tol < next {
                return i;
            }
        }
        edges
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.abs_diff(start))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn build_table(
        &self,
        region_lines: &[(usize, Vec<Span>)],
        page_index: usize,
    ) -> Option<CandidateTable> {
        let multi: Vec<&(usize, Vec<Span>)> =
            region_lines.iter().filter(|(_, s)| s.len() >= 2).collect();
        if multi.len() < self.config.min_rows {
            return None;
        }

        let edges = self.detect_edges(&multi);
        if edges.len() < self.config.min_columns {
            return None;
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut score_sum = 0.0f32;
        for (_, spans) in region_lines {
            if spans.len() >= 2 {
                let mut cells = vec![String::new(); edges.len()];
                for span in spans {
                    let col = self.column_for(span.start, &edges);
                    if cells[col].is_empty() {
                        cells[col].push_str(&span.text);
                    } else {
                        cells[col].push(' ');
                        cells[col].push_str(&span.text);
                    }
                }
                score_sum += self.alignment_score(spans, &edges);
                rows.push(cells);
            } else if let Some(span) = spans.first() {
                // Continuation line: wrapped cell content joins the
                // previous row instead of becoming a row of its own.
                let col = self.column_for(span.start, &edges);
                if let Some(prev) = rows.last_mut() {
                    if prev[col].is_empty() {
                        prev[col].push_str(&span.text);
                    } else {
                        prev[col].push('\n');
                        prev[col].push_str(&span.text);
                    }
                }
            }
        }

        if rows.len() < self.config.min_rows {
            return None;
        }

        // Ruled grids carry stronger evidence, so cap below their base.
        let accuracy = (score_sum / multi.len() as f32).min(0.9);
        let start_line = region_lines.first().map(|(i, _)| *i)?;
        let end_line = region_lines.last().map(|(i, _)| *i)?;

        Some(CandidateTable::new(
            rows,
            page_index,
            "whitespace",
            accuracy,
            Region::new(start_line, end_line),
        ))
    }
}

impl TableExtractionStrategy for WhitespaceAlignmentStrategy {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn extract(&self, page: &RawPage) -> Vec<CandidateTable> {
        let all_lines: Vec<(usize, Vec<Span>)> = page
            .text
            .lines()
            .enumerate()
            .map(|(i, line)| (i, line_spans(&line.replace('\t', "  "))))
            .collect();

        let multi: Vec<&(usize, Vec<Span>)> =
            all_lines.iter().filter(|(_, s)| s.len() >= 2).collect();
        if multi.len() < self.config.min_rows {
            return vec![];
        }

        let page_edges = self.detect_edges(&multi);
        if page_edges.len() < self.config.min_columns {
            log::debug!(
                "whitespace: page {} has no stable column edges",
                page.index
            );
            return vec![];
        }

        // Find contiguous regions of table-ish lines, allowing aligned
        // single-span continuation lines inside a region.
        let mut tables = Vec::new();
        let mut region: Vec<(usize, Vec<Span>)> = Vec::new();
        let mut region_multi = 0usize;

        for (line_index, spans) in &all_lines {
            let table_ish = spans.len() >= 2
                && self.alignment_score(spans, &page_edges) >= self.config.min_alignment_ratio;
            let continuation = !region.is_empty()
                && spans.len() == 1
                && spans
                    .first()
                    .map(|s| {
                        page_edges
                            .iter()
                            .any(|e| s.start.abs_diff(*e) <= self.config.tolerance)
                    })
                    .unwrap_or(false);

            if table_ish {
                region.push((*line_index, spans.clone()));
                region_multi += 1;
            } else if continuation {
                region.push((*line_index, spans.clone()));
            } else {
                if region_multi >= self.config.min_rows {
                    if let Some(table) = self.build_table(&region, page.index) {
                        tables.push(table);
                    }
                }
                region.clear();
                region_multi = 0;
            }
        }
        if region_multi >= self.config.min_rows {
            if let Some(table) = self.build_table(&region, page.index) {
                tables.push(table);
            }
        }

        tables
    }
}

impl Default for WhitespaceAlignmentStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a line into spans at runs of two or more spaces. Single spaces
/// stay inside a span so names like "APPLE INC" survive as one cell.
fn line_spans(line: &str) -> Vec<Span> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ' ' {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        let mut j = i;
        while j < chars.len() {
            if chars[j] == ' ' {
                let mut k = j;
                while k < chars.len() && chars[k] == ' ' {
                    k += 1;
                }
                if k - j >= 2 || k == chars.len() {
                    break;
                }
                j = k;
                end = j;
            } else {
                j += 1;
                end = j;
            }
        }
        let text: String = chars[start..end].iter().collect();
        spans.push(Span {
            start,
            text: text.trim_end().to_string(),
        });
        i = end;
    }

    spans
}
