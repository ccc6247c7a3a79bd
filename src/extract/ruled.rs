//! Ruled/bordered table extraction.
//!
//! Handles tables whose structure survives OCR as drawn characters: `|`
//! cell separators and `+---+` / `----` rule lines. Rule lines delimit
//! logical rows, so cell content wrapped over several physical lines
//! between two rules is joined back into a single cell with an internal
//! `\n` marker. Callers rely on this to keep one row per security.

use crate::model::{CandidateTable, RawPage, Region};

use super::TableExtractionStrategy;

/// Configuration for the ruled-line strategy.
#[derive(Debug, Clone)]
pub struct RuledLineConfig {
    /// Minimum logical rows for a block to count as a table
    pub min_rows: usize,
    /// Minimum columns for a block to count as a table
    pub min_columns: usize,
    /// Base accuracy for a fully consistent grid
    pub base_accuracy: f32,
}

impl Default for RuledLineConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            base_accuracy: 0.95,
        }
    }
}

/// Extracts tables delimited by drawn rules and `|` separators.
pub struct RuledLineStrategy {
    config: RuledLineConfig,
}

impl RuledLineStrategy {
    /// Create the strategy with default configuration.
    pub fn new() -> Self {
        Self {
            config: RuledLineConfig::default(),
        }
    }

    /// Create the strategy with custom configuration.
    pub fn with_config(config: RuledLineConfig) -> Self {
        Self { config }
    }

    fn parse_block(&self, lines: &[(usize, &str)], page_index: usize) -> Option<CandidateTable> {
        // Group physical cell lines into logical rows delimited by rules.
        let mut logical_rows: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<Vec<String>> = Vec::new();

        let mut flush = |current: &mut Vec<Vec<String>>, rows: &mut Vec<Vec<String>>| {
            if current.is_empty() {
                return;
            }
            let width = current.iter().map(|c| c.len()).max().unwrap_or(0);
            let mut merged: Vec<String> = vec![String::new(); width];
            for line_cells in current.iter() {
                for (i, cell) in line_cells.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    if merged[i].is_empty() {
                        merged[i].push_str(cell);
                    } else {
                        merged[i].push('\n');
                        merged[i].push_str(cell);
                    }
                }
            }
            rows.push(merged);
            current.clear();
        };

        let mut saw_rule = false;
        for (_, line) in lines {
            if is_rule_line(line) {
                saw_rule = true;
                flush(&mut current, &mut logical_rows);
            } else {
                current.push(split_cells(line));
                // Without rules every physical line is its own row.
                if !saw_rule {
                    flush(&mut current, &mut logical_rows);
                }
            }
        }
        flush(&mut current, &mut logical_rows);

        logical_rows.retain(|r| r.iter().any(|c| !c.is_empty()));

        let column_counts: Vec<usize> = logical_rows.iter().map(|r| r.len()).collect();
        let columns = column_counts.iter().copied().max().unwrap_or(0);
        if logical_rows.len() < self.config.min_rows || columns < self.config.min_columns {
            return None;
        }

        // Consistency of column counts drives the score.
        let modal = modal_count(&column_counts);
        let consistent = column_counts.iter().filter(|c| **c == modal).count();
        let consistency = consistent as f32 / column_counts.len() as f32;
        let accuracy = self.config.base_accuracy * consistency;

        let start_line = lines.first().map(|(i, _)| *i).unwrap_or(0);
        let end_line = lines.last().map(|(i, _)| *i).unwrap_or(start_line);

        Some(CandidateTable::new(
            logical_rows,
            page_index,
            "ruled",
            accuracy,
            Region::new(start_line, end_line),
        ))
    }
}

impl TableExtractionStrategy for RuledLineStrategy {
    fn name(&self) -> &'static str {
        "ruled"
    }

    fn extract(&self, page: &RawPage) -> Vec<CandidateTable> {
        let mut tables = Vec::new();
        let mut block: Vec<(usize, &str)> = Vec::new();

        for (line_index, line) in page.text.lines().enumerate() {
            if is_rule_line(line) || is_cell_line(line) {
                block.push((line_index, line));
            } else {
                if !block.is_empty() {
                    if let Some(table) = self.parse_block(&block, page.index) {
                        tables.push(table);
                    }
                    block.clear();
                }
            }
        }
        if !block.is_empty() {
            if let Some(table) = self.parse_block(&block, page.index) {
                tables.push(table);
            }
        }

        tables
    }
}

impl Default for RuledLineStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// A drawn horizontal rule: only box-drawing filler characters.
fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| matches!(c, '-' | '=' | '+' | '|' | ' '))
        && trimmed.chars().any(|c| matches!(c, '-' | '='))
}

/// A line carrying cell content between `|` separators.
fn is_cell_line(line: &str) -> bool {
    line.matches('|').count() >= 2 && !is_rule_line(line)
}

/// Split a `| a | b |` line into trimmed cell strings.
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn modal_count(counts: &[usize]) -> usize {
    let mut best = 0;
    let mut best_hits = 0;
    for &c in counts {
        let hits = counts.iter().filter(|x| **x == c).count();
        if hits > best_hits || (hits == best_hits && c > best) {
            best = c;
            best_hits = hits;
        }
    }
    best
}
