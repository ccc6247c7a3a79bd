//! Per-document diagnostics.
//!
//! Nothing in the analysis core is fatal short of an empty document, so
//! extraction gaps, ambiguous classifications, checksum failures and
//! unparsable numbers are all reported here instead of as errors.

use serde::{Deserialize, Serialize};

/// Category of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A page yielded no text
    EmptyPage,
    /// A page yielded no candidate tables from any strategy
    NoTables,
    /// A candidate table lost region selection to a higher-scoring one
    TableRejected,
    /// A column could not be confidently typed
    AmbiguousColumn,
    /// An identifier failed the ISIN checksum
    InvalidIsin,
    /// A numeric token could not be normalized
    UnparsableToken,
    /// Contributing records carry more than one currency
    MixedCurrencies,
}

/// One diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Event category
    pub kind: DiagnosticKind,

    /// Page the event relates to, when page-scoped
    pub page_index: Option<usize>,

    /// Human-readable detail
    pub message: String,
}

/// Collected diagnostics for one document analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Events in the order they were recorded
    pub events: Vec<DiagnosticEvent>,
}

impl Diagnostics {
    /// Create an empty diagnostics list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn record(&mut self, kind: DiagnosticKind, page_index: Option<usize>, message: impl Into<String>) {
        self.events.push(DiagnosticEvent {
            kind,
            page_index,
            message: message.into(),
        });
    }

    /// Number of events of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Number of invalid-ISIN events.
    pub fn invalid_isin_count(&self) -> usize {
        self.count(DiagnosticKind::InvalidIsin)
    }

    /// Number of tables rejected during selection.
    pub fn rejected_table_count(&self) -> usize {
        self.count(DiagnosticKind::TableRejected)
    }

    /// Check whether anything was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append all events from another diagnostics list.
    pub fn extend(&mut self, other: Diagnostics) {
        self.events.extend(other.events);
    }
}
