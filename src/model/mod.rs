//! Data model for financial document analysis.
//!
//! These types form the intermediate representation between upstream
//! OCR/table extraction and the downstream consumers of normalized records.
//! `RawPage` and `CandidateTable` are read-only inputs; `SecurityRecord` is
//! built by the assembler and refined by the reconciler; `PortfolioSummary`
//! is derived whole from the final record set.

mod diagnostics;
mod page;
mod security;
mod summary;
mod table;

pub use diagnostics::{DiagnosticEvent, DiagnosticKind, Diagnostics};
pub use page::RawPage;
pub use security::{AssetClass, Provenance, SecurityRecord};
pub use summary::PortfolioSummary;
pub use table::{CandidateTable, Region};
