//! Error types for the finrecon library.

use thiserror::Error;

/// Result type alias for finrecon operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document analysis.
///
/// Malformed domain data (garbled numbers, broken identifiers, ragged
/// tables) is never an error: it degrades to nulls and diagnostics. Only
/// genuinely missing input fails hard.
#[derive(Error, Debug)]
pub enum Error {
    /// The document contains no pages at all.
    #[error("document contains no pages")]
    EmptyDocument,

    /// Error serializing analysis output.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Invalid analysis configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
