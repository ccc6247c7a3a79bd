//! Security record assembly: ISIN anchoring, value reconciliation and
//! record construction from tables or raw text.

mod assembler;
mod isin;
mod reconcile;

pub use assembler::{SecurityAssembler, DEFAULT_CONTEXT_RADIUS};
pub use isin::{find_isins, is_isin_format, isin_pattern, validate_isin};
pub use reconcile::{normalize_number, normalize_percent, ValueReconciler};
