//! Column classification and keyword configuration.

mod column;
mod keywords;

pub use column::{ClassifiedTable, ColumnClassifier, ColumnType};
pub use keywords::KeywordTable;
