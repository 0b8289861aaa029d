use serde::Serialize;
use thiserror::Error;

pub mod aggregate;
pub mod column;
pub mod filter;
pub mod params;
pub mod pipeline;
pub mod queries;
pub mod record;
pub mod report;
pub mod song_table;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Schema/parse error: {0}")]
    Parse(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Degenerate dataset: {0}")]
    Degenerate(String),
}

/// Outcome of loading a table: row count plus every value that was coerced
/// to missing or row that was skipped.
#[derive(Debug, Default, Serialize)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub skipped_rows: usize,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    /// 1-based line in the source file (the header is line 1)
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Scalar compared by a [`FilterPredicate`]
#[derive(Debug, Clone, Copy, Serialize)]
pub enum Value {
    /// Integer column
    Int(i64),
    /// Float column
    Float(f64),
}

impl Value {
    fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

/// Filter predicate. Missing values never match.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Equals(Value),
    AtLeast(Value),
}

impl FilterPredicate {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };

        match (self, value) {
            (FilterPredicate::Equals(Value::Int(t)), Value::Int(v)) => v == t,
            (FilterPredicate::AtLeast(Value::Int(t)), Value::Int(v)) => v >= t,
            (FilterPredicate::Equals(t), v) => v.as_f64() == t.as_f64(),
            (FilterPredicate::AtLeast(t), v) => v.as_f64() >= t.as_f64(),
        }
    }
}

/// Aggregate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Sum of non-missing values (0 for an all-missing group)
    Sum,
    /// Count of all rows in the group
    Count,
    /// Average of non-missing values
    Avg,
}

/// Result of an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AggregateResult {
    Int(i64),
    Float(f64),
}

impl AggregateResult {
    pub fn as_f64(&self) -> f64 {
        match self {
            AggregateResult::Int(v) => *v as f64,
            AggregateResult::Float(v) => *v,
        }
    }
}
