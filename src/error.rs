//! Error types for the triage pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Main error type for the triage pipeline
///
/// Every variant is fatal to the current run; these represent configuration
/// or data-quality problems, not transient faults.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Train fraction must be in (0, 1), got {value}")]
    InvalidFraction { value: f64 },

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Pairwise subset is degenerate: class {class} has no rows")]
    DegenerateSubset { class: String },

    #[error("Minority target probability must be in (0, 1), got {value}")]
    InvalidProbability { value: f64 },

    #[error("Column {column} has (near-)zero variance, cannot standardize")]
    ZeroVariance { column: String },

    #[error("Schema mismatch: expected columns [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Optimizer failed to converge after {iterations} iterations")]
    Convergence { iterations: usize },

    #[error("Label {label} is not in the declared class order")]
    UnknownLabel { label: String },
}
