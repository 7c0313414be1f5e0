use thiserror::Error;

/// Accelerometer processing error types
#[derive(Error, Debug)]
pub enum AccelError {
    #[error("Variables not set: {}. Run `set-variables` first", .0.join(", "))]
    MissingConfiguration(Vec<&'static str>),

    #[error("Invalid shift sample range {from}..={to} (data has {len} readings)")]
    InvalidShiftRange { from: usize, to: usize, len: usize },

    #[error("Invalid column reference: {0:?}")]
    InvalidColumnReference(String),

    #[error("Invalid row reference: {0:?}")]
    InvalidRowReference(String),

    #[error("Column {letter} is outside the source table ({width} columns)")]
    ColumnOutOfRange { letter: String, width: usize },

    #[error("Malformed value {value:?} in row {row}, column {column}")]
    MalformedRecord {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Source table {0} has no data rows")]
    EmptyDataSet(String),

    #[error("Prompt cancelled while reading {0}")]
    PromptCancelled(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart error: {0}")]
    Chart(String),
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, AccelError>;
