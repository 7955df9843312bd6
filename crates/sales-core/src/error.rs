use std::path::PathBuf;
use thiserror::Error;

/// Coarse error taxonomy shared by every stage of the pipeline.
///
/// Callers use this to decide policy: `Format`, `Io` and `State` abort a run,
/// `EmptyData` is recoverable (skip the dependent chart or KPI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be read.
    Io,
    /// The source was readable but its contents are malformed.
    Format,
    /// An operation was called out of order.
    State,
    /// A mean was requested over zero values.
    EmptyData,
    /// Serialization failures.
    Other,
}

/// All errors produced by the sales insight pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited source could not be parsed (bad quoting, ragged rows).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from the header row.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A date cell is missing or matches none of the accepted formats.
    #[error("Invalid date in row {row}, column {column}: {value:?}")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// A numeric cell holds something that is not a number.
    #[error("Invalid number in row {row}, column {column}: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// An operation was invoked before its prerequisite step.
    #[error("Invalid state: {0}")]
    State(String),

    /// A mean (or a fill derived from one) was requested over zero values.
    #[error("No data: {0}")]
    EmptyData(String),

    /// A result could not be serialized to JSON.
    #[error("Failed to serialize JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InsightError {
    /// Map this error onto the pipeline's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightError::FileRead { .. } | InsightError::Io(_) => ErrorKind::Io,
            InsightError::Csv(e) if e.is_io_error() => ErrorKind::Io,
            InsightError::Csv(_)
            | InsightError::MissingColumns(_)
            | InsightError::InvalidDate { .. }
            | InsightError::InvalidNumber { .. } => ErrorKind::Format,
            InsightError::State(_) => ErrorKind::State,
            InsightError::EmptyData(_) => ErrorKind::EmptyData,
            InsightError::JsonSerialize(_) => ErrorKind::Other,
        }
    }

    /// `true` when the caller may skip the dependent output and carry on.
    pub fn is_empty_data(&self) -> bool {
        self.kind() == ErrorKind::EmptyData
    }
}

/// Convenience alias used throughout the sales insight crates.
pub type Result<T> = std::result::Result<T, InsightError>;
