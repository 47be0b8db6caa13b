use std::path::PathBuf;

use thiserror::Error;

/// A single record that cannot be placed in any group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {row}: missing {column}")]
pub struct SchemaError {
    /// 1-based position of the record among the data rows.
    pub row: usize,
    pub column: &'static str,
}

/// Failure to turn a source file into a complete aggregate table.
/// No partial table is ever produced alongside one of these.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("record {row}: {column} value '{value}' is not a number")]
    InvalidMeasure {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("column {column} has unsupported type {data_type}")]
    UnsupportedColumnType {
        column: &'static str,
        data_type: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading Arrow data")]
    Arrow(#[from] arrow::error::ArrowError),
}
