use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or exporting inspection data.
///
/// A missing data file is never an error; see [`crate::data::loader`].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed parquet file {}: {source}", .path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("arrow error in {}: {source}", .path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error(
        "{}: data row {row} (1-based, header excluded), column '{column}': {message}",
        .path.display()
    )]
    Parse {
        path: PathBuf,
        /// 1-based data row; the CSV header is not counted.
        row: usize,
        column: String,
        message: String,
    },

    #[error("unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl DataError {
    /// Whether this error means "nothing to parse" rather than "bad content".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
