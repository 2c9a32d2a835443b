use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;

/// Every failure the access layer can report. Variants carry the dataset
/// name or path involved so callers can tell which item went wrong.
#[derive(Debug, Error)]
pub enum DataError {
    /// The requested logical name is not in the catalog.
    #[error("unknown dataset: {name}")]
    UnknownDataset { name: String },

    /// A resolved directory does not exist.
    #[error("directory does not exist: {}", path.display())]
    MissingPath { path: PathBuf },

    /// A data file (or a directory's data files) could not be found.
    #[error("data file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Every candidate file in a directory failed to read.
    #[error("no readable parquet file in {}", path.display())]
    AllFilesUnreadable { path: PathBuf },

    /// A column needed for the requested operation is absent.
    #[error("{context}: missing required column '{column}'")]
    Schema { context: String, column: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet error reading {}: {source}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: ParquetError,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The configuration file exists but is not valid JSON.
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Neither the given config path nor the fallback location exists.
    #[error("config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },
}

impl DataError {
    pub(crate) fn schema(context: impl Into<String>, column: impl Into<String>) -> Self {
        DataError::Schema {
            context: context.into(),
            column: column.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}
