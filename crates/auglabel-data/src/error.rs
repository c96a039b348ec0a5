//! Errors for dataset files.

use std::path::PathBuf;

use auglabel_core::error::AugError;
use thiserror::Error;

/// Data loading error types.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Missing dataset file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Truncated record in {}: {len} bytes is not a multiple of {record}", path.display())]
    Truncated {
        path: PathBuf,
        len: usize,
        record: usize,
    },

    #[error("Invalid dataset format: {0}")]
    Format(String),

    #[error(transparent)]
    Core(#[from] AugError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for data loading.
pub type DataResult<T> = Result<T, DataError>;
