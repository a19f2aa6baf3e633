use std::path::PathBuf;

use thiserror::Error;

/// Failure to load the data directory. Fatal: nothing renders.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Missing data file: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}:{line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },
}

/// Customer lookup failure. Shown inline in the Customer Analysis view only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Customer ID '{customer_id}' not found. Please enter a valid ID.")]
    NotFound { customer_id: String },

    #[error("No recent monthly data available for customer '{customer_id}'.")]
    NoMonthlyData { customer_id: String },
}

pub type LoadResult<T> = Result<T, LoadError>;
