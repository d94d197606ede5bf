//! Infrastructure error types (file access, table parsing, ledger operations).

use serde::Serialize;
use thiserror::Error;

use fixtrack_core::DomainError;

/// A backing table could not be read or written.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A ledger row cannot be interpreted; availability would be wrong without it.
    #[error("malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("missing required column(s): {0}")]
    MissingColumns(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}

/// Loading the inventory table failed as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The table's shape is wrong (e.g. required columns missing).
    #[error("inventory table is malformed: {0}")]
    Parse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(StorageError::Io(value))
    }
}

impl From<csv::Error> for LoadError {
    fn from(value: csv::Error) -> Self {
        Self::Storage(StorageError::Csv(value))
    }
}

/// A single inventory row was skipped; the rest of the table still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("line {line}: {message}")]
pub struct DataError {
    pub line: u64,
    pub message: String,
}

/// Failure of a ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
