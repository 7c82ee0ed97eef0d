//! Error kinds surfaced by the engine.
//!
//! Every failure the engine knows about is a value of [`EngineError`]. Nothing
//! in the library panics on bad input: a rejected row, a missing table and a
//! broken snapshot file are all returned to the caller.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid schema for table {table}: {reason}")]
    InvalidSchema { table: String, reason: String },

    #[error("invalid database name {0}: use ascii letters, digits, '_' or '-'")]
    InvalidDatabaseName(String),

    #[error("does not exist: table {0}")]
    TableNotFound(String),

    #[error("does not exist: row with key {key} in table {table}")]
    RowNotFound { table: String, key: String },

    #[error("invalid column {column}: does not exist in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A value or row that does not conform to its table's schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid value {value} for column {column}: not compatible with type {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        value: String,
    },

    #[error("invalid value for column {column}: null is not allowed")]
    NullValue { column: String },

    #[error("invalid url {value} for column {column}: must start with http")]
    InvalidUrl { column: String, value: String },

    #[error("invalid float {value} for column {column}: must be finite")]
    NonFiniteFloat { column: String, value: f64 },

    #[error("missing column {column}: row must hold every column of the schema")]
    MissingColumn { column: String },

    #[error("invalid column {column}: not part of the schema")]
    UnknownColumn { column: String },

    #[error("integrity violation: key {value} already exists in column {column}")]
    DuplicateKey { column: String, value: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("corrupt snapshot {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> PersistenceError {
        PersistenceError::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
