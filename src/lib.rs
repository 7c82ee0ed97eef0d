//! An embedded tabular store: named tables with a declared schema and a
//! primary key, equality queries with a single-column sort, and a JSON
//! snapshot rewritten after every change.

pub mod cli;
pub mod config;
pub mod error;
pub mod persistence;

pub use error::{EngineError, PersistenceError, Result, ValidationError};
