//! Persistence as tables needs to have the following components
//! - Value (a single typed cell)
//! - Schema (mapping of column names to declared types, order is important)
//! - Constraint (not-null and primary-key rules attached to columns)
//! - Row (based on a Schema, one entry per column)
//! - Table (made of many Rows, validates and finds them by primary key)
//! - Query (equality filters and a single-column sort over a table's rows)
//! - Database (owns the tables and saves them after every change)
//! - Storage (the JSON snapshot file behind a database)
//!

//  All modules of this lib
mod constraint;
mod database;
mod query;
mod row;
mod schema;
mod storage;
mod table;
mod value;

//  External API
pub use constraint::{Constraint, KeySet};
pub use database::{Database, SharedDatabase};
pub use query::{Predicate, TableReader, filter_rows, sort_rows};
pub use row::Row;
pub use schema::{ColumnInformation, ColumnType, Schema};
pub use storage::SnapshotStore;
pub use table::Table;
pub use value::Value;
