//! Read queries over a table: equality filters followed by a single-column
//! sort. Everything here works on copies of rows and never mutates a table.

use std::sync::Arc;

use crate::error::{EngineError, Result};

use super::row::Row;
use super::schema::Schema;
use super::value::Value;

/// An equality test `row[column] == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

/// A detached view of a table's rows, see [`super::Table::reader`].
pub struct TableReader {
    pub(super) table: String,
    pub(super) schema: Arc<Schema>,
    pub(super) rows: Vec<Row>,
}

impl TableReader {
    pub fn scan(self) -> Vec<Row> {
        //! Returns the rows as they currently stand in the reader.

        self.rows
    }

    fn known_column(&self, column: &str) -> Result<()> {
        if self.schema.contains(column) {
            Ok(())
        } else {
            Err(EngineError::UnknownColumn {
                table: self.table.clone(),
                column: column.to_string(),
            })
        }
    }

    pub fn filter(self, predicates: &[Predicate]) -> Result<TableReader> {
        //! Keep the rows matching every predicate.
        //!
        //! A predicate naming a column outside the schema is an error rather
        //! than a filter that silently matches nothing.

        for predicate in predicates {
            self.known_column(&predicate.column)?;
        }

        Ok(TableReader {
            rows: filter_rows(self.rows, predicates),
            ..self
        })
    }

    pub fn sort(self, sort_by: Option<&str>, descending: bool) -> Result<TableReader> {
        //! Stable sort by one column. Without a column the rows keep their
        //! insertion order.

        let Some(column) = sort_by else {
            return Ok(self);
        };
        self.known_column(column)?;

        let table = self.table.clone();
        let rows = sort_rows(self.rows, column, descending).map_err(|column| {
            EngineError::UnknownColumn { table, column }
        })?;

        Ok(TableReader { rows, ..self })
    }
}

pub fn filter_rows(rows: Vec<Row>, predicates: &[Predicate]) -> Vec<Row> {
    //! Rows for which all `predicates` hold. An empty predicate list keeps
    //! every row.

    rows.into_iter()
        .filter(|row| predicates.iter().all(|predicate| predicate.matches(row)))
        .collect()
}

pub fn sort_rows(
    mut rows: Vec<Row>,
    column: &str,
    descending: bool,
) -> std::result::Result<Vec<Row>, String> {
    //! Stable sort of `rows` by `column`. Rows with equal values keep their
    //! relative order in both directions.
    //!
    //! Returns the column name back as the error if any row lacks it.

    if rows.iter().any(|row| !row.contains(column)) {
        return Err(column.to_string());
    }

    rows.sort_by(|a, b| {
        let ordering = match (a.get(column), b.get(column)) {
            (Some(x), Some(y)) => x.compare(y),
            _ => std::cmp::Ordering::Equal,
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    Ok(rows)
}
