use super::constraint::{Constraint, KeySet};
use super::query::TableReader;
use super::row::Row;
use super::schema::Schema;
use super::value::Value;
use crate::error::{EngineError, Result, ValidationError};

use std::fmt::Display;
use std::sync::Arc;

use log::debug;

/// Rows of a single [`Schema`], kept in insertion order.
///
/// The table is the one that knows how to validate a row against its schema
/// and how to find a row by its primary key. It does not persist itself:
/// that is left to the owning [`super::Database`].
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: Arc<Schema>,
    rows: Vec<Row>,
    keys: KeySet,
}

impl Table {
    pub fn new<S: AsRef<str>>(name: &str, columns: &[(S, S)], primary_key: &str) -> Result<Table> {
        //! Return a new empty table. The `columns` are pairs of column names
        //! and their declarations, e.g. `("id", "int not null")`.
        //!
        //! Returns an owned [Table] object.

        let schema = Schema::new(name, columns, primary_key)?;
        Ok(Table::with_schema(name, schema))
    }

    pub fn with_schema(name: &str, schema: Schema) -> Table {
        Table {
            name: name.to_string(),
            schema: Arc::new(schema),
            rows: Vec::new(),
            keys: KeySet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_row(&self, row: &Row, keys: Option<&KeySet>) -> std::result::Result<(), ValidationError> {
        if let Some(column) = row.0.keys().find(|column| !self.schema.contains(column)) {
            return Err(ValidationError::UnknownColumn {
                column: column.clone(),
            });
        }

        for (column, info) in self.schema.columns() {
            let value = row.get(column).ok_or_else(|| ValidationError::MissingColumn {
                column: column.clone(),
            })?;

            info.datatype().validate(column, value)?;

            for constraint in info.constraints() {
                match (constraint, keys) {
                    (Constraint::PrimaryKey(_), None) => {}
                    (Constraint::PrimaryKey(_), Some(keys)) => constraint.validate(value, keys)?,
                    (Constraint::NotNull(_), _) => constraint.validate(value, &self.keys)?,
                }
            }
        }

        Ok(())
    }

    pub fn validate_row(&self, row: &Row) -> std::result::Result<(), ValidationError> {
        //! Check that `row` holds exactly the columns of the schema, that each
        //! value fits its column type and that no not-null column is null.
        //!
        //! Primary-key uniqueness is not part of this check, see [Table::insert].

        self.check_row(row, None)
    }

    fn position_of(&self, id: &Value) -> Option<usize> {
        let pk = self.schema.primary_key();
        self.rows.iter().position(|row| row.get(pk) == Some(id))
    }

    pub fn get_row_by_id(&self, id: &Value) -> Option<&Row> {
        //! Linear scan for the row whose primary key equals `id`.

        self.position_of(id).map(|index| &self.rows[index])
    }

    fn row_not_found(&self, id: &Value) -> EngineError {
        EngineError::RowNotFound {
            table: self.name.clone(),
            key: id.to_string(),
        }
    }

    pub fn insert(&mut self, row: Row) -> Result<()> {
        //! Validate `row` and append it to the table.
        //!
        //! The row's key is only recorded once the whole row passed, so a
        //! rejected row leaves both the rows and the taken keys untouched.

        self.check_row(&row, Some(&self.keys))?;

        if let Some(key) = row.get(self.schema.primary_key()) {
            self.keys.insert(key);
        }
        self.rows.push(row);

        debug!("inserted row into {} ({} rows)", self.name, self.rows.len());
        Ok(())
    }

    pub fn update(&mut self, id: &Value, updates: &Row) -> Result<()> {
        //! Apply `updates` to the row with primary key `id`.
        //!
        //! Updates targeting the primary-key column are ignored; the key of a
        //! row never changes once inserted. The merged row is validated
        //! before it replaces the stored one.

        let index = self.position_of(id).ok_or_else(|| self.row_not_found(id))?;
        let pk = self.schema.primary_key();

        let mut merged = self.rows[index].clone();
        for (column, value) in updates.0.iter() {
            if column != pk {
                merged.0.insert(column.clone(), value.clone());
            }
        }

        self.validate_row(&merged)?;
        self.rows[index] = merged;

        debug!("updated row {} in {}", id, self.name);
        Ok(())
    }

    pub fn delete(&mut self, id: &Value) -> Result<Row> {
        //! Remove the row with primary key `id`, keeping the order of the
        //! remaining rows, and release its key.

        let index = self.position_of(id).ok_or_else(|| self.row_not_found(id))?;
        let row = self.rows.remove(index);
        self.keys.remove(id);

        debug!("deleted row {} from {}", id, self.name);
        Ok(row)
    }

    pub fn reader(&self) -> TableReader {
        //! Get a reader for the table to perform read queries.
        //!
        //! The reader works on a copy of the rows, so it can be filtered and
        //! sorted without touching the table.

        TableReader {
            table: self.name.clone(),
            schema: Arc::clone(&self.schema),
            rows: self.rows.clone(),
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema && self.rows == other.rows
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows.iter().map(|row| format!("{}", row)).collect();

        writeln!(f, "{}\n{}", self.schema, rows.join("\n"))
    }
}
