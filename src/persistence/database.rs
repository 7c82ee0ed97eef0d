use std::path::Path;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::{EngineError, Result};

use super::query::Predicate;
use super::row::Row;
use super::storage::SnapshotStore;
use super::table::Table;
use super::value::Value;

/// A [`Database`] handle that can be shared between threads.
///
/// Mutations take the write lock, so they are serialized and a reader can
/// never observe a table halfway through an update.
pub type SharedDatabase = Arc<RwLock<Database>>;

/// The collective of multiple [`Table`] objects.
///
/// This is the smart class that does all the needed work of looking tables up,
/// handing rows to them and saving the result. [`Table`] is the dumb class that
/// only knows how to verify a row and feed it into itself.
///
/// A database opened with [`Database::open`] is durable: every successful
/// mutation rewrites its snapshot before returning. If that write fails the
/// mutation is rolled back, so memory never runs ahead of the disk. A
/// database made with [`Database::new`] lives in memory only.
#[derive(Debug)]
pub struct Database {
    name: String,
    tables: IndexMap<String, Table>,
    store: Option<SnapshotStore>,
}

impl Database {
    pub fn new(name: &str) -> Database {
        //! Create a new in-memory database with no tables.

        Database {
            name: name.to_string(),
            tables: IndexMap::new(),
            store: None,
        }
    }

    pub fn open(name: &str, data_dir: impl AsRef<Path>) -> Result<Database> {
        //! Open the database `name` stored under `data_dir`, restoring its
        //! last snapshot. A database that was never saved starts empty.

        let store = SnapshotStore::new(data_dir, name)?;
        let tables = store.load(name)?;

        match &tables {
            Some(tables) => info!(
                "opened database {} with {} table(s) from {}",
                name,
                tables.len(),
                store.path().display()
            ),
            None => info!(
                "created database {} at {}",
                name,
                store.path().display()
            ),
        }

        Ok(Database {
            name: name.to_string(),
            tables: tables.unwrap_or_default(),
            store: Some(store),
        })
    }

    pub fn shared(self) -> SharedDatabase {
        Arc::new(RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.store.as_ref().map(SnapshotStore::path)
    }

    fn flush(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(&self.name, &self.tables)?;
        }
        Ok(())
    }

    pub fn create_table<S: AsRef<str>>(
        &mut self,
        name: &str,
        columns: &[(S, S)],
        primary_key: &str,
    ) -> Result<()> {
        //! Create an empty [`Table`] and save the database.
        //!
        //! A table with the same name is replaced, rows and all.

        let table = Table::new(name, columns, primary_key)?;
        let previous = self.tables.insert(name.to_string(), table);

        if previous.is_some() {
            warn!("table {} already existed and was replaced", name);
        }

        if let Err(error) = self.flush() {
            warn!("rolling back creation of table {}: {}", name, error);
            match previous {
                Some(table) => {
                    self.tables.insert(name.to_string(), table);
                }
                None => {
                    self.tables.shift_remove(name);
                }
            }
            return Err(error);
        }

        info!("created table {} in {}", name, self.name);
        Ok(())
    }

    fn mutate<T, F>(&mut self, table_name: &str, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Table) -> Result<T>,
    {
        //! Run `operation` on the table, then save.
        //!
        //! Table operations leave the table untouched when they fail, so only
        //! a failed save needs undoing; the table is restored from a copy
        //! taken beforehand.

        let durable = self.store.is_some();
        let table = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| EngineError::TableNotFound(table_name.to_string()))?;
        let backup = durable.then(|| table.clone());

        let output = operation(table)?;

        if let Err(error) = self.flush() {
            warn!("rolling back change to table {}: {}", table_name, error);
            if let Some(backup) = backup {
                self.tables.insert(table_name.to_string(), backup);
            }
            return Err(error);
        }

        Ok(output)
    }

    pub fn add_row(&mut self, table_name: &str, row: Row) -> Result<()> {
        //! Insert `row` into the table. Nothing is saved if the row is rejected.

        self.mutate(table_name, |table| table.insert(row))
    }

    pub fn update_row(&mut self, table_name: &str, id: &Value, updates: Row) -> Result<()> {
        //! Update the row whose primary key is `id`.
        //!
        //! The primary key itself is never updated; such an entry in `updates`
        //! is ignored.

        self.mutate(table_name, |table| table.update(id, &updates))
    }

    pub fn delete_row(&mut self, table_name: &str, id: &Value) -> Result<Row> {
        //! Delete the row whose primary key is `id`.
        //!
        //! Returns the deleted row.

        self.mutate(table_name, |table| table.delete(id))
    }

    pub fn get_rows(
        &self,
        table_name: &str,
        filters: &[Predicate],
        sort_by: Option<&str>,
        descending: bool,
    ) -> Result<Vec<Row>> {
        //! Rows of the table matching all `filters`, optionally sorted by one
        //! column. Without `sort_by` the rows come back in insertion order.

        let rows = self
            .table(table_name)?
            .reader()
            .filter(filters)?
            .sort(sort_by, descending)?
            .scan();

        debug!("read {} row(s) from {}", rows.len(), table_name);
        Ok(rows)
    }

    pub fn table(&self, table_name: &str) -> Result<&Table> {
        self.tables
            .get(table_name)
            .ok_or_else(|| EngineError::TableNotFound(table_name.to_string()))
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn contains_table(&self, table_name: &str) -> bool {
        self.tables.contains_key(table_name)
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tables == other.tables
    }
}
