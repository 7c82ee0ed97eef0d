//! The only place where the engine touches the file system.
//!
//! A database is stored as a single pretty-printed JSON document named after
//! the database, `<data_dir>/<name>.json`. The whole document is rewritten
//! on every save: there is no append log.
//!
//! ```json
//! {
//!   "database": "shop",
//!   "saved_at": "2026-10-17T12:00:00+00:00",
//!   "tables": {
//!     "users": {
//!       "columns": { "id": "int not null", "name": "string" },
//!       "primary_key": "id",
//!       "data": [ { "id": 1, "name": "a" } ]
//!     }
//!   }
//! }
//! ```

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, PersistenceError};

use super::row::Row;
use super::schema::Schema;
use super::table::Table;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    database: String,
    #[serde(default)]
    saved_at: String,
    tables: IndexMap<String, TableSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct TableSnapshot {
    columns: IndexMap<String, String>,
    primary_key: String,
    data: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl TableSnapshot {
    fn capture(table: &Table) -> TableSnapshot {
        TableSnapshot {
            columns: table.schema().declarations(),
            primary_key: table.schema().primary_key().to_string(),
            data: table.rows().iter().map(Row::to_json).collect(),
        }
    }

    fn restore(self, name: &str) -> Result<Table, String> {
        //! Rebuild the table by replaying every row through validation, which
        //! also rebuilds the set of taken primary keys.

        let columns: Vec<(&str, &str)> = self
            .columns
            .iter()
            .map(|(column, declaration)| (column.as_str(), declaration.as_str()))
            .collect();
        let schema =
            Schema::new(name, columns.as_slice(), &self.primary_key).map_err(|e| e.to_string())?;
        let mut table = Table::with_schema(name, schema);

        for (index, object) in self.data.iter().enumerate() {
            let row = Row::from_json(table.schema(), object)
                .map_err(|e| format!("table {} row {}: {}", name, index, e))?;
            table
                .insert(row)
                .map_err(|e| format!("table {} row {}: {}", name, index, e))?;
        }

        Ok(table)
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), EngineError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidDatabaseName(name.to_string()))
    }
}

/// Reads and writes the snapshot file of one database.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl AsRef<Path>, name: &str) -> Result<SnapshotStore, EngineError> {
        validate_name(name)?;

        Ok(SnapshotStore {
            path: data_dir.as_ref().join(format!("{}.json", name)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(
        &self,
        name: &str,
        tables: &IndexMap<String, Table>,
    ) -> Result<(), PersistenceError> {
        //! Write the full table set, replacing any previous snapshot.
        //!
        //! The document goes to a temporary file that is synced and then
        //! renamed over the snapshot, so a crash mid-write leaves the old
        //! snapshot intact. Once this returns, the file holds the full
        //! current state.

        let snapshot = Snapshot {
            database: name.to_string(),
            saved_at: Local::now().to_rfc3339(),
            tables: tables
                .iter()
                .map(|(name, table)| (name.clone(), TableSnapshot::capture(table)))
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(PersistenceError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        if let Err(e) = Self::replace(&tmp_path, &self.path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("could not remove {}: {}", tmp_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        #[cfg(unix)]
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| PersistenceError::io(parent, e))?;
        }

        debug!("saved {} table(s) to {}", tables.len(), self.path.display());
        Ok(())
    }

    fn replace(tmp_path: &Path, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let mut tmp = File::create(tmp_path).map_err(|e| PersistenceError::io(tmp_path, e))?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.sync_all())
            .map_err(|e| PersistenceError::io(tmp_path, e))?;
        drop(tmp);

        fs::rename(tmp_path, path).map_err(|e| PersistenceError::io(path, e))
    }

    pub fn load(&self, name: &str) -> Result<Option<IndexMap<String, Table>>, PersistenceError> {
        //! Read the last saved snapshot.
        //!
        //! Returns `None` if no snapshot was ever written. A snapshot that
        //! cannot be parsed, or whose rows no longer validate against their
        //! schema, is reported as corrupt.

        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        let snapshot: Snapshot =
            serde_json::from_str(&text).map_err(|e| PersistenceError::corrupt(&self.path, e))?;

        if snapshot.database != name {
            warn!(
                "snapshot {} was saved for database {}, loading it as {}",
                self.path.display(),
                snapshot.database,
                name
            );
        }

        let mut tables = IndexMap::with_capacity(snapshot.tables.len());
        for (table_name, table) in snapshot.tables {
            let table = table
                .restore(&table_name)
                .map_err(|reason| PersistenceError::corrupt(&self.path, reason))?;
            tables.insert(table_name, table);
        }

        debug!(
            "loaded {} table(s) from {} (saved at {})",
            tables.len(),
            self.path.display(),
            snapshot.saved_at
        );
        Ok(Some(tables))
    }
}
