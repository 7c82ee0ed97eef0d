//! This module where all the commands are run.
//!
//! Slate command line syntax:
//!
//! - slate --help | Command Line Help
//! - slate <db> tables
//! - slate <db> create-table <table> -c <col>=<decl>* -p <col>
//! - slate <db> insert <table> <json row>
//! - slate <db> update <table> <key> <json updates>
//! - slate <db> delete <table> <key>
//! - slate <db> select <table> [-w <col>=<value>]* [-s <col>] [--desc]
//!
//! Here * means more than one such arguments.

use std::fmt::Display;

use crate::cli::messages::{dim, highlight_argument, system_message};
use crate::cli::parsers::CliCommand;
use crate::persistence::{Database, Predicate, Row, Schema, Value};

/// The executor that runs one command against an open [`Database`].
///
/// Every command needs an executor to be run. The executor turns the raw
/// command line text into typed rows and keys using the table's schema,
/// then hands them to the database.
pub struct CommandExecutor<'a> {
    command: CliCommand,
    database: &'a mut Database,
}

/// What a command leaves behind to be shown on the terminal.
pub struct CommandResult {
    pub message: String,
    pub columns: Vec<String>,
    pub rows: Option<Vec<Row>>,
}

impl Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rows) = &self.rows {
            writeln!(f, "{}", dim(&self.columns.join(" | ")))?;
            for row in rows {
                writeln!(f, "{}", row)?;
            }
        }
        write!(f, "{}", system_message("slate", self.message.clone()))
    }
}

fn parse_json(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn parse_object(raw: &str) -> Result<serde_json::Map<String, serde_json::Value>, String> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(object)) => Ok(object),
        Ok(other) => Err(format!("invalid row {}: expected a JSON object", other)),
        Err(e) => Err(format!("invalid row {}: {}", raw, e)),
    }
}

fn column_names(schema: &Schema) -> Vec<String> {
    schema.column_names().iter().map(|c| c.to_string()).collect()
}

fn decode(schema: &Schema, column: &str, raw: &str) -> Result<Value, String> {
    schema
        .decode_value(column, &parse_json(raw))
        .map_err(|e| e.to_string())
}

impl<'a> CommandExecutor<'a> {
    pub fn new(command: CliCommand, database: &'a mut Database) -> CommandExecutor<'a> {
        CommandExecutor { command, database }
    }

    fn _schema(&self, table: &str) -> Result<Schema, String> {
        self.database
            .table(table)
            .map(|table| table.schema().clone())
            .map_err(|e| e.to_string())
    }

    fn _key(&self, table: &str, raw: &str) -> Result<Value, String> {
        let schema = self._schema(table)?;
        decode(&schema, schema.primary_key(), raw)
    }

    pub fn execute(mut self) -> Result<CommandResult, String> {
        //! Run the assigned command and return what is to be displayed.

        match self.command {
            CliCommand::Tables => {
                let names = self.database.table_names();
                let rows = names
                    .iter()
                    .map(|name| -> Result<Row, String> {
                        let table = self.database.table(name).map_err(|e| e.to_string())?;
                        Ok(Row::from([
                            ("table", Value::from(name.as_str())),
                            ("rows", Value::from(table.len() as i64)),
                            ("schema", Value::from(table.schema().to_string())),
                        ]))
                    })
                    .collect::<Result<Vec<Row>, String>>()?;

                Ok(CommandResult {
                    message: format!("{} table(s)", names.len()),
                    columns: vec!["table".into(), "rows".into(), "schema".into()],
                    rows: Some(rows),
                })
            }
            CliCommand::CreateTable {
                ref table,
                ref columns,
                ref primary_key,
            } => {
                self.database
                    .create_table(table, columns.as_slice(), primary_key)
                    .map_err(|e| e.to_string())?;

                Ok(CommandResult {
                    message: format!("table {} created", highlight_argument(table)),
                    columns: vec![],
                    rows: None,
                })
            }
            CliCommand::Insert { ref table, ref row } => {
                let schema = self._schema(table)?;
                let row = Row::from_json(&schema, &parse_object(row)?).map_err(|e| e.to_string())?;
                self.database
                    .add_row(table, row)
                    .map_err(|e| e.to_string())?;

                Ok(CommandResult {
                    message: "1 row(s) processed!".to_string(),
                    columns: vec![],
                    rows: None,
                })
            }
            CliCommand::Update {
                ref table,
                ref id,
                ref updates,
            } => {
                let schema = self._schema(table)?;
                let id = self._key(table, id)?;
                let updates =
                    Row::from_json(&schema, &parse_object(updates)?).map_err(|e| e.to_string())?;
                self.database
                    .update_row(table, &id, updates)
                    .map_err(|e| e.to_string())?;

                Ok(CommandResult {
                    message: "1 row(s) processed!".to_string(),
                    columns: vec![],
                    rows: None,
                })
            }
            CliCommand::Delete { ref table, ref id } => {
                let id = self._key(table, id)?;
                let row = self
                    .database
                    .delete_row(table, &id)
                    .map_err(|e| e.to_string())?;

                Ok(CommandResult {
                    message: "1 row(s) processed!".to_string(),
                    columns: column_names(&self._schema(table)?),
                    rows: Some(vec![row]),
                })
            }
            CliCommand::Select {
                ref table,
                ref filters,
                ref sort_by,
                desc,
            } => {
                let schema = self._schema(table)?;
                let predicates = filters
                    .iter()
                    .map(|(column, raw)| -> Result<Predicate, String> {
                        Ok(Predicate::new(column, decode(&schema, column, raw)?))
                    })
                    .collect::<Result<Vec<Predicate>, String>>()?;

                let rows = self
                    .database
                    .get_rows(table, &predicates, sort_by.as_deref(), desc)
                    .map_err(|e| e.to_string())?;

                Ok(CommandResult {
                    message: format!("{} row(s) selected", rows.len()),
                    columns: column_names(&schema),
                    rows: Some(rows),
                })
            }
        }
    }
}
