//! The place where the command line is defined.
//!
//! Rows, keys and filter values are given as JSON and typed through the
//! table's schema, so `1` is an integer, `"1"` a string and `"9.99"` can be
//! a decimal. A key or filter value that is not valid JSON is taken as a
//! plain string, which saves quoting for text keys.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slate")]
#[command(about = "A Rust-powered embedded tabular store", long_about = None)]
pub struct CliParser {
    /// Name of the database; its snapshot is `<data dir>/<name>.json`.
    pub database: String,

    /// Directory holding the snapshots, overrides `SLATE_DATA_DIR`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// List the tables of the database.
    Tables,

    /// Create (or replace) a table.
    CreateTable {
        table: String,

        /// A column as `name=declaration`, e.g. `id="int not null"`. Repeat for more.
        #[arg(short, long = "column", value_parser = parse_pair, required = true)]
        columns: Vec<(String, String)>,

        /// The primary-key column.
        #[arg(short, long)]
        primary_key: String,
    },

    /// Insert a row given as a JSON object.
    Insert { table: String, row: String },

    /// Update the row with key `id` using a JSON object of new values.
    Update {
        table: String,
        id: String,
        updates: String,
    },

    /// Delete the row with key `id`.
    Delete { table: String, id: String },

    /// Query rows with equality filters and an optional sort.
    Select {
        table: String,

        /// An equality filter as `column=value`. Repeat to require all of them.
        #[arg(short = 'w', long = "where", value_parser = parse_pair)]
        filters: Vec<(String, String)>,

        #[arg(short, long)]
        sort_by: Option<String>,

        /// Sort in descending order.
        #[arg(long)]
        desc: bool,
    },
}

pub(crate) fn parse_pair(argument: &str) -> Result<(String, String), String> {
    let (name, value) = argument
        .split_once('=')
        .ok_or_else(|| format!("invalid argument {}: expected `name=value`", argument))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid argument {}: name is empty", argument));
    }

    Ok((name.to_string(), value.to_string()))
}
