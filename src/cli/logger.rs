//! A [`log::Log`] implementation for the command line.
//!
//! Records are written to stderr through [`system_message`], with the level
//! as the source name, so they read like the rest of the CLI output and do
//! not mix with query results on stdout.

use log::{LevelFilter, Log, Metadata, Record};

use crate::cli::messages::system_message;

struct CliLogger;

static LOGGER: CliLogger = CliLogger;

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = record.level().as_str().to_lowercase();
            eprintln!("{}", system_message(&level, record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), String> {
    //! Install the CLI logger. Can only be done once per process.

    log::set_logger(&LOGGER).map_err(|e| format!("logger already set: {}", e))?;
    log::set_max_level(level);
    Ok(())
}
