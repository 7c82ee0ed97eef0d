//! The thin command line front of the engine. Each invocation opens the
//! database, runs a single command and exits; the snapshot file is the only
//! state carried between runs.

use log::debug;

use crate::{
    cli::{
        messages::{highlight_argument, system_message},
        parsers::CliParser,
    },
    config::Config,
    persistence::Database,
};

mod colors;
mod commands;
pub mod logger;
mod messages;
pub mod parsers;

pub use commands::{CommandExecutor, CommandResult};
pub use messages::system_message as format_message;

pub fn run(args: CliParser, config: Config) -> Result<CommandResult, String> {
    //! Open the database named on the command line and run its command.
    //!
    //! `--data-dir` wins over the configured data directory.

    let data_dir = args.data_dir.unwrap_or(config.data_dir);
    debug!(
        "using data directory {}",
        highlight_argument(&data_dir.display().to_string())
    );

    let mut database = Database::open(&args.database, &data_dir).map_err(|e| {
        system_message(
            "system",
            format!(
                "Could not open database {}: {}",
                highlight_argument(&args.database),
                e
            ),
        )
    })?;

    CommandExecutor::new(args.command, &mut database)
        .execute()
        .map_err(|e| system_message("error", e))
}
