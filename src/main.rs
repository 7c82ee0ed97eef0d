use std::process::ExitCode;

use clap::Parser;
use slate_engine::cli::{self, format_message, logger, parsers::CliParser};
use slate_engine::config::Config;

fn main() -> ExitCode {
    let args = CliParser::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", format_message("config", message));
            return ExitCode::FAILURE;
        }
    };

    if let Err(message) = logger::init(config.log_level) {
        eprintln!("{}", format_message("system", message));
    }

    match cli::run(args, config) {
        Ok(result) => {
            println!("{}", result);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
