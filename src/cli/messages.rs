//! General message formatting functions for prettifying the CLI.
//! Includes basic utility functions such as:
//!
//! - Highlight Text (make the text slate blue but not bold)
//! - System message formatting functions that produce the same
//! format messages, for both command output and log records.

use colored::Colorize;

use crate::cli::colors::{SLATE_BLUE, SLATE_GREY};

pub fn highlight_argument(argument: &str) -> String {
    //! Highlight a piece of text in the slate blue
    //! color to make it obvious.
    //!
    //! Returns a formatted string.

    format!("{}", argument.color(SLATE_BLUE))
}

pub fn dim(text: &str) -> String {
    format!("{}", text.color(SLATE_GREY))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Write a system message on the command line, properly
    //! formatted, according to the command line theme.
    //!
    //! Takes in a source name (like 'system') as [`String`] and
    //! the message as a formatted text; output of [`format!`].

    let source_formatted = format!("{:6}", source_name.color(SLATE_BLUE).bold());

    format!("[{}] {}", source_formatted, message)
}
