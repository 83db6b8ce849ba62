//! snipview CLI entry point.
//!
//! Parses arguments, runs the selected command, and reports failures with
//! user-friendly context and suggestions.

use std::process::ExitCode;

use clap::Parser;
use snipview::cli::Cli;
use snipview::core::user_friendly_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(code) => code,
        Err(err) => {
            user_friendly_error(err).display();
            ExitCode::FAILURE
        }
    }
}
