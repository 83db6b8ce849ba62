//! Command-line interface for snipview.
//!
//! Two subcommands over the same library core the embeddable widgets use:
//! `show` drives a [`Viewer`](crate::viewer::Viewer) against a terminal
//! renderer, `list` resolves a host's mapping and prints the available
//! keys. The host comes from `--host` or the configuration precedence
//! chain.

mod list;
mod show;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::SnippetStore;
use crate::config::SharedDefaults;

/// Display code snippets from a shared snippet host.
#[derive(Debug, Parser)]
#[command(name = "snipview", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snippet host to use, overriding every other host source.
    #[arg(long, global = true)]
    host: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and display one snippet.
    Show(show::ShowArgs),
    /// List the snippet keys a host provides.
    List(list::ListArgs),
}

impl Cli {
    /// Executes the parsed command.
    ///
    /// Returns the process exit code for outcomes the command has already
    /// reported (a rendered viewer failure); returns `Err` for everything
    /// the caller should display.
    pub async fn execute(self) -> Result<ExitCode> {
        init_logging(self.verbose, self.quiet);

        let store = Arc::new(SnippetStore::new());
        let defaults = Arc::new(SharedDefaults::new());

        match self.command {
            Commands::Show(args) => show::execute(args, self.host, store, defaults).await,
            Commands::List(args) => list::execute(args, self.host, store).await,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
