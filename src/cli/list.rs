//! `snipview list` - list the snippet keys a host provides.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cache::SnippetStore;
use crate::config::first_host;
use crate::config::global::DiscoveredHost;
use crate::core::SnipviewError;
use crate::key::resolve_key;

#[derive(Debug, Args)]
pub struct ListArgs {}

pub async fn execute(
    _args: ListArgs,
    host: Option<String>,
    store: Arc<SnippetStore>,
) -> Result<ExitCode> {
    let host = first_host(&[&host, &DiscoveredHost::new()])
        .ok_or(SnipviewError::MissingConfiguration)?;

    let mapping = store.resolve(&host).await?;

    let mut keys: Vec<&str> = mapping.keys().collect();
    keys.sort_unstable();
    for key in keys {
        let resolved = resolve_key(key);
        println!(
            "{:<32} {:<28} {}",
            key,
            resolved.display_name,
            resolved.language.dimmed()
        );
    }
    Ok(ExitCode::SUCCESS)
}
