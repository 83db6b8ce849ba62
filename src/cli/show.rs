//! `snipview show` - fetch and display one snippet.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::cache::SnippetStore;
use crate::config::{SharedDefaults, Theme};
use crate::render::TermRenderer;
use crate::viewer::{Viewer, ViewerState};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Snippet key (`name@filename.ext`, or a bare filename).
    key: String,

    /// Theme for terminal colors.
    #[arg(long, value_parser = parse_theme)]
    theme: Option<Theme>,
}

fn parse_theme(raw: &str) -> Result<Theme, String> {
    Theme::parse(raw).ok_or_else(|| format!("unknown theme `{raw}` (expected dark or light)"))
}

/// Runs a viewer against the terminal renderer. The renderer prints both
/// the ready and failed frames, so this only maps the final state to an
/// exit code.
pub async fn execute(
    args: ShowArgs,
    host: Option<String>,
    store: Arc<SnippetStore>,
    defaults: Arc<SharedDefaults>,
) -> Result<ExitCode> {
    let theme = args.theme.or_else(|| defaults.theme()).unwrap_or_default();
    let mut viewer = Viewer::new(store, defaults, Arc::new(TermRenderer::new(theme)))
        .with_key(args.key);
    if let Some(host) = host {
        viewer = viewer.with_host(host);
    }

    viewer.attach().await;
    match viewer.state() {
        ViewerState::Ready { .. } => Ok(ExitCode::SUCCESS),
        _ => Ok(ExitCode::FAILURE),
    }
}
