//! Render seam: frames and the external rendering collaborators.
//!
//! The viewer never draws anything itself. Each state transition emits one
//! [`Frame`] to a [`Renderer`]; what a frame becomes - a terminal block, an
//! isolated DOM subtree, a test recording - is the collaborator's business.
//!
//! Highlighting is the second collaborator seam. A [`Highlighter`] may be
//! absent or may not know a language; either way the consumer falls back to
//! the raw source text. Degraded rendering is silent and never an error.

use colored::Colorize;

use crate::config::Theme;

/// One render instruction, emitted on entry to each viewer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A resolution is underway. `label` is the snippet's display name when
    /// the key is known, or generic status text.
    Resolving {
        /// Text to show while loading.
        label: String,
    },
    /// The snippet resolved. `markup` is present only when a highlighter
    /// produced it; consumers fall back to `code` otherwise.
    Ready {
        /// Display name derived from the snippet key.
        display_name: String,
        /// Language tag derived from the snippet key.
        language: &'static str,
        /// Raw source text.
        code: String,
        /// Highlighted markup, if the highlighter supplied any.
        markup: Option<String>,
    },
    /// The resolution failed; `message` is the user-visible error text.
    Failed {
        /// User-visible failure message.
        message: String,
    },
}

/// Rendering collaborator: receives every frame a viewer emits.
pub trait Renderer: Send + Sync {
    /// Presents one frame.
    fn render(&self, frame: &Frame);
}

/// Syntax-highlighting collaborator.
///
/// Returns marked-up text, or `None` when the engine is unavailable or the
/// language is unrecognized. Callers fall back to the raw source.
pub trait Highlighter: Send + Sync {
    /// Highlights `source` as `language`, if possible.
    fn highlight(&self, source: &str, language: &str) -> Option<String>;
}

/// Terminal renderer used by the CLI front-end.
///
/// Prints ready frames to stdout: a header line with the display name and
/// language, then the snippet body (highlighted markup when present).
/// Resolving frames are traced rather than printed; failure frames go to
/// stderr and the command's exit code reports them, so nothing is printed
/// twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermRenderer {
    theme: Theme,
}

impl TermRenderer {
    /// Creates a terminal renderer for `theme`.
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    fn header(&self, display_name: &str, language: &str) -> String {
        let title = match self.theme {
            Theme::Dark => display_name.bold().cyan(),
            Theme::Light => display_name.bold().blue(),
        };
        format!("{title} {}", format!("({language})").dimmed())
    }
}

impl Renderer for TermRenderer {
    fn render(&self, frame: &Frame) {
        match frame {
            Frame::Resolving { label } => {
                tracing::debug!(target: "render", "resolving {label}");
            }
            Frame::Ready {
                display_name,
                language,
                code,
                markup,
            } => {
                println!("{}", self.header(display_name, language));
                println!("{}", markup.as_deref().unwrap_or(code));
            }
            Frame::Failed { message } => {
                eprintln!("{} {message}", "error:".red().bold());
            }
        }
    }
}
