//! Test utilities for snipview.
//!
//! Available to integration tests through the `test-utils` feature. Nothing
//! here is part of the public API contract.

use std::sync::{Arc, Mutex, Once};

use tracing_subscriber::EnvFilter;

use crate::render::{Frame, Highlighter, Renderer};

static INIT_LOGGING: Once = Once::new();

/// Initializes test-friendly tracing output once per process.
///
/// Honors `RUST_LOG`; does nothing when it is unset so test output stays
/// quiet by default.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Renderer that records every frame it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the frames rendered so far, in order.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().expect("recorder lock poisoned").clone()
    }

    /// The most recent frame, if any.
    #[must_use]
    pub fn last(&self) -> Option<Frame> {
        self.frames().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, frame: &Frame) {
        self.frames
            .lock()
            .expect("recorder lock poisoned")
            .push(frame.clone());
    }
}

/// Highlighter that wraps source in `<hl>` tags for a fixed set of
/// languages and reports itself unavailable for the rest.
#[derive(Debug, Clone)]
pub struct StaticHighlighter {
    languages: Vec<&'static str>,
}

impl StaticHighlighter {
    /// A highlighter that knows exactly `languages`.
    #[must_use]
    pub fn knowing(languages: &[&'static str]) -> Self {
        Self {
            languages: languages.to_vec(),
        }
    }
}

impl Highlighter for StaticHighlighter {
    fn highlight(&self, source: &str, language: &str) -> Option<String> {
        if self.languages.contains(&language) {
            Some(format!("<hl lang=\"{language}\">{source}</hl>"))
        } else {
            None
        }
    }
}
