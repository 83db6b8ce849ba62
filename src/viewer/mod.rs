//! Single-snippet display widget: a state machine over the snippet store.
//!
//! A [`Viewer`] owns one [`ViewerState`] and drives it from two inputs:
//! configuration changes (host, snippet key) and the settlement of store
//! resolutions. Every entry to `Resolving`, `Ready`, or `Failed` emits one
//! render frame to the wired [`Renderer`] - that emission and the store
//! calls are the viewer's only observable effects.
//!
//! # Transitions
//!
//! ```text
//! Idle ──attach──► Resolving ──mapping has key──► Ready
//!                      │  ╲──key missing────────► Failed("Snippet ... not found")
//!                      │  ╲──fetch failed───────► Failed("Failed to load snippet: ...")
//!                      ╲────no host or key──────► Failed("Missing snippet or snippet-host")
//! any state ──configuration change──► Resolving        (no state is terminal)
//! ```
//!
//! Configuration changes before [`Viewer::attach`] only record the value;
//! the first resolution runs at attach time.
//!
//! # Superseded resolutions
//!
//! A configuration change while a resolution is outstanding starts a new
//! resolution without cancelling the old one. Each resolution captures the
//! viewer's generation counter when it starts and applies its transition
//! only if the counter is unchanged at settlement, so a slow, stale
//! resolution can never overwrite the result of a later, faster one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::cache::SnippetStore;
use crate::config::global::DiscoveredHost;
use crate::config::{SharedDefaults, first_host};
use crate::core::SnipviewError;
use crate::key::resolve_key;
use crate::render::{Frame, Highlighter, Renderer};

/// Display state of one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerState {
    /// Constructed but not yet attached.
    #[default]
    Idle,
    /// A resolution is underway.
    Resolving,
    /// The snippet resolved.
    Ready {
        /// Raw source text of the snippet.
        code: String,
        /// Language tag derived from the snippet key.
        language: &'static str,
    },
    /// The resolution failed.
    Failed {
        /// User-visible failure message.
        message: String,
    },
}

/// A single-snippet display widget.
///
/// Construct with [`Viewer::new`], configure with the `with_*` builders,
/// share as `Arc<Viewer>`, then [`attach`](Viewer::attach). All methods take
/// `&self`; internal state sits behind locks that are never held across an
/// await point.
pub struct Viewer {
    store: Arc<SnippetStore>,
    defaults: Arc<SharedDefaults>,
    renderer: Arc<dyn Renderer>,
    highlighter: Option<Arc<dyn Highlighter>>,
    discovered: DiscoveredHost,
    explicit_host: Mutex<Option<String>>,
    provider_host: Mutex<Option<String>>,
    key: Mutex<Option<String>>,
    state: Mutex<ViewerState>,
    generation: AtomicU64,
    attached: AtomicBool,
}

impl Viewer {
    /// Creates an idle viewer wired to `store` and `defaults`.
    #[must_use]
    pub fn new(
        store: Arc<SnippetStore>,
        defaults: Arc<SharedDefaults>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            store,
            defaults,
            renderer,
            highlighter: None,
            discovered: DiscoveredHost::new(),
            explicit_host: Mutex::new(None),
            provider_host: Mutex::new(None),
            key: Mutex::new(None),
            state: Mutex::new(ViewerState::Idle),
            generation: AtomicU64::new(0),
            attached: AtomicBool::new(false),
        }
    }

    /// Sets the explicit host configuration (highest precedence).
    #[must_use]
    pub fn with_host(self, host: impl Into<String>) -> Self {
        *self.explicit_host.lock().expect("viewer lock poisoned") = Some(host.into());
        self
    }

    /// Sets the snippet key.
    #[must_use]
    pub fn with_key(self, key: impl Into<String>) -> Self {
        *self.key.lock().expect("viewer lock poisoned") = Some(key.into());
        self
    }

    /// Wires the highlighting collaborator.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Replaces the discovery source. Embeddings that relocate configuration
    /// (and tests) use this; the default discovers from the environment and
    /// the platform config path.
    #[must_use]
    pub fn with_discovery(mut self, discovered: DiscoveredHost) -> Self {
        self.discovered = discovered;
        self
    }

    /// Attaches the viewer and runs its first resolution.
    pub async fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
        self.refresh().await;
    }

    /// Changes the explicit host. Re-resolves when attached and the value
    /// actually changed.
    pub async fn set_host(&self, host: impl Into<String>) {
        let host = host.into();
        {
            let mut explicit = self.explicit_host.lock().expect("viewer lock poisoned");
            if explicit.as_deref() == Some(host.as_str()) {
                return;
            }
            debug!(target: "viewer", "host changed: {:?} -> {:?}", explicit.as_deref(), host);
            *explicit = Some(host);
        }
        if self.attached.load(Ordering::SeqCst) {
            self.refresh().await;
        }
    }

    /// Changes the snippet key. Re-resolves when attached and the value
    /// actually changed.
    pub async fn set_key(&self, key: impl Into<String>) {
        let key = key.into();
        {
            let mut current = self.key.lock().expect("viewer lock poisoned");
            if current.as_deref() == Some(key.as_str()) {
                return;
            }
            debug!(target: "viewer", "key changed: {:?} -> {:?}", current.as_deref(), key);
            *current = Some(key);
        }
        if self.attached.load(Ordering::SeqCst) {
            self.refresh().await;
        }
    }

    /// Adopts a host propagated by an ancestor provider. Sits below the
    /// explicit host in the precedence chain.
    pub(crate) async fn adopt_host(&self, host: &str) {
        {
            let mut provider = self.provider_host.lock().expect("viewer lock poisoned");
            if provider.as_deref() == Some(host) {
                return;
            }
            *provider = Some(host.to_string());
        }
        if self.attached.load(Ordering::SeqCst) {
            self.refresh().await;
        }
    }

    /// Whether this viewer has explicit host configuration of its own.
    /// Providers leave such viewers alone when broadcasting their host.
    #[must_use]
    pub fn has_explicit_host(&self) -> bool {
        self.explicit_host
            .lock()
            .expect("viewer lock poisoned")
            .is_some()
    }

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> ViewerState {
        self.state.lock().expect("viewer lock poisoned").clone()
    }

    /// Resolves the effective host through the precedence chain: explicit,
    /// provider-propagated, shared default, discovered.
    #[must_use]
    pub fn effective_host(&self) -> Option<String> {
        let explicit = self.explicit_host.lock().expect("viewer lock poisoned").clone();
        let provider = self.provider_host.lock().expect("viewer lock poisoned").clone();
        first_host(&[
            &explicit,
            &provider,
            self.defaults.as_ref(),
            &self.discovered,
        ])
    }

    /// Runs one resolution cycle against the current configuration.
    async fn refresh(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let host = self.effective_host();
        let key = self.key.lock().expect("viewer lock poisoned").clone();

        let label = key
            .as_deref()
            .map(|k| resolve_key(k).display_name)
            .unwrap_or_else(|| "snippet".to_string());
        self.apply(generation, ViewerState::Resolving, Frame::Resolving { label });

        let (Some(host), Some(key)) = (host, key) else {
            let message = SnipviewError::MissingConfiguration.to_string();
            self.apply(
                generation,
                ViewerState::Failed {
                    message: message.clone(),
                },
                Frame::Failed { message },
            );
            return;
        };

        match self.store.resolve(&host).await {
            Ok(mapping) => match mapping.get(&key) {
                Some(code) => {
                    let resolved = resolve_key(&key);
                    let markup = self
                        .highlighter
                        .as_deref()
                        .and_then(|h| h.highlight(code, resolved.language));
                    self.apply(
                        generation,
                        ViewerState::Ready {
                            code: code.to_string(),
                            language: resolved.language,
                        },
                        Frame::Ready {
                            display_name: resolved.display_name,
                            language: resolved.language,
                            code: code.to_string(),
                            markup,
                        },
                    );
                }
                None => {
                    let message = SnipviewError::SnippetNotFound { key }.to_string();
                    self.apply(
                        generation,
                        ViewerState::Failed {
                            message: message.clone(),
                        },
                        Frame::Failed { message },
                    );
                }
            },
            Err(err) => {
                let message = format!("Failed to load snippet: {err}");
                self.apply(
                    generation,
                    ViewerState::Failed {
                        message: message.clone(),
                    },
                    Frame::Failed { message },
                );
            }
        }
    }

    /// Applies a transition, unless a later resolution has superseded the
    /// one that produced it. The frame is emitted only when the transition
    /// applies.
    fn apply(&self, generation: u64, next: ViewerState, frame: Frame) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(target: "viewer", "discarding stale transition (generation {generation})");
            return;
        }
        *self.state.lock().expect("viewer lock poisoned") = next;
        self.renderer.render(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&self, _frame: &Frame) {}
    }

    fn bare_viewer() -> Viewer {
        Viewer::new(
            Arc::new(SnippetStore::new()),
            Arc::new(SharedDefaults::new()),
            Arc::new(NullRenderer),
        )
        .with_discovery(DiscoveredHost::with_config_path("/nonexistent/config.toml"))
    }

    #[test]
    fn starts_idle() {
        assert_eq!(bare_viewer().state(), ViewerState::Idle);
    }

    #[test]
    fn explicit_host_wins_over_defaults() {
        let viewer = bare_viewer().with_host("https://explicit");
        viewer.defaults.set_host("https://default");
        assert_eq!(viewer.effective_host(), Some("https://explicit".to_string()));
        assert!(viewer.has_explicit_host());
    }

    #[tokio::test]
    async fn provider_host_sits_between_explicit_and_defaults() {
        let viewer = bare_viewer();
        viewer.defaults.set_host("https://default");
        // Not attached, so adoption records the host without resolving.
        viewer.adopt_host("https://provider").await;
        assert_eq!(viewer.effective_host(), Some("https://provider".to_string()));
        assert!(!viewer.has_explicit_host());
    }

    #[tokio::test]
    async fn configuration_before_attach_does_not_resolve() {
        let viewer = bare_viewer().with_key("a@a.rs");
        viewer.set_host("https://somewhere").await;
        assert_eq!(viewer.state(), ViewerState::Idle);
    }
}
