//! Aggregating prefetch widget: one fetch on behalf of many viewers.
//!
//! A [`Provider`] resolves its host's snippet mapping once per
//! configuration cycle and then broadcasts the outcome: external
//! subscribers receive a [`PrefetchOutcome`] notification, and every
//! registered child [`Viewer`] without explicit host configuration of its
//! own adopts the provider's host - re-entering `Resolving` and, on the
//! success path, reusing the freshly cached mapping with zero further
//! network activity.
//!
//! The broadcast happens exactly once per prefetch cycle, after the
//! resolution settles, never before. Concurrent providers and viewers on
//! the same host all dedup through the store's single-flight coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::{SnippetMap, SnippetStore};
use crate::config::global::DiscoveredHost;
use crate::config::{SharedDefaults, first_host};
use crate::core::SnipviewError;
use crate::viewer::Viewer;

/// Capacity of the completion-notification channel. Slow subscribers that
/// lag further than this miss older outcomes, not newer ones.
const NOTIFY_CAPACITY: usize = 16;

/// Aggregate state of one provider, mutated only by its own prefetch cycle.
#[derive(Debug, Clone, Default)]
pub struct ProviderState {
    /// The host the last cycle ran against, if one resolved.
    pub host: Option<String>,
    /// The resolved mapping, once a cycle has succeeded.
    pub mapping: Option<Arc<SnippetMap>>,
    /// Whether a prefetch cycle is currently underway.
    pub loading: bool,
    /// Failure message of the last cycle, if it failed.
    pub error: Option<String>,
}

/// Completion notification emitted once per prefetch cycle.
#[derive(Debug, Clone)]
pub struct PrefetchOutcome {
    /// The host the cycle ran against (`None` when no host resolved).
    pub host: Option<String>,
    /// The settled result of the cycle.
    pub result: Result<Arc<SnippetMap>, SnipviewError>,
}

/// An aggregator that prefetches one resource for its child viewers.
pub struct Provider {
    store: Arc<SnippetStore>,
    defaults: Arc<SharedDefaults>,
    discovered: DiscoveredHost,
    explicit_host: Mutex<Option<String>>,
    children: Mutex<Vec<Arc<Viewer>>>,
    state: Mutex<ProviderState>,
    notifier: broadcast::Sender<PrefetchOutcome>,
    attached: AtomicBool,
}

impl Provider {
    /// Creates a detached provider wired to `store` and `defaults`.
    #[must_use]
    pub fn new(store: Arc<SnippetStore>, defaults: Arc<SharedDefaults>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            store,
            defaults,
            discovered: DiscoveredHost::new(),
            explicit_host: Mutex::new(None),
            children: Mutex::new(Vec::new()),
            state: Mutex::new(ProviderState::default()),
            notifier,
            attached: AtomicBool::new(false),
        }
    }

    /// Sets the provider's explicit host.
    #[must_use]
    pub fn with_host(self, host: impl Into<String>) -> Self {
        *self.explicit_host.lock().expect("provider lock poisoned") = Some(host.into());
        self
    }

    /// Replaces the discovery source (tests, relocated configuration).
    #[must_use]
    pub fn with_discovery(mut self, discovered: DiscoveredHost) -> Self {
        self.discovered = discovered;
        self
    }

    /// Registers a child viewer. Children without explicit hosts of their
    /// own receive this provider's host on the next broadcast.
    pub fn register(&self, viewer: Arc<Viewer>) {
        self.children.lock().expect("provider lock poisoned").push(viewer);
    }

    /// Subscribes to completion notifications. Each prefetch cycle delivers
    /// exactly one [`PrefetchOutcome`] to every open receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PrefetchOutcome> {
        self.notifier.subscribe()
    }

    /// Snapshot of the provider's aggregate state.
    #[must_use]
    pub fn state(&self) -> ProviderState {
        self.state.lock().expect("provider lock poisoned").clone()
    }

    /// Attaches the provider and runs its first prefetch cycle.
    pub async fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
        self.prefetch().await;
    }

    /// Changes the explicit host. Runs a new prefetch cycle when attached
    /// and the value actually changed.
    pub async fn set_host(&self, host: impl Into<String>) {
        let host = host.into();
        {
            let mut explicit = self.explicit_host.lock().expect("provider lock poisoned");
            if explicit.as_deref() == Some(host.as_str()) {
                return;
            }
            debug!(target: "provider", "host changed: {:?} -> {:?}", explicit.as_deref(), host);
            *explicit = Some(host);
        }
        if self.attached.load(Ordering::SeqCst) {
            self.prefetch().await;
        }
    }

    /// One prefetch cycle: resolve, settle state, broadcast once.
    async fn prefetch(&self) {
        let host = {
            let explicit = self.explicit_host.lock().expect("provider lock poisoned").clone();
            first_host(&[&explicit, self.defaults.as_ref(), &self.discovered])
        };

        {
            let mut state = self.state.lock().expect("provider lock poisoned");
            state.host = host.clone();
            state.loading = true;
            state.error = None;
        }

        let result = match &host {
            Some(host) => self.store.resolve(host).await,
            None => Err(SnipviewError::MissingConfiguration),
        };

        {
            let mut state = self.state.lock().expect("provider lock poisoned");
            state.loading = false;
            match &result {
                Ok(mapping) => {
                    state.mapping = Some(Arc::clone(mapping));
                    state.error = None;
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                }
            }
        }

        // The broadcast: one notification, then host propagation. Never
        // before settlement, never twice per cycle.
        let _ = self.notifier.send(PrefetchOutcome {
            host: host.clone(),
            result: result.clone(),
        });

        if let Some(host) = &host {
            let children: Vec<Arc<Viewer>> = self
                .children
                .lock()
                .expect("provider lock poisoned")
                .iter()
                .map(Arc::clone)
                .collect();
            for child in children {
                if !child.has_explicit_host() {
                    child.adopt_host(host).await;
                }
            }
        }
        debug!(
            target: "provider",
            "prefetch cycle settled for {host:?} (ok: {})",
            result.is_ok()
        );
    }
}
