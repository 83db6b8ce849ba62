//! Snippet resource caching and fetch coordination.
//!
//! This module is the consistency core of the crate: a URL-keyed,
//! write-once cache of resolved snippet mappings, fronted by a coordinator
//! that guarantees **single-flight** fetching - at most one outstanding
//! network request per resource URL, no matter how many viewers and
//! providers ask for it concurrently.
//!
//! # Architecture Overview
//!
//! The store keeps two process-wide tables, both keyed by the normalized
//! resource URL:
//!
//! - `resolved`: URL → `Arc<SnippetMap>`. Populated at most once per URL and
//!   never replaced or mutated afterwards, so every reader shares the same
//!   mapping object for the life of the store.
//! - `pending`: URL → a shared in-flight fetch. Every caller that observes
//!   the same URL before the fetch settles clones and awaits the *same*
//!   future; the entry is removed the instant it settles, success or
//!   failure, whether or not the result was cached.
//!
//! # Coordination
//!
//! Resolution is a check-then-act sequence - cache lookup, pending lookup,
//! pending creation - that must be atomic on a multi-threaded runtime. The
//! pending table's entry API provides exactly that: a vacant entry is
//! filled before the shard lock is released, so two racing callers can
//! never both install a fetch for one URL.
//!
//! ```text
//! caller A: resolve(H) ──► miss ──► install pending ──► GET /snippets.json
//! caller B: resolve(H) ──► miss ──► join pending ─────────────┐
//! caller C: resolve(H) ──► miss ──► join pending ─────────────┤
//!                                            settle ◄─────────┘
//!                    success: cache H, drop pending, all of A/B/C get the
//!                             same Arc
//!                    failure: drop pending, all of A/B/C get a clone of the
//!                             same error
//! ```
//!
//! There is no retry, cancellation, or timeout at this layer: a resolution
//! runs to settlement once started. Callers that arrive after a failed
//! fetch has settled start a fresh one.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::SNIPPETS_RESOURCE_PATH;
use crate::core::SnipviewError;

/// Immutable snippet-key → source-text mapping for one resource.
///
/// Deserialized from the JSON object the host serves at
/// [`SNIPPETS_RESOURCE_PATH`] and handed out as `Arc<SnippetMap>`; once a
/// mapping is in the store it is never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SnippetMap(HashMap<String, String>);

impl SnippetMap {
    /// Returns the source text for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the mapping contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over the snippet keys, in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of snippets in the mapping.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for SnippetMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A joinable in-flight fetch. `Shared` hands every caller a clone of the
/// same settled result.
type SharedFetch = Shared<BoxFuture<'static, Result<Arc<SnippetMap>, SnipviewError>>>;

/// Normalizes a configured host to its resource URL.
///
/// One trailing path separator is stripped before appending the fixed
/// resource path, so hosts differing only by a trailing `/` share a cache
/// entry.
#[must_use]
pub fn resource_url(host: &str) -> String {
    let trimmed = host.strip_suffix('/').unwrap_or(host);
    format!("{trimmed}{SNIPPETS_RESOURCE_PATH}")
}

/// Process-wide snippet store: resolved cache plus fetch coordinator.
///
/// Construct one per process (or one per test) and pass it by `Arc` to
/// every [`Viewer`](crate::viewer::Viewer) and
/// [`Provider`](crate::provider::Provider). The store is deliberately an
/// explicit, injectable object rather than an ambient global: tests build
/// isolated stores while production shares one.
pub struct SnippetStore {
    client: reqwest::Client,
    resolved: Arc<DashMap<String, Arc<SnippetMap>>>,
    pending: Arc<DashMap<String, SharedFetch>>,
}

impl SnippetStore {
    /// Creates a store with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Creates a store using a caller-supplied HTTP client.
    ///
    /// The client is shared by every fetch the store issues.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            resolved: Arc::new(DashMap::new()),
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Resolves the snippet mapping for `host`.
    ///
    /// Fast path: a cached mapping is returned immediately with zero network
    /// activity. Otherwise the caller either joins the in-flight fetch for
    /// the URL or installs a new one. All callers joined on one fetch settle
    /// together: with the same `Arc` on success, or a clone of the same
    /// error on failure.
    ///
    /// # Errors
    ///
    /// [`SnipviewError::NetworkFailure`] for a non-success HTTP status,
    /// [`SnipviewError::TransportFailure`] for a connect, body, or
    /// JSON-parse error. Both are terminal for the attempt; nothing retries.
    pub async fn resolve(&self, host: &str) -> Result<Arc<SnippetMap>, SnipviewError> {
        let url = resource_url(host);

        if let Some(mapping) = self.resolved.get(&url) {
            debug!(target: "cache", "cache hit for {url}");
            return Ok(Arc::clone(mapping.value()));
        }

        // Vacant entries are filled before the shard lock is released, so
        // exactly one caller installs the fetch; everyone else joins it.
        let fetch = match self.pending.entry(url.clone()) {
            Entry::Occupied(entry) => {
                debug!(target: "cache", "joining in-flight fetch for {url}");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // The previous fetch may have settled between the cache
                // check and this point; re-check before installing a new
                // one so a cached URL is never refetched.
                if let Some(mapping) = self.resolved.get(&url) {
                    return Ok(Arc::clone(mapping.value()));
                }
                let fetch = Self::install_fetch(
                    self.client.clone(),
                    Arc::clone(&self.resolved),
                    Arc::clone(&self.pending),
                    url.clone(),
                );
                entry.insert(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    /// Returns the cached mapping for `host` without any network activity.
    #[must_use]
    pub fn cached(&self, host: &str) -> Option<Arc<SnippetMap>> {
        self.resolved
            .get(&resource_url(host))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Builds the shared future for a new fetch of `url`.
    ///
    /// The future itself writes the cache and removes the pending entry as
    /// it settles, so the cleanup happens no matter which joined caller
    /// drives it to completion.
    fn install_fetch(
        client: reqwest::Client,
        resolved: Arc<DashMap<String, Arc<SnippetMap>>>,
        pending: Arc<DashMap<String, SharedFetch>>,
        url: String,
    ) -> SharedFetch {
        async move {
            let result = Self::fetch_mapping(&client, &url).await;
            match &result {
                Ok(mapping) => {
                    // Write-once: an existing entry is never replaced.
                    resolved
                        .entry(url.clone())
                        .or_insert_with(|| Arc::clone(mapping));
                    debug!(target: "cache", "resolved {url} ({} snippets)", mapping.len());
                }
                Err(err) => {
                    warn!(target: "cache", "fetch for {url} failed: {err}");
                }
            }
            pending.remove(&url);
            result
        }
        .boxed()
        .shared()
    }

    async fn fetch_mapping(
        client: &reqwest::Client,
        url: &str,
    ) -> Result<Arc<SnippetMap>, SnipviewError> {
        debug!(target: "cache", "fetching {url}");
        let response =
            client
                .get(url)
                .send()
                .await
                .map_err(|err| SnipviewError::TransportFailure {
                    cause: err.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnipviewError::NetworkFailure {
                status: status.as_u16(),
            });
        }

        let mapping: SnippetMap =
            response
                .json()
                .await
                .map_err(|err| SnipviewError::TransportFailure {
                    cause: err.to_string(),
                })?;
        Ok(Arc::new(mapping))
    }
}

impl Default for SnippetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SnippetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetStore")
            .field("resolved", &self.resolved.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
