//! Integration tests for the provider: one fetch per prefetch cycle,
//! broadcast-once semantics, and host propagation to hostless children.

mod common;

use std::sync::Arc;

use serial_test::serial;
use snipview::cache::SnippetStore;
use snipview::config::SharedDefaults;
use snipview::config::global::DiscoveredHost;
use snipview::constants::HOST_ENV_VAR;
use snipview::provider::Provider;
use snipview::test_utils::{RecordingRenderer, init_test_logging};
use snipview::viewer::{Viewer, ViewerState};

use common::snippet_server::{self, ServerOptions};

const MAPPING: &str =
    r#"{"a@a.rs": "fn a() {}", "b@b.ts": "let b = 2;", "c@c.py": "print('c')"}"#;

fn hermetic_discovery() -> DiscoveredHost {
    DiscoveredHost::with_config_path("/nonexistent/snipview.toml")
}

fn hermetic_viewer(
    store: &Arc<SnippetStore>,
    defaults: &Arc<SharedDefaults>,
    renderer: &RecordingRenderer,
    key: &str,
) -> Arc<Viewer> {
    Arc::new(
        Viewer::new(
            Arc::clone(store),
            Arc::clone(defaults),
            Arc::new(renderer.clone()),
        )
        .with_discovery(hermetic_discovery())
        .with_key(key),
    )
}

fn clear_host_env() {
    // SAFETY: tests mutating process env are serialized with #[serial].
    unsafe { std::env::remove_var(HOST_ENV_VAR) };
}

#[tokio::test]
#[serial]
async fn prefetch_feeds_hostless_children_from_one_request() {
    init_test_logging();
    clear_host_env();
    let server = snippet_server::start_json(MAPPING);
    let store = Arc::new(SnippetStore::new());
    let defaults = Arc::new(SharedDefaults::new());

    let renderer = RecordingRenderer::new();
    let children = [
        hermetic_viewer(&store, &defaults, &renderer, "a@a.rs"),
        hermetic_viewer(&store, &defaults, &renderer, "b@b.ts"),
        hermetic_viewer(&store, &defaults, &renderer, "c@c.py"),
    ];
    for child in &children {
        child.attach().await;
        assert!(
            matches!(child.state(), ViewerState::Failed { .. }),
            "no host yet"
        );
    }

    let provider = Provider::new(Arc::clone(&store), Arc::clone(&defaults))
        .with_discovery(hermetic_discovery())
        .with_host(server.url());
    for child in &children {
        provider.register(Arc::clone(child));
    }
    let mut outcomes = provider.subscribe();

    provider.attach().await;

    assert_eq!(server.hits(), 1, "children reuse the provider's one fetch");
    assert_eq!(
        children[0].state(),
        ViewerState::Ready {
            code: "fn a() {}".to_string(),
            language: "rust"
        }
    );
    assert_eq!(
        children[1].state(),
        ViewerState::Ready {
            code: "let b = 2;".to_string(),
            language: "typescript"
        }
    );
    assert_eq!(
        children[2].state(),
        ViewerState::Ready {
            code: "print('c')".to_string(),
            language: "python"
        }
    );

    let state = provider.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.mapping.as_ref().map(|m| m.len()), Some(3));

    let outcome = outcomes.recv().await.unwrap();
    assert_eq!(outcome.host.as_deref(), Some(server.url()));
    assert_eq!(outcome.result.unwrap().len(), 3);
    assert!(outcomes.try_recv().is_err(), "exactly one broadcast");
}

#[tokio::test]
#[serial]
async fn children_with_explicit_hosts_are_left_alone() {
    init_test_logging();
    clear_host_env();
    let provider_server = snippet_server::start_json(MAPPING);
    let own_server = snippet_server::start_json(r#"{"own@own.rs": "fn own() {}"}"#);
    let store = Arc::new(SnippetStore::new());
    let defaults = Arc::new(SharedDefaults::new());
    let renderer = RecordingRenderer::new();

    let hostless = hermetic_viewer(&store, &defaults, &renderer, "a@a.rs");
    let explicit = Arc::new(
        Viewer::new(
            Arc::clone(&store),
            Arc::clone(&defaults),
            Arc::new(renderer.clone()),
        )
        .with_discovery(hermetic_discovery())
        .with_host(own_server.url())
        .with_key("own@own.rs"),
    );
    hostless.attach().await;
    explicit.attach().await;

    let provider = Provider::new(Arc::clone(&store), Arc::clone(&defaults))
        .with_discovery(hermetic_discovery())
        .with_host(provider_server.url());
    provider.register(Arc::clone(&hostless));
    provider.register(Arc::clone(&explicit));
    provider.attach().await;

    assert_eq!(
        hostless.state(),
        ViewerState::Ready {
            code: "fn a() {}".to_string(),
            language: "rust"
        }
    );
    assert_eq!(
        explicit.state(),
        ViewerState::Ready {
            code: "fn own() {}".to_string(),
            language: "rust"
        },
        "a child with its own host keeps its own content"
    );
    assert_eq!(provider_server.hits(), 1);
    assert_eq!(own_server.hits(), 1);
}

#[tokio::test]
#[serial]
async fn provider_without_host_broadcasts_the_configuration_error() {
    init_test_logging();
    clear_host_env();
    let store = Arc::new(SnippetStore::new());
    let defaults = Arc::new(SharedDefaults::new());

    let provider =
        Provider::new(store, defaults).with_discovery(hermetic_discovery());
    let mut outcomes = provider.subscribe();

    provider.attach().await;

    let state = provider.state();
    assert!(!state.loading);
    assert_eq!(state.mapping, None);
    assert_eq!(
        state.error.as_deref(),
        Some("Missing snippet or snippet-host")
    );

    let outcome = outcomes.recv().await.unwrap();
    assert_eq!(outcome.host, None);
    assert!(outcome.result.is_err());
}

#[tokio::test]
#[serial]
async fn prefetch_failure_reaches_state_and_children() {
    init_test_logging();
    clear_host_env();
    let server = snippet_server::start_with_options(ServerOptions {
        status: 500,
        body: String::new(),
        ..ServerOptions::default()
    });
    let store = Arc::new(SnippetStore::new());
    let defaults = Arc::new(SharedDefaults::new());
    let renderer = RecordingRenderer::new();

    let child = hermetic_viewer(&store, &defaults, &renderer, "a@a.rs");
    child.attach().await;

    let provider = Provider::new(Arc::clone(&store), Arc::clone(&defaults))
        .with_discovery(hermetic_discovery())
        .with_host(server.url());
    provider.register(Arc::clone(&child));
    provider.attach().await;

    let state = provider.state();
    assert!(state.error.as_deref().unwrap().contains("500"));
    assert_eq!(state.mapping, None);

    match child.state() {
        ViewerState::Failed { message } => assert!(message.contains("500"), "{message}"),
        state => panic!("expected failure, got {state:?}"),
    }
}

#[tokio::test]
#[serial]
async fn each_cycle_broadcasts_exactly_once() {
    init_test_logging();
    clear_host_env();
    let first = snippet_server::start_json(MAPPING);
    let second = snippet_server::start_json(r#"{"z@z.go": "func z() {}"}"#);
    let store = Arc::new(SnippetStore::new());
    let defaults = Arc::new(SharedDefaults::new());

    let provider = Provider::new(store, defaults)
        .with_discovery(hermetic_discovery())
        .with_host(first.url());
    let mut outcomes = provider.subscribe();
    assert!(outcomes.try_recv().is_err(), "nothing before settlement");

    provider.attach().await;
    assert!(outcomes.try_recv().is_ok());
    assert!(outcomes.try_recv().is_err());

    provider.set_host(second.url()).await;
    let outcome = outcomes.try_recv().unwrap();
    assert_eq!(outcome.host.as_deref(), Some(second.url()));
    assert!(outcomes.try_recv().is_err());

    // An unchanged host is not a new cycle.
    provider.set_host(second.url()).await;
    assert!(outcomes.try_recv().is_err());
}
