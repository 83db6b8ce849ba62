//! snipview - embeddable code-snippet display with a single-flight cache.
//!
//! Many independent embeds - viewers created anywhere in a process - display
//! code snippets pulled from a single shared JSON resource per host
//! (`{host}/snippets.json`). The crate's core is the coordination layer that
//! keeps those embeds cheap and consistent:
//!
//! - a process-wide, URL-keyed **snippet store** with write-once caching and
//!   **single-flight** request deduplication ([`cache`]);
//! - the reactive **viewer state machine** each display widget runs against
//!   that store ([`viewer`]);
//! - an aggregating **provider** that prefetches a resource once on behalf
//!   of any number of child viewers and broadcasts the outcome ([`provider`]).
//!
//! Rendering and syntax highlighting are external collaborators behind the
//! narrow trait seams in [`render`]; a terminal front-end ships as the
//! `snipview` binary ([`cli`]).
//!
//! # Core Modules
//!
//! - [`cache`] - snippet store: resolved cache + fetch coordinator
//! - [`viewer`] - single-snippet display state machine
//! - [`provider`] - aggregating prefetch and broadcast
//! - [`key`] - snippet key parsing and language detection
//! - [`config`] - host precedence chain, shared defaults, discovery
//! - [`render`] - frame types and renderer/highlighter collaborator traits
//! - [`core`] - error taxonomy and CLI error context
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use snipview::cache::SnippetStore;
//! use snipview::config::SharedDefaults;
//! use snipview::render::{Frame, Renderer};
//! use snipview::viewer::Viewer;
//!
//! struct Stdout;
//! impl Renderer for Stdout {
//!     fn render(&self, frame: &Frame) {
//!         println!("{frame:?}");
//!     }
//! }
//!
//! # async fn example() {
//! let store = Arc::new(SnippetStore::new());
//! let defaults = Arc::new(SharedDefaults::new());
//! let viewer = Arc::new(
//!     Viewer::new(store, defaults, Arc::new(Stdout))
//!         .with_host("https://snippets.example.com")
//!         .with_key("hello@hello.rs"),
//! );
//! viewer.attach().await;
//! # }
//! ```
//!
//! The store and defaults are explicit, injectable objects: construct them
//! once at process start and pass them by `Arc` to every widget. Tests
//! build isolated stores the same way.

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod key;
pub mod provider;
pub mod render;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
