//! Configuration resolution for viewers and providers.
//!
//! Host configuration is resolved through an explicit ordered chain of
//! sources, queried highest priority first:
//!
//! 1. value explicitly set on the widget itself;
//! 2. value propagated by an ancestor [`Provider`](crate::provider::Provider);
//! 3. the ambient [`SharedDefaults`], settable programmatically;
//! 4. discovered configuration ([`global::DiscoveredHost`]): the
//!    `SNIPVIEW_HOST` environment variable, then the user config file.
//!
//! There is no built-in fallback host - exhausting the chain is a
//! configuration error. The visual [`Theme`] *does* have a built-in
//! fallback via `Theme::default()`.
//!
//! The snippet key is explicit-only widget configuration and does not go
//! through the chain.

pub mod global;

use std::sync::RwLock;

/// One link in the host-resolution precedence chain.
///
/// Each source either produces a host or reports absence; the chain takes
/// the first present value.
pub trait HostSource {
    /// The host this source currently provides, if any.
    fn host(&self) -> Option<String>;
}

/// Queries `sources` in priority order and returns the first present host.
pub fn first_host(sources: &[&dyn HostSource]) -> Option<String> {
    sources.iter().find_map(|source| source.host())
}

impl HostSource for Option<String> {
    fn host(&self) -> Option<String> {
        self.clone()
    }
}

/// Visual theme for rendering surfaces.
///
/// Unlike the host, the theme always resolves: the built-in fallback is
/// `Theme::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Dark terminal/page backgrounds.
    #[default]
    Dark,
    /// Light terminal/page backgrounds.
    Light,
}

impl Theme {
    /// Parses a configured theme name; unknown names report absence so the
    /// caller can continue down the chain.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

/// Ambient defaults shared by every widget wired to the same handle.
///
/// An injectable object, not a global: the embedding application constructs
/// one alongside the [`SnippetStore`](crate::cache::SnippetStore) and passes
/// it to each widget. Setting a default host here affects every widget that
/// has no higher-priority source for it.
#[derive(Debug, Default)]
pub struct SharedDefaults {
    host: RwLock<Option<String>>,
    theme: RwLock<Option<Theme>>,
}

impl SharedDefaults {
    /// Creates an empty set of defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ambient default host.
    pub fn set_host(&self, host: impl Into<String>) {
        *self.host.write().expect("defaults lock poisoned") = Some(host.into());
    }

    /// Clears the ambient default host.
    pub fn clear_host(&self) {
        *self.host.write().expect("defaults lock poisoned") = None;
    }

    /// Sets the ambient default theme.
    pub fn set_theme(&self, theme: Theme) {
        *self.theme.write().expect("defaults lock poisoned") = Some(theme);
    }

    /// The ambient default theme, if one was set.
    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        *self.theme.read().expect("defaults lock poisoned")
    }
}

impl HostSource for SharedDefaults {
    fn host(&self) -> Option<String> {
        self.host.read().expect("defaults lock poisoned").clone()
    }
}
