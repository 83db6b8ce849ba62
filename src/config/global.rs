//! Discovered host configuration: environment variable and user config file.
//!
//! The lowest-priority link of the host chain. The environment variable is
//! read on every query (it is cheap and tests rely on it changing); the
//! config file is read once per [`DiscoveredHost`] instance.
//!
//! The user config file lives at `{config_dir}/snipview/config.toml`:
//!
//! ```toml
//! host = "https://snippets.example.com"
//! theme = "light"
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{HostSource, Theme};
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, HOST_ENV_VAR};

/// Contents of the user configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalConfig {
    /// Default snippet host.
    pub host: Option<String>,
    /// Theme name, parsed with [`Theme::parse`].
    pub theme: Option<String>,
}

impl GlobalConfig {
    /// Platform path of the user config file, when a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// The configured theme, if present and recognized.
    #[must_use]
    pub fn parsed_theme(&self) -> Option<Theme> {
        self.theme.as_deref().and_then(Theme::parse)
    }
}

/// Discovered host source: `SNIPVIEW_HOST`, then the user config file.
///
/// A missing or unparsable config file is not an error here - discovery
/// simply reports absence (with a warning for a file that exists but does
/// not parse) and the chain moves on.
#[derive(Debug, Default)]
pub struct DiscoveredHost {
    config_path: Option<PathBuf>,
    file_host: OnceLock<Option<String>>,
}

impl DiscoveredHost {
    /// Discovery against the platform config path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery against an explicit config file path. Used by tests and by
    /// embeddings that relocate configuration.
    #[must_use]
    pub fn with_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            file_host: OnceLock::new(),
        }
    }

    fn host_from_file(&self) -> Option<String> {
        self.file_host
            .get_or_init(|| {
                let path = self
                    .config_path
                    .clone()
                    .or_else(GlobalConfig::default_path)?;
                if !path.exists() {
                    return None;
                }
                match GlobalConfig::load_from(&path) {
                    Ok(config) => {
                        debug!(target: "config", "discovered config at {}", path.display());
                        config.host
                    }
                    Err(err) => {
                        warn!(target: "config", "ignoring config file: {err:#}");
                        None
                    }
                }
            })
            .clone()
    }
}

impl HostSource for DiscoveredHost {
    fn host(&self) -> Option<String> {
        if let Some(host) = std::env::var(HOST_ENV_VAR).ok().filter(|h| !h.is_empty()) {
            return Some(host);
        }
        self.host_from_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_host_env() {
        // SAFETY: tests mutating process env are serialized with #[serial].
        unsafe { std::env::remove_var(HOST_ENV_VAR) };
    }

    #[test]
    fn load_from_parses_host_and_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"https://cfg.example.com\"\ntheme = \"light\"\n").unwrap();

        let config = GlobalConfig::load_from(&path).unwrap();
        assert_eq!(config.host.as_deref(), Some("https://cfg.example.com"));
        assert_eq!(config.parsed_theme(), Some(Theme::Light));
    }

    #[test]
    fn load_from_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = [not toml").unwrap();
        assert!(GlobalConfig::load_from(&path).is_err());
    }

    #[test]
    #[serial]
    fn env_var_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"https://from-file\"\n").unwrap();

        // SAFETY: serialized via #[serial].
        unsafe { std::env::set_var(HOST_ENV_VAR, "https://from-env") };
        let discovered = DiscoveredHost::with_config_path(&path);
        assert_eq!(discovered.host(), Some("https://from-env".to_string()));

        clear_host_env();
        let discovered = DiscoveredHost::with_config_path(&path);
        assert_eq!(discovered.host(), Some("https://from-file".to_string()));
    }

    #[test]
    #[serial]
    fn absent_sources_report_absence() {
        clear_host_env();
        let dir = tempfile::tempdir().unwrap();
        let discovered = DiscoveredHost::with_config_path(dir.path().join("missing.toml"));
        assert_eq!(discovered.host(), None);
    }
}
