//! Global constants used throughout the snipview codebase.
//!
//! This module contains the resource path, default language tag, and the
//! names used for discovered configuration. Defining them centrally keeps
//! the wire contract and configuration surface discoverable in one place.

/// Path of the shared snippet resource, relative to the normalized host.
///
/// Every snippet host serves a single JSON object at this path, mapping
/// snippet keys to source text. The leading separator is part of the
/// constant so that host normalization only has to strip a trailing one.
pub const SNIPPETS_RESOURCE_PATH: &str = "/snippets.json";

/// Language tag used when a snippet's file extension is unmapped or absent.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Environment variable consulted as discovered host configuration.
///
/// Sits below the programmatic shared default in the precedence chain;
/// see [`crate::config`] for the full ordering.
pub const HOST_ENV_VAR: &str = "SNIPVIEW_HOST";

/// Directory name under the platform config dir for the user config file.
pub const CONFIG_DIR_NAME: &str = "snipview";

/// File name of the user configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
