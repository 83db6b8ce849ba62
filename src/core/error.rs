//! Error handling for snipview
//!
//! The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise handling inside the library
//! 2. **User-friendly messages** with actionable suggestions at the CLI
//!
//! # Architecture
//!
//! Two main types:
//! - [`SnipviewError`] - Enumerated error types for every failure mode of a
//!   snippet resolution
//! - [`ErrorContext`] - Wrapper that adds a user-facing suggestion and
//!   optional details for CLI display
//!
//! # Error Categories
//!
//! - **Configuration**: [`SnipviewError::MissingConfiguration`] - no host or
//!   no snippet key could be resolved through the precedence chain
//! - **Fetch**: [`SnipviewError::NetworkFailure`] (non-success HTTP status)
//!   and [`SnipviewError::TransportFailure`] (connect, body, or JSON-parse
//!   failure before a usable body exists)
//! - **Lookup**: [`SnipviewError::SnippetNotFound`] - the resource resolved
//!   but does not contain the requested key
//!
//! Every variant is `Clone`: a failed fetch is shared verbatim with every
//! caller joined on the same in-flight operation, so no caller can observe a
//! different error for the same attempt.
//!
//! Rendering degradation (an absent highlighter or an unknown language tag)
//! is deliberately *not* represented here. It is never an error; consumers
//! fall back to raw source text.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for snippet resolution.
///
/// Display output is the exact user-visible wording: viewers embed these
/// strings directly in their failure states, so the messages are part of the
/// observable contract rather than debugging aids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnipviewError {
    /// No host or no snippet key was available at resolution time.
    ///
    /// Host resolution walks the full precedence chain (explicit, provider,
    /// shared default, discovered) before reporting this; there is no
    /// built-in fallback host.
    #[error("Missing snippet or snippet-host")]
    MissingConfiguration,

    /// The snippet host answered with a non-success HTTP status.
    #[error("snippet host responded with HTTP {status}")]
    NetworkFailure {
        /// Status code of the response (e.g. 404, 500).
        status: u16,
    },

    /// The request failed before a usable body was available.
    ///
    /// Covers connection errors, interrupted bodies, and JSON-parse
    /// failures. The cause is carried as text so the error stays `Clone`
    /// across every joined caller.
    #[error("{cause}")]
    TransportFailure {
        /// Human-readable description of the underlying failure.
        cause: String,
    },

    /// The resource resolved successfully but has no entry for the key.
    #[error("Snippet \"{key}\" not found")]
    SnippetNotFound {
        /// The snippet key that was looked up.
        key: String,
    },
}

/// Wrapper that pairs an error with a user-facing suggestion.
///
/// Used at the CLI boundary to print actionable guidance alongside the
/// failure itself. Library code never constructs one.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error being reported.
    pub error: anyhow::Error,
    /// A short, actionable suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Additional background details, shown dimmed.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error with no suggestion or details.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attaches an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches background details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        if let Some(details) = &self.details {
            eprintln!("  {}", details.dimmed());
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {} {}", "hint:".cyan().bold(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\n  {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  hint: {suggestion}")?;
        }
        Ok(())
    }
}

/// Converts any error into an [`ErrorContext`] with a suggestion matched to
/// the failure mode.
///
/// Downcasts to [`SnipviewError`] where possible; unknown errors pass
/// through without a suggestion.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<SnipviewError>() {
        Some(SnipviewError::MissingConfiguration) => Some(format!(
            "Pass --host <url>, or set {} / the `host` entry of your snipview config file",
            crate::constants::HOST_ENV_VAR
        )),
        Some(SnipviewError::NetworkFailure { status: 404 }) => Some(format!(
            "Check that the host serves {}",
            crate::constants::SNIPPETS_RESOURCE_PATH
        )),
        Some(SnipviewError::NetworkFailure { .. }) => {
            Some("The snippet host is reachable but unhealthy; try again later".to_string())
        }
        Some(SnipviewError::TransportFailure { .. }) => {
            Some("Check your network connection and the host URL".to_string())
        }
        Some(SnipviewError::SnippetNotFound { .. }) => {
            Some("Run `snipview list` to see the keys the host provides".to_string())
        }
        None => None,
    };
    let ctx = ErrorContext::new(error);
    match suggestion {
        Some(s) => ctx.with_suggestion(s),
        None => ctx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_are_the_user_visible_contract() {
        assert_eq!(
            SnipviewError::MissingConfiguration.to_string(),
            "Missing snippet or snippet-host"
        );
        assert_eq!(
            SnipviewError::NetworkFailure { status: 404 }.to_string(),
            "snippet host responded with HTTP 404"
        );
        assert_eq!(
            SnipviewError::SnippetNotFound {
                key: "b@b.ts".to_string()
            }
            .to_string(),
            "Snippet \"b@b.ts\" not found"
        );
        assert_eq!(
            SnipviewError::TransportFailure {
                cause: "connection refused".to_string()
            }
            .to_string(),
            "connection refused"
        );
    }

    #[test]
    fn user_friendly_error_attaches_matching_suggestion() {
        let ctx = user_friendly_error(SnipviewError::MissingConfiguration.into());
        assert!(ctx.suggestion.as_deref().unwrap().contains("--host"));

        let ctx = user_friendly_error(
            SnipviewError::SnippetNotFound {
                key: "x".to_string(),
            }
            .into(),
        );
        assert!(ctx.suggestion.as_deref().unwrap().contains("snipview list"));

        let ctx = user_friendly_error(anyhow::anyhow!("something else"));
        assert!(ctx.suggestion.is_none());
    }

    #[test]
    fn error_context_display_includes_suggestion_and_details() {
        let ctx = ErrorContext::new(SnipviewError::MissingConfiguration)
            .with_suggestion("set a host")
            .with_details("no host source produced a value");
        let rendered = ctx.to_string();
        assert!(rendered.contains("Missing snippet or snippet-host"));
        assert!(rendered.contains("hint: set a host"));
        assert!(rendered.contains("no host source produced a value"));
    }
}
