//! Core types and error handling for snipview.
//!
//! Hosts the error taxonomy shared by every layer of the crate. The store,
//! viewer, and provider all speak [`SnipviewError`]; the CLI converts it to
//! an [`ErrorContext`] for display.

pub mod error;

pub use error::{ErrorContext, SnipviewError, user_friendly_error};
