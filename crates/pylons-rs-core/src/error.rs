//! Core error type for the pylons-rs framework.
//!
//! Every failure raised while an application is being configured (bad
//! predicates, missing routes, unresolvable handler names, malformed settings)
//! surfaces as a [`PylonsError`]. Registration failures always use the
//! [`PylonsError::ConfigurationError`] variant.

use thiserror::Error;

/// The primary error type for the pylons-rs framework.
///
/// Each variant maps to an HTTP status code via [`PylonsError::status_code`],
/// so request-time failures can be rendered directly.
#[derive(Error, Debug)]
pub enum PylonsError {
    // ── Configuration ────────────────────────────────────────────────

    /// A registration call received invalid input.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The framework is improperly configured (e.g. a required setting is missing).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Dispatch ─────────────────────────────────────────────────────

    /// No route, view, or action matched a request.
    #[error("Not found: {0}")]
    NotFound(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PylonsError {
    /// Shorthand for building a [`PylonsError::ConfigurationError`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    /// Returns `true` if this is a configuration error.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }

    /// Returns the HTTP status code associated with this error.
    ///
    /// - `NotFound` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, PylonsError>`.
pub type PylonsResult<T> = Result<T, PylonsError>;
