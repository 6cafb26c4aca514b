//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the reconciliation engine.
///
/// The per-file variants (`Parse` through `AmbiguousMatch`) are recoverable:
/// the session logs them against the file that produced them and moves on.
/// `Transient` is retried with bounded backoff before being demoted to a
/// per-file failure. `Authorization` and `ServiceUnavailable` abort the
/// whole session.
#[derive(Error, Debug)]
pub enum Error {
    // Per-file, recoverable
    #[error("Failed to parse NFO: {0}")]
    Parse(String),

    #[error("Unsupported NFO root element <{0}>")]
    UnsupportedDocument(String),

    #[error("Cannot resolve owning show: {0}")]
    HierarchyResolution(String),

    #[error("No library match: {0}")]
    NotFound(String),

    #[error("Ambiguous library match for '{title}': {candidates} items share the title with no disambiguating year")]
    AmbiguousMatch { title: String, candidates: usize },

    // Retried, then demoted to per-file failure
    #[error("Transient library service error: {0}")]
    Transient(String),

    // Session-fatal
    #[error("Library service rejected authorization: {0}")]
    Authorization(String),

    #[error("Library service unavailable: {0}")]
    ServiceUnavailable(String),

    // Configuration errors
    #[error("PLEX_URL not configured. Set the PLEX_URL environment variable")]
    ServerUrlMissing,

    #[error("PLEX_TOKEN not configured. Set the PLEX_TOKEN environment variable")]
    TokenMissing,

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error should abort the whole session rather than just
    /// the current file.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Error::Authorization(_) | Error::ServiceUnavailable(_))
    }

    /// Whether this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}
