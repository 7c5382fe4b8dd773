//! Error types for client operations.
//!
//! This module defines structured errors for every operation the client
//! exposes, providing context-rich error messages for debugging and
//! user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during upload, link resolution, or download.
#[derive(Debug, Error)]
pub enum Error {
    /// The local upload path does not point at an existing regular file.
    #[error("invalid path detected at {path}")]
    FileNotFound {
        /// The path that failed the precondition check.
        path: PathBuf,
    },

    /// The landing page contained no `download-url` anchor.
    ///
    /// Raised when the vendor page format changed, the file was removed,
    /// or an error page was returned instead of a landing page.
    #[error("no direct download link found in page at {url}")]
    LinkNotFound {
        /// The page URL whose markup lacked the expected anchor.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The upload response was not JSON, or a required field for the
    /// active status branch was missing.
    #[error("malformed upload response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response body.
        reason: String,
    },

    /// An operation was attempted after the session was closed.
    #[error("session is closed; create a new client for further requests")]
    ClosedSession,

    /// The provided page URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// An asynchronous download was cancelled before completion.
    ///
    /// The partial file at the destination has already been removed by
    /// the time this error is observed.
    #[error("download to {path} was cancelled")]
    Cancelled {
        /// The destination path of the cancelled transfer.
        path: PathBuf,
    },
}

impl Error {
    /// Creates a file-not-found precondition error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a link-not-found error for a landing page.
    pub fn link_not_found(url: impl Into<String>) -> Self {
        Self::LinkNotFound { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Maps a transport failure to [`Error::Timeout`] or [`Error::Network`].
    ///
    /// All reqwest send/read failures funnel through here so timeouts are
    /// consistently distinguishable from other transport errors.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed_response(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a cancelled-download error.
    pub fn cancelled(path: impl Into<PathBuf>) -> Self {
        Self::Cancelled { path: path.into() }
    }

    /// Returns true for transport-level failures (DNS, connection, TLS,
    /// timeout, non-2xx status).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::HttpStatus { .. } | Self::Timeout { .. }
        )
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or `From<std::io::Error>`
// because our error variants require context (url, path) that the source errors
// don't provide. The helper constructor methods (network(), io(), etc.) are the
// correct pattern here as they allow callers to provide necessary context.
