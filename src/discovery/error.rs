//! Error types for signposting discovery over HTTP.

use thiserror::Error;

use crate::parser::LinksetError;

/// Errors that stop a discovery request.
///
/// Non-fatal conditions (`410 Gone`, `203`, a broken linkset followed from a
/// landing page) are reported as warnings on the result instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The URL could not be parsed or is not HTTP(S).
    #[error("invalid URL: {url}\n  Suggestion: Use an absolute http:// or https:// URL")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// Network-level failure (DNS, connection refused, TLS, body read).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("timeout fetching {url}\n  Suggestion: Increase --read-timeout or try again later")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// 4xx/5xx response other than `410 Gone`.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response is not of a type this request can read.
    #[error("unrecognized content type '{content_type}' from {url}, expected {expected}")]
    UnrecognizedContentType {
        /// The URL that was fetched.
        url: String,
        /// The `Content-Type` received, or empty.
        content_type: String,
        /// What was expected, e.g. `text/html`.
        expected: &'static str,
    },

    /// A linkset document fetched directly could not be parsed.
    #[error("malformed linkset at {url}: {source}")]
    Linkset {
        /// The linkset URL.
        url: String,
        /// The document error.
        #[source]
        source: LinksetError,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },
}

impl DiscoveryError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network or timeout error from a client error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an unrecognized content type error.
    pub fn unrecognized_content_type(
        url: impl Into<String>,
        content_type: Option<&str>,
        expected: &'static str,
    ) -> Self {
        Self::UnrecognizedContentType {
            url: url.into(),
            content_type: content_type.unwrap_or_default().to_string(),
            expected,
        }
    }

    /// Creates a linkset document error.
    pub fn linkset(url: impl Into<String>, source: LinksetError) -> Self {
        Self::Linkset {
            url: url.into(),
            source,
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }
}
