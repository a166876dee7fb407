//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URI could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization of a response body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The password grant was rejected by the upstream token endpoint.
    #[error("Authentication failed ({status}): {body}")]
    Auth {
        /// HTTP status code returned by the token endpoint.
        status: u16,
        /// Raw response body, unmodified.
        body: String,
    },

    /// An operation that needs an identity ran before a session was bound.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// A required parameter was missing or malformed.
    #[error("Invalid parameter '{parameter}' for {operation}: {reason}")]
    InvalidParameter {
        /// Catalog operation name.
        operation: &'static str,
        /// Offending parameter.
        parameter: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The upstream API answered with a non-2xx status.
    #[error("Upstream error ({status}): {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body, unmodified.
        body: String,
    },

    /// No catalog operation has the requested name.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl Error {
    pub(crate) fn invalid_parameter(
        operation: &'static str,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            operation,
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Upstream { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Upstream { status: 404, .. })
    }

    /// Check if this is an authentication error, local or remote.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Auth { .. } | Error::Unauthenticated(_) | Error::Upstream { status: 401, .. }
        )
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Upstream { status, .. } if *status >= 500)
    }

    /// Check if the error was raised locally, before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated(_)
                | Error::InvalidParameter { .. }
                | Error::UnknownOperation(_)
                | Error::InvalidUrl(_)
        )
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
