//! Error types for the forwarding proxy.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Failure raised by a request or response hook.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur while proxying one request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No configured route matches the request's path and method.
    #[error("No route for {method} {path}")]
    NoRoute { method: String, path: String },

    /// A hook rejected the request or response.
    #[error("Hook failed: {0}")]
    Hook(#[from] HookError),

    /// The upstream could not be reached or its response could not be read.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The inbound request could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid proxy configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Upstream(e.to_string())
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoRoute { .. } => StatusCode::NOT_FOUND,
            ProxyError::Hook(_) | ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ProxyError::NoRoute { .. } => "not_found",
            ProxyError::Hook(_) => "hook_error",
            ProxyError::Upstream(_) => "upstream_error",
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::Config(_) => "config_error",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Proxy request failed");
        } else {
            tracing::debug!(error = %self, "Proxy request rejected");
        }

        let body = serde_json::json!({
            "type": "error",
            "error": {
                "type": self.error_type(),
                "message": self.to_string()
            }
        });

        (status, Json(body)).into_response()
    }
}
