//! Request and response hooks.
//!
//! Each route carries an ordered list of [`RequestHook`]s, run before the
//! request is sent upstream, and [`ResponseHook`]s, run on the response
//! before it is returned. Every hook sees the output of the previous one. The
//! first error stops the chain and fails that request alone.

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::HookError;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS, PUT, PATCH, DELETE";
pub const ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Authorization";
pub const ALLOW_CREDENTIALS: &str = "true";

/// Inbound request on its way upstream.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Inbound path and query, e.g. `/v1/entry/1?p=2`.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Upstream (or locally generated) response on its way back to the caller.
#[derive(Debug)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl ForwardResponse {
    /// Empty success answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[async_trait]
pub trait RequestHook: Send + Sync + std::fmt::Debug {
    async fn before_request(
        &self,
        request: ForwardRequest,
    ) -> std::result::Result<ForwardRequest, HookError>;
}

#[async_trait]
pub trait ResponseHook: Send + Sync + std::fmt::Debug {
    async fn before_response(
        &self,
        response: ForwardResponse,
    ) -> std::result::Result<ForwardResponse, HookError>;
}

/// Adds the fixed allow-all CORS headers, whatever the request's `Origin`.
///
/// The policy is a wildcard origin combined with
/// `Access-Control-Allow-Credentials: true`. Upstream values for the same
/// headers are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsHeaders;

impl CorsHeaders {
    pub fn apply(headers: &mut HeaderMap) {
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(ALLOW_CREDENTIALS),
        );
    }
}

#[async_trait]
impl ResponseHook for CorsHeaders {
    async fn before_response(
        &self,
        mut response: ForwardResponse,
    ) -> std::result::Result<ForwardResponse, HookError> {
        Self::apply(&mut response.headers);
        Ok(response)
    }
}
