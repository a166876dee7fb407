//! Upstream forwarding.
//!
//! The method, path, query, body and end-to-end headers are relayed as
//! received. `Host` and connection-level framing headers are dropped and
//! recomputed by the outbound connection. Redirects are returned to the
//! caller, not followed.

use axum::body::Body;
use axum::http::header::{
    CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::{HeaderMap, HeaderName};
use futures::StreamExt;
use reqwest::redirect::Policy;

use crate::config::ProxyRoute;
use crate::error::{ProxyError, Result};
use crate::hooks::{ForwardRequest, ForwardResponse};

/// Drop headers that describe a single hop rather than the message, including
/// any extra names listed in `Connection`.
fn strip_hop_headers(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }

    headers.remove(CONNECTION);
    headers.remove(TE);
    headers.remove(TRAILER);
    headers.remove(TRANSFER_ENCODING);
    headers.remove(UPGRADE);
    headers.remove(PROXY_AUTHORIZATION);
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
    headers.remove(CONTENT_LENGTH);
}

/// Sends requests to a route's destination.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Relay `request` to `route`'s destination and stream back the answer.
    ///
    /// Any upstream status, including 4xx/5xx, is a successful relay. Only
    /// transport failures are errors.
    pub async fn send(
        &self,
        route: &ProxyRoute,
        request: ForwardRequest,
    ) -> Result<ForwardResponse> {
        let url = route.target_url(&request.path_and_query);
        tracing::debug!(method = %request.method, url = %url, "Forwarding request");

        let mut headers = request.headers;
        headers.remove(HOST);
        strip_hop_headers(&mut headers);

        let mut outbound = self.client.request(request.method, &url).headers(headers);
        if !request.body.is_empty() {
            outbound = outbound.body(request.body);
        }

        let response = outbound
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(format!("failed to reach {}: {}", url, e)))?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_headers(&mut headers);
        tracing::debug!(status = status.as_u16(), url = %url, "Upstream responded");

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));

        Ok(ForwardResponse {
            status,
            headers,
            body: Body::from_stream(stream),
        })
    }
}
