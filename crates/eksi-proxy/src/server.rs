//! HTTP server for the forwarding proxy.
//!
//! Every inbound request goes through a single fallback handler. It looks up
//! the first matching route, runs the route's hooks and relays the request.
//! `OPTIONS` requests on a route that allows them are answered locally.
//! Responses to matched requests carry the CORS headers, errors included.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{ProxyConfig, ProxyRoute, find_route};
use crate::error::{ProxyError, Result};
use crate::forward::Forwarder;
use crate::hooks::{CorsHeaders, ForwardRequest, ForwardResponse};

/// Shared state for the proxy server. Immutable after startup.
struct ProxyState {
    routes: Vec<ProxyRoute>,
    forwarder: Forwarder,
}

/// The forwarding proxy server.
pub struct ProxyServer {
    config: ProxyConfig,
    state: Arc<ProxyState>,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let state = ProxyState {
            routes: config.routes.clone(),
            forwarder: Forwarder::new()?,
        };
        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handle_proxy)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the proxy server until the process exits.
    ///
    /// Failing to bind the listening address is returned as an error; errors
    /// while serving individual requests are not.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        self.log_ready(local_addr);
        axum::serve(listener, self.router()).await
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        self.log_ready(local_addr);
        tokio::spawn(async move {
            axum::serve(listener, self.router())
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }

    fn log_ready(&self, addr: SocketAddr) {
        tracing::info!(
            addr = %addr,
            routes = self.state.routes.len(),
            "> Ready on http://{}",
            addr
        );
    }
}

async fn handle_proxy(
    State(state): State<Arc<ProxyState>>,
    request: Request,
) -> std::result::Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let route = find_route(&state.routes, &parts.method, parts.uri.path()).ok_or_else(|| {
        ProxyError::NoRoute {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
        }
    })?;

    // Once a route has matched, even errors the proxy raises itself must be
    // readable cross-origin.
    match relay(&state, route, parts, body).await {
        Ok(response) => Ok(response),
        Err(e) => {
            let mut response = e.into_response();
            CorsHeaders::apply(response.headers_mut());
            Ok(response)
        }
    }
}

async fn relay(
    state: &ProxyState,
    route: &ProxyRoute,
    parts: Parts,
    body: Body,
) -> std::result::Result<Response, ProxyError> {
    let mut response = if parts.method == Method::OPTIONS {
        ForwardResponse::preflight()
    } else {
        let body = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ProxyError::InvalidRequest(format!("failed to read body: {}", e)))?;

        let mut forward = ForwardRequest {
            method: parts.method.clone(),
            path_and_query: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            headers: parts.headers,
            body,
        };
        for hook in route.request_hooks() {
            forward = hook.before_request(forward).await?;
        }

        state.forwarder.send(route, forward).await?
    };

    for hook in route.response_hooks() {
        response = hook.before_response(response).await?;
    }

    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> ProxyServer {
        let route = ProxyRoute::new("/v1/**", ["GET", "OPTIONS"], "http://127.0.0.1:9").unwrap();
        let config = ProxyConfig::new("127.0.0.1:0".parse().unwrap(), vec![route]).unwrap();
        ProxyServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let response = server()
            .router()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preflight_answered_locally() {
        let response = server()
            .router()
            .oneshot(
                axum::http::Request::builder()
                    .method("OPTIONS")
                    .uri("/v1/entry/1")
                    .header("origin", "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_default_server_builds() {
        assert!(ProxyServer::new(ProxyConfig::default()).is_ok());
    }
}
