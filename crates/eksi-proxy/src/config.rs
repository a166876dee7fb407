//! Proxy configuration and route table.
//!
//! Routes are tried in declaration order and the first one whose pathname
//! glob and method set both match wins.
//!
//! Pathname globs use `glob` syntax with literal separators: `*` matches
//! within one path segment, `**` matches any number of segments.
//!
//! ```toml
//! port = 9000
//!
//! [[routes]]
//! pathname = "/**"
//! methods = ["GET", "POST", "OPTIONS"]
//! destination = "https://api.eksisozluk.com/"
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::Method;
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use url::Url;

use crate::error::{ProxyError, Result};
use crate::hooks::{CorsHeaders, RequestHook, ResponseHook};

/// Port used when neither the command line, `PORT`, nor the config file set one.
pub const DEFAULT_PORT: u16 = 9000;

/// Upstream API origin.
pub const DEFAULT_DESTINATION: &str = "https://api.eksisozluk.com/";

const DEFAULT_PATHNAME: &str = "/**";

const DEFAULT_METHODS: &[&str] = &["GET", "POST", "OPTIONS"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

// ─────────────────────────────────────────────────────────────────────────────
// Routes
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the route table.
///
/// Every route starts with the [`CorsHeaders`] response hook; hooks added
/// later run after it.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pathname: String,
    pattern: Pattern,
    methods: Vec<Method>,
    destination: Url,
    request_hooks: Vec<Arc<dyn RequestHook>>,
    response_hooks: Vec<Arc<dyn ResponseHook>>,
}

impl ProxyRoute {
    /// Create a route, validating the glob, methods and destination.
    pub fn new<M>(pathname: &str, methods: M, destination: &str) -> Result<Self>
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        let pattern = Pattern::new(pathname).map_err(|e| {
            ProxyError::Config(format!("invalid pathname glob '{}': {}", pathname, e))
        })?;

        let methods = methods
            .into_iter()
            .map(|m| parse_method(m.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if methods.is_empty() {
            return Err(ProxyError::Config(format!(
                "route '{}' allows no methods",
                pathname
            )));
        }

        Ok(Self {
            pathname: pathname.to_string(),
            pattern,
            methods,
            destination: parse_destination(destination)?,
            request_hooks: Vec::new(),
            response_hooks: vec![Arc::new(CorsHeaders)],
        })
    }

    /// Append a hook run before the request is forwarded.
    pub fn with_request_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.request_hooks.push(Arc::new(hook));
        self
    }

    /// Append a hook run on the response before it is returned.
    pub fn with_response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hooks.push(Arc::new(hook));
        self
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.allows(method) && self.pattern.matches_with(path, MATCH_OPTIONS)
    }

    pub(crate) fn request_hooks(&self) -> &[Arc<dyn RequestHook>] {
        &self.request_hooks
    }

    pub(crate) fn response_hooks(&self) -> &[Arc<dyn ResponseHook>] {
        &self.response_hooks
    }

    /// Upstream URL for an inbound path: only the origin is substituted.
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.destination.as_str().trim_end_matches('/'),
            path_and_query.trim_start_matches('/')
        )
    }
}

fn parse_method(raw: &str) -> Result<Method> {
    let method = match raw.trim().to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "PATCH" => Method::PATCH,
        "DELETE" => Method::DELETE,
        "OPTIONS" => Method::OPTIONS,
        _ => {
            return Err(ProxyError::Config(format!(
                "unsupported HTTP method '{}'",
                raw
            )));
        }
    };
    Ok(method)
}

fn parse_destination(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ProxyError::Config(format!("invalid destination '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ProxyError::Config(format!(
            "destination '{}' must be an http(s) origin",
            raw
        )));
    }
    Ok(url)
}

/// First route matching `method` and `path`.
pub fn find_route<'a>(
    routes: &'a [ProxyRoute],
    method: &Method,
    path: &str,
) -> Option<&'a ProxyRoute> {
    routes.iter().find(|route| route.matches(method, path))
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the proxy server.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub routes: Vec<ProxyRoute>,
}

impl Default for ProxyConfig {
    /// Every path, `GET`/`POST`/`OPTIONS`, to the public API host.
    fn default() -> Self {
        let route = ProxyRoute::new(DEFAULT_PATHNAME, DEFAULT_METHODS, DEFAULT_DESTINATION)
            .expect("default route is valid");
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            routes: vec![route],
        }
    }
}

impl ProxyConfig {
    /// Create a config with an explicit route table.
    pub fn new(bind_addr: SocketAddr, routes: Vec<ProxyRoute>) -> Result<Self> {
        if routes.is_empty() {
            return Err(ProxyError::Config("at least one route is required".to_string()));
        }
        Ok(Self { bind_addr, routes })
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse a TOML route table. The port, if any, is returned separately so
    /// the caller can apply its own precedence.
    pub fn from_toml_str(content: &str) -> Result<(Option<u16>, Vec<ProxyRoute>)> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| ProxyError::Config(format!("failed to parse config: {}", e)))?;

        let routes = file
            .routes
            .iter()
            .map(|r| ProxyRoute::new(&r.pathname, &r.methods, &r.destination))
            .collect::<Result<Vec<_>>>()?;
        if routes.is_empty() {
            return Err(ProxyError::Config("at least one route is required".to_string()));
        }

        Ok((file.port, routes))
    }

    /// Read and parse a TOML route table from disk.
    pub fn from_file(path: &Path) -> Result<(Option<u16>, Vec<ProxyRoute>)> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default = "default_route_configs")]
    routes: Vec<RouteConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteConfig {
    pathname: String,
    #[serde(default = "default_methods")]
    methods: Vec<String>,
    #[serde(default = "default_destination")]
    destination: String,
}

fn default_methods() -> Vec<String> {
    DEFAULT_METHODS.iter().map(|m| m.to_string()).collect()
}

fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

fn default_route_configs() -> Vec<RouteConfig> {
    vec![RouteConfig {
        pathname: DEFAULT_PATHNAME.to_string(),
        methods: default_methods(),
        destination: default_destination(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(pathname: &str, methods: &[&str]) -> ProxyRoute {
        ProxyRoute::new(pathname, methods, "https://api.example.com/").unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.routes.len(), 1);

        let route = &config.routes[0];
        assert_eq!(route.pathname(), "/**");
        assert_eq!(route.methods(), &[Method::GET, Method::POST, Method::OPTIONS]);
        assert_eq!(route.destination().as_str(), DEFAULT_DESTINATION);
        assert_eq!(route.response_hooks().len(), 1);
    }

    #[test]
    fn test_double_star_matches_nested_paths() {
        let route = route("/**", &["GET"]);
        assert!(route.matches(&Method::GET, "/token"));
        assert!(route.matches(&Method::GET, "/v1/user/foo/entries"));
        assert!(!route.matches(&Method::POST, "/token"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let route = route("/v1/entry/*", &["GET"]);
        assert!(route.matches(&Method::GET, "/v1/entry/123"));
        assert!(!route.matches(&Method::GET, "/v1/entry/123/votes"));
        assert!(!route.matches(&Method::GET, "/v1/topic/1"));
    }

    #[test]
    fn test_first_match_wins() {
        let routes = vec![
            ProxyRoute::new("/v1/**", ["GET"], "https://first.example.com/").unwrap(),
            ProxyRoute::new("/**", ["GET"], "https://second.example.com/").unwrap(),
        ];

        let hit = find_route(&routes, &Method::GET, "/v1/entry/1").unwrap();
        assert_eq!(hit.destination().host_str(), Some("first.example.com"));

        let hit = find_route(&routes, &Method::GET, "/token").unwrap();
        assert_eq!(hit.destination().host_str(), Some("second.example.com"));

        assert!(find_route(&routes, &Method::DELETE, "/token").is_none());
    }

    #[test]
    fn test_target_url_substitutes_origin_only() {
        let route = route("/**", &["GET"]);
        assert_eq!(
            route.target_url("/v1/entry/1?p=2"),
            "https://api.example.com/v1/entry/1?p=2"
        );

        let prefixed = ProxyRoute::new("/**", ["GET"], "http://localhost:8080").unwrap();
        assert_eq!(prefixed.target_url("/token"), "http://localhost:8080/token");
    }

    #[test]
    fn test_methods_are_case_insensitive() {
        let route = route("/**", &["get", " Options "]);
        assert_eq!(route.methods(), &[Method::GET, Method::OPTIONS]);
    }

    #[test]
    fn test_invalid_routes_rejected() {
        assert!(ProxyRoute::new("/[", ["GET"], DEFAULT_DESTINATION).is_err());
        assert!(ProxyRoute::new("/**", ["FETCH"], DEFAULT_DESTINATION).is_err());
        assert!(ProxyRoute::new("/**", Vec::<String>::new(), DEFAULT_DESTINATION).is_err());
        assert!(ProxyRoute::new("/**", ["GET"], "ftp://example.com/").is_err());
        assert!(ProxyRoute::new("/**", ["GET"], "not a url").is_err());
    }

    #[test]
    fn test_from_toml() {
        let (port, routes) = ProxyConfig::from_toml_str(
            r#"
            port = 8081

            [[routes]]
            pathname = "/token"
            methods = ["POST", "OPTIONS"]
            destination = "http://127.0.0.1:3000"

            [[routes]]
            pathname = "/v1/**"
            "#,
        )
        .unwrap();

        assert_eq!(port, Some(8081));
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].methods(), &[Method::POST, Method::OPTIONS]);
        assert_eq!(routes[1].methods(), &[Method::GET, Method::POST, Method::OPTIONS]);
        assert_eq!(routes[1].destination().as_str(), DEFAULT_DESTINATION);
    }

    #[test]
    fn test_from_toml_defaults_to_single_route() {
        let (port, routes) = ProxyConfig::from_toml_str("").unwrap();
        assert_eq!(port, None);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].pathname(), "/**");
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        assert!(ProxyConfig::from_toml_str("routes = []").is_err());
        assert!(ProxyConfig::from_toml_str("[[routes]]\npathname = \"/**\"\ncors = false").is_err());
        assert!(
            ProxyConfig::from_toml_str("[[routes]]\npathname = \"/**\"\nmethods = [\"BREW\"]")
                .is_err()
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(&path, "[[routes]]\npathname = \"/**\"\n").unwrap();

        let (_, routes) = ProxyConfig::from_file(&path).unwrap();
        assert_eq!(routes.len(), 1);

        assert!(ProxyConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_new_requires_routes() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        assert!(ProxyConfig::new(addr, Vec::new()).is_err());
    }
}
