//! Endpoint catalog.
//!
//! Every upstream operation is a static [`EndpointDescriptor`]. Turning a
//! descriptor plus [`Params`] into a [`PreparedRequest`] is a pure function of
//! its inputs, so request construction is testable without a network.
//!
//! Path templates are `/`-separated; a segment written as `{name}` is a
//! placeholder. Two placeholders are filled from the client rather than the
//! caller: `{version}` (the configured API version) and `{me}` (the nick of
//! the bound session).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::session::bearer;

/// Pagination parameter name.
pub const PAGE_PARAM: &str = "p";

const PAGED: &[(&str, &str)] = &[(PAGE_PARAM, "1")];

/// HTTP method of a catalog operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Value of a body field the caller can never override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedValue {
    Literal(&'static str),
    ClientSecret,
}

/// Static description of one upstream operation.
#[derive(Debug)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path_template: &'static str,
    pub requires_auth: bool,
    /// Applied first; any caller value with the same key replaces it.
    pub default_params: &'static [(&'static str, &'static str)],
    /// Required form fields for `POST` operations, in wire order.
    pub body_params: &'static [&'static str],
    /// Form fields appended last, replacing caller values with the same key.
    pub fixed_params: &'static [(&'static str, FixedValue)],
    pub summary: &'static str,
}

impl EndpointDescriptor {
    /// Caller-supplied path placeholders, in template order.
    pub fn path_params(&self) -> impl Iterator<Item = &'static str> {
        self.path_template
            .split('/')
            .filter_map(placeholder)
            .filter(|name| !matches!(*name, "version" | "me"))
    }

    /// Whether the path is built from the bound session's nick.
    pub fn uses_session_nick(&self) -> bool {
        self.path_template.split('/').any(|s| placeholder(s) == Some("me"))
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

macro_rules! endpoints {
    ($(
        $variant:ident => $static_name:ident {
            name: $name:literal,
            method: $method:ident,
            path: $path:literal,
            auth: $auth:literal,
            defaults: $defaults:expr,
            body: $body:expr,
            fixed: $fixed:expr,
            summary: $summary:literal $(,)?
        }
    ),* $(,)?) => {
        /// Named catalog operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Endpoint {
            $($variant,)*
        }

        $(
            static $static_name: EndpointDescriptor = EndpointDescriptor {
                name: $name,
                method: HttpMethod::$method,
                path_template: $path,
                requires_auth: $auth,
                default_params: $defaults,
                body_params: $body,
                fixed_params: $fixed,
                summary: $summary,
            };
        )*

        impl Endpoint {
            /// Every operation, in catalog order.
            pub const ALL: &'static [Endpoint] = &[$(Endpoint::$variant,)*];

            pub fn descriptor(self) -> &'static EndpointDescriptor {
                match self {
                    $(Endpoint::$variant => &$static_name,)*
                }
            }
        }
    };
}

endpoints! {
    Token => TOKEN {
        name: "token", method: Post, path: "token", auth: false,
        defaults: &[], body: &["username", "password"],
        fixed: &[("grant_type", FixedValue::Literal("password")), ("client_secret", FixedValue::ClientSecret)],
        summary: "Exchange username and password for a bearer token",
    },
    SelfProfile => SELF_PROFILE {
        name: "self", method: Get, path: "{version}/account/me", auth: true,
        defaults: &[], body: &[], fixed: &[],
        summary: "Profile of the token's owner",
    },
    User => USER {
        name: "user", method: Get, path: "{version}/user/{nick}", auth: true,
        defaults: &[], body: &[], fixed: &[],
        summary: "Profile of a user",
    },
    Me => ME {
        name: "me", method: Get, path: "{version}/user/{me}", auth: true,
        defaults: &[], body: &[], fixed: &[],
        summary: "Profile of the authenticated user",
    },
    UserEntries => USER_ENTRIES {
        name: "user_entries", method: Get, path: "{version}/user/{nick}/entries", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Entries written by a user",
    },
    MyEntries => MY_ENTRIES {
        name: "my_entries", method: Get, path: "{version}/user/{me}/entries", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Entries written by the authenticated user",
    },
    UserFavorites => USER_FAVORITES {
        name: "user_favorites", method: Get, path: "{version}/user/{nick}/favorited", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Entries favorited by a user",
    },
    Entry => ENTRY {
        name: "entry", method: Get, path: "{version}/entry/{id}", auth: true,
        defaults: &[], body: &[], fixed: &[],
        summary: "A single entry",
    },
    Topic => TOPIC {
        name: "topic", method: Get, path: "{version}/topic/{id}", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Entries of a topic",
    },
    TopicPopular => TOPIC_POPULAR {
        name: "topic_popular", method: Get, path: "{version}/topic/{id}/popular", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Popular entries of a topic",
    },
    FeedPopular => FEED_POPULAR {
        name: "feed_popular", method: Get, path: "{version}/index/popular", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Popular topics feed",
    },
    FeedToday => FEED_TODAY {
        name: "feed_today", method: Get, path: "{version}/index/today", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Today's topics feed",
    },
    FeedDebe => FEED_DEBE {
        name: "feed_debe", method: Get, path: "{version}/index/debe", auth: true,
        defaults: &[], body: &[], fixed: &[],
        summary: "Yesterday's best entries",
    },
    Search => SEARCH {
        name: "search", method: Get, path: "{version}/index/search/{keywords}", auth: true,
        defaults: PAGED, body: &[], fixed: &[],
        summary: "Search topics",
    },
    Follow => FOLLOW {
        name: "follow", method: Post, path: "{version}/user/follow", auth: true,
        defaults: &[], body: &["nick"], fixed: &[],
        summary: "Follow a user",
    },
    Unfollow => UNFOLLOW {
        name: "unfollow", method: Post, path: "{version}/user/unfollow", auth: true,
        defaults: &[], body: &["nick"], fixed: &[],
        summary: "Stop following a user",
    },
    Block => BLOCK {
        name: "block", method: Post, path: "{version}/user/block", auth: true,
        defaults: &[], body: &["nick"], fixed: &[],
        summary: "Block a user",
    },
    Unblock => UNBLOCK {
        name: "unblock", method: Post, path: "{version}/user/unblock", auth: true,
        defaults: &[], body: &["nick"], fixed: &[],
        summary: "Unblock a user",
    },
    Vote => VOTE {
        name: "vote", method: Post, path: "{version}/entry/vote", auth: true,
        defaults: &[], body: &["id", "rate"], fixed: &[],
        summary: "Vote an entry up (rate=1) or down (rate=-1)",
    },
    Favorite => FAVORITE {
        name: "favorite", method: Post, path: "{version}/entry/favorite", auth: true,
        defaults: &[], body: &["id"], fixed: &[],
        summary: "Add an entry to favorites",
    },
    Unfavorite => UNFAVORITE {
        name: "unfavorite", method: Post, path: "{version}/entry/unfavorite", auth: true,
        defaults: &[], body: &["id"], fixed: &[],
        summary: "Remove an entry from favorites",
    },
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Build a transport-ready request.
    ///
    /// Parameters named by a path placeholder fill the path. Parameters named
    /// in `body_params` go to the form body. Anything else goes to the query
    /// string for `GET` and to the form body for `POST`.
    pub fn build(self, params: &Params, ctx: &RequestContext<'_>) -> Result<PreparedRequest> {
        let descriptor = self.descriptor();
        let operation = descriptor.name;

        let authorization = if descriptor.requires_auth {
            let token = ctx.access_token.ok_or_else(|| {
                Error::Unauthenticated(format!("'{}' requires an authenticated session", operation))
            })?;
            Some(bearer(token))
        } else {
            None
        };

        let mut consumed: Vec<&str> = Vec::new();
        let mut segments: Vec<String> = Vec::new();
        for segment in descriptor.path_template.split('/') {
            let value = match placeholder(segment) {
                None => segment.to_string(),
                Some("version") => ctx.api_version.trim_matches('/').to_string(),
                Some("me") => {
                    let nick = ctx.nick.ok_or_else(|| {
                        Error::Unauthenticated(format!(
                            "'{}' needs the authenticated user's nick",
                            operation
                        ))
                    })?;
                    path_value(operation, "nick", nick)?
                }
                Some(name) => {
                    let raw = params.get(name).ok_or_else(|| {
                        Error::invalid_parameter(operation, name, "required path parameter is missing")
                    })?;
                    consumed.push(name);
                    path_value(operation, name, raw)?
                }
            };
            if !value.is_empty() {
                segments.push(value);
            }
        }

        let mut body: Vec<(String, String)> = Vec::new();
        for &name in descriptor.body_params {
            let value = params
                .get(name)
                .filter(|v| name == "password" || !v.trim().is_empty())
                .ok_or_else(|| {
                    Error::invalid_parameter(operation, name, "required body parameter is missing")
                })?;
            body.push((name.to_string(), value.to_string()));
        }

        let mut extra: BTreeMap<String, String> = descriptor
            .default_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in params.iter() {
            if consumed.contains(&key) || descriptor.body_params.contains(&key) {
                continue;
            }
            extra.insert(key.to_string(), value.to_string());
        }

        let (query, mut form): (Vec<(String, String)>, Vec<(String, String)>) = match descriptor.method {
            HttpMethod::Get => (extra.into_iter().collect(), body),
            HttpMethod::Post => {
                body.extend(extra);
                (Vec::new(), body)
            }
        };

        for (name, value) in descriptor.fixed_params {
            form.retain(|(key, _)| key != name);
            let value = match value {
                FixedValue::Literal(v) => v.to_string(),
                FixedValue::ClientSecret => ctx.client_secret.to_string(),
            };
            form.push((name.to_string(), value));
        }

        Ok(PreparedRequest {
            endpoint: self,
            method: descriptor.method,
            path: segments.join("/"),
            query,
            form,
            authorization,
        })
    }
}

/// Validate and percent-encode one path segment.
fn path_value(operation: &'static str, name: &str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::invalid_parameter(operation, name, "must not be empty"));
    }
    // URL joining would resolve these against the parent path.
    if value == "." || value == ".." {
        return Err(Error::invalid_parameter(
            operation,
            name,
            format!("'{}' is not a valid path segment", value),
        ));
    }
    if name == "id" && !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_parameter(
            operation,
            name,
            format!("expected a numeric id, got '{}'", value),
        ));
    }
    Ok(urlencoding::encode(value).into_owned())
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameters and prepared requests
// ─────────────────────────────────────────────────────────────────────────────

/// Named string parameters for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Set the page number, overriding the catalog default.
    pub fn page(self, page: u32) -> Self {
        self.with(PAGE_PARAM, page)
    }

    /// Set the page number only when one is given.
    pub fn maybe_page(self, page: Option<u32>) -> Self {
        match page {
            Some(p) => self.page(p),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Client-side state a request is built against.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub api_version: &'a str,
    pub client_secret: &'a str,
    pub access_token: Option<&'a str>,
    pub nick: Option<&'a str>,
}

/// A fully built request, relative to the client's base URI.
#[derive(Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub endpoint: Endpoint,
    pub method: HttpMethod,
    /// Percent-encoded path without a leading slash, e.g. `v1/entry/1`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Form-encoded body fields. Empty for `GET`.
    pub form: Vec<(String, String)>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
}

impl PreparedRequest {
    /// Path plus encoded query string, e.g. `v1/user/foo/entries?p=2`.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{}", self.path, query)
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let form: Vec<&str> = self.form.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("PreparedRequest")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("form_fields", &form)
            .field("authorized", &self.authorization.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(token: Option<&'a str>, nick: Option<&'a str>) -> RequestContext<'a> {
        RequestContext {
            api_version: "v1",
            client_secret: "app-secret",
            access_token: token,
            nick,
        }
    }

    fn authed() -> RequestContext<'static> {
        ctx(Some("tok"), Some("foo"))
    }

    #[test]
    fn test_my_entries_page_override() {
        let req = Endpoint::MyEntries
            .build(&Params::new().page(2), &authed())
            .unwrap();
        assert_eq!(req.path_and_query(), "v1/user/foo/entries?p=2");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.authorization.as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_my_entries_default_page() {
        let req = Endpoint::MyEntries.build(&Params::new(), &authed()).unwrap();
        assert_eq!(req.path_and_query(), "v1/user/foo/entries?p=1");
    }

    #[test]
    fn test_entry_has_no_query() {
        let req = Endpoint::Entry
            .build(&Params::new().with("id", 12345), &authed())
            .unwrap();
        assert_eq!(req.path_and_query(), "v1/entry/12345");
        assert!(req.query.is_empty());
        assert!(req.form.is_empty());
    }

    #[test]
    fn test_missing_path_param_fails_fast() {
        let err = Endpoint::Entry.build(&Params::new(), &authed()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { operation: "entry", ref parameter, .. } if parameter == "id"
        ));
    }

    #[test]
    fn test_malformed_id_rejected() {
        for bad in ["", "  ", "12a", "1/2", "-1"] {
            let err = Endpoint::Entry
                .build(&Params::new().with("id", bad), &authed())
                .unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_unauthenticated_before_bind() {
        for endpoint in Endpoint::ALL.iter().filter(|e| e.descriptor().requires_auth) {
            let err = endpoint
                .build(&Params::new(), &ctx(None, None))
                .unwrap_err();
            assert!(
                matches!(err, Error::Unauthenticated(_)),
                "{} returned {:?}",
                endpoint,
                err
            );
        }
    }

    #[test]
    fn test_me_requires_nick() {
        let err = Endpoint::Me
            .build(&Params::new(), &ctx(Some("tok"), None))
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated(_)));
    }

    #[test]
    fn test_nick_is_percent_encoded() {
        let req = Endpoint::User
            .build(&Params::new().with("nick", "ssg kanka/x"), &authed())
            .unwrap();
        assert_eq!(req.path, "v1/user/ssg%20kanka%2Fx");
    }

    #[test]
    fn test_dot_segments_rejected() {
        for (endpoint, name, value) in [
            (Endpoint::User, "nick", ".."),
            (Endpoint::User, "nick", "."),
            (Endpoint::UserEntries, "nick", " .. "),
            (Endpoint::Search, "keywords", "."),
            (Endpoint::Search, "keywords", ".."),
        ] {
            let err = endpoint
                .build(&Params::new().with(name, value), &authed())
                .unwrap_err();
            assert!(
                matches!(err, Error::InvalidParameter { ref parameter, .. } if parameter == name),
                "{} {:?} returned {:?}",
                endpoint,
                value,
                err
            );
        }

        let req = Endpoint::User
            .build(&Params::new().with("nick", "..."), &authed())
            .unwrap();
        assert_eq!(req.path, "v1/user/...");
    }

    #[test]
    fn test_blank_password_sent_as_given() {
        let params = Params::new().with("username", "foo").with("password", "   ");
        let req = Endpoint::Token.build(&params, &ctx(None, None)).unwrap();
        assert_eq!(req.form_value("password"), Some("   "));

        let err = Endpoint::Token
            .build(
                &Params::new().with("username", " ").with("password", "bar"),
                &ctx(None, None),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { ref parameter, .. } if parameter == "username"
        ));
    }

    #[test]
    fn test_token_fixed_fields_win() {
        let params = Params::new()
            .with("username", "foo")
            .with("password", "bar")
            .with("grant_type", "refresh_token")
            .with("client_secret", "forged");
        let req = Endpoint::Token.build(&params, &ctx(None, None)).unwrap();

        assert_eq!(req.path_and_query(), "token");
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.authorization.is_none());
        assert_eq!(req.form_value("grant_type"), Some("password"));
        assert_eq!(req.form_value("client_secret"), Some("app-secret"));
        assert_eq!(req.form_value("username"), Some("foo"));
        assert_eq!(req.form_value("password"), Some("bar"));
        assert_eq!(
            req.form.iter().filter(|(k, _)| k == "grant_type").count(),
            1
        );
    }

    #[test]
    fn test_token_requires_credentials() {
        let err = Endpoint::Token
            .build(&Params::new().with("username", "foo"), &ctx(None, None))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { ref parameter, .. } if parameter == "password"
        ));
    }

    #[test]
    fn test_post_body_params() {
        let req = Endpoint::Vote
            .build(&Params::new().with("id", 99).with("rate", "-1"), &authed())
            .unwrap();
        assert_eq!(req.path_and_query(), "v1/entry/vote");
        assert_eq!(
            req.form,
            vec![
                ("id".to_string(), "99".to_string()),
                ("rate".to_string(), "-1".to_string())
            ]
        );
    }

    #[test]
    fn test_extra_query_params_pass_through() {
        let req = Endpoint::Search
            .build(
                &Params::new().with("keywords", "rust dili").with("sort", "date"),
                &authed(),
            )
            .unwrap();
        assert_eq!(req.path_and_query(), "v1/index/search/rust%20dili?p=1&sort=date");
    }

    #[test]
    fn test_version_without_trailing_slash() {
        let mut context = authed();
        context.api_version = "v2/";
        let req = Endpoint::FeedDebe.build(&Params::new(), &context).unwrap();
        assert_eq!(req.path_and_query(), "v2/index/debe");
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.name().parse::<Endpoint>().unwrap(), *endpoint);
        }
        assert!(matches!(
            "nope".parse::<Endpoint>(),
            Err(Error::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_only_token_is_unauthenticated() {
        let open: Vec<_> = Endpoint::ALL
            .iter()
            .filter(|e| !e.descriptor().requires_auth)
            .collect();
        assert_eq!(open, vec![&Endpoint::Token]);
    }

    #[test]
    fn test_path_params_listing() {
        let params: Vec<_> = Endpoint::UserEntries.descriptor().path_params().collect();
        assert_eq!(params, vec!["nick"]);
        assert!(Endpoint::MyEntries.descriptor().uses_session_nick());
        assert_eq!(Endpoint::MyEntries.descriptor().path_params().count(), 0);
    }
}
