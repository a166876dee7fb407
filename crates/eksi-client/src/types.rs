//! Request and response types for the Eksi API.
//!
//! Upstream payloads are opaque: responses are surfaced as [`ApiResponse`]
//! and only the token grant and the self lookup are ever decoded.

use std::collections::HashMap;
use std::fmt;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v1";

// ─────────────────────────────────────────────────────────────────────────────
// Identity and credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Long-lived application identity.
///
/// Fixed at construction. Empty values are accepted; a bad `base_uri` only
/// shows up once a request is attempted.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Base URI of the upstream API (or a forwarding proxy in front of it).
    pub base_uri: String,
    /// Application secret sent with every password grant.
    pub client_secret: String,
    /// Version path segment, without slashes.
    pub api_version: String,
}

impl ClientIdentity {
    /// Create an identity using the default API version.
    pub fn new(base_uri: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            client_secret: client_secret.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the API version. Leading and trailing slashes are dropped, so
    /// `"v1/"` and `"v1"` are the same version.
    pub fn with_api_version(mut self, version: impl AsRef<str>) -> Self {
        self.api_version = version.as_ref().trim_matches('/').to_string();
        self
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("base_uri", &self.base_uri)
            .field("client_secret", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Username/password pair for the password grant. Consumed by the call.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// A complete authenticated identity: token plus the user it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub access_token: String,
    pub nick: String,
    pub user_id: u64,
}

impl fmt::Debug for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionInfo")
            .field("access_token", &"<redacted>")
            .field("nick", &self.nick)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Successful password-grant response.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Any other fields the token endpoint returned.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Profile returned by the self lookup, either bare or wrapped in `Data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SelfProfile {
    Wrapped {
        #[serde(alias = "Data", alias = "data")]
        data: ProfileFields,
    },
    Bare(ProfileFields),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileFields {
    #[serde(alias = "Nick", alias = "UserNick")]
    pub nick: String,
    #[serde(alias = "UserId", alias = "Id", alias = "id", alias = "userId")]
    pub user_id: u64,
}

impl SelfProfile {
    pub(crate) fn into_fields(self) -> ProfileFields {
        match self {
            SelfProfile::Wrapped { data } => data,
            SelfProfile::Bare(fields) => fields,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// Upstream response, passed through without reinterpretation.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operation arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of an entry vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Wire value of the `rate` field.
    pub fn rate(self) -> &'static str {
        match self {
            Vote::Up => "1",
            Vote::Down => "-1",
        }
    }
}
