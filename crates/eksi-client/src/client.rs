//! Main client implementation.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::api::{EntriesApi, FeedsApi, TopicsApi, UsersApi};
use crate::catalog::{Endpoint, HttpMethod, Params, PreparedRequest, RequestContext};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::{
    ApiResponse, ClientIdentity, Credentials, DEFAULT_API_VERSION, SelfProfile, SessionInfo,
    TokenGrant,
};

/// Eksi API client.
///
/// Owns one [`ClientIdentity`] and one [`Session`] for its lifetime. Clones
/// share both, so binding a session through one clone is visible to all.
///
/// Constructing a client never touches the network.
///
/// # Example
///
/// ```no_run
/// use eksi_client::{Credentials, EksiClient};
///
/// # async fn example() -> eksi_client::Result<()> {
/// let client = EksiClient::builder()
///     .uri("http://localhost:9000")
///     .client_secret("app-secret")
///     .build()?;
///
/// let me = client.authenticate(Credentials::new("nick", "password")).await?;
/// println!("Logged in as {}", me.nick);
///
/// let entries = client.users().my_entries(Some(2)).await?;
/// println!("{}", entries.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EksiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    identity: ClientIdentity,
    session: Session,
}

impl EksiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for `uri` with the default API version.
    pub fn new(uri: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::builder().uri(uri).client_secret(client_secret).build()
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.inner.identity
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the password grant without touching the session.
    pub async fn request_token(&self, credentials: Credentials) -> Result<TokenGrant> {
        let params = Params::new()
            .with("username", credentials.username)
            .with("password", credentials.password);
        let prepared = Endpoint::Token.build(&params, &self.context(None, None))?;
        let response = self.execute(&prepared).await?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "Password grant rejected");
            return Err(Error::Auth {
                status: response.status,
                body: response.text(),
            });
        }

        response.json()
    }

    /// Authenticate and bind the session.
    ///
    /// Performs the password grant, looks up the token owner's nick and id,
    /// then binds all three at once. On any failure the session is left as it
    /// was.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<SessionInfo> {
        let grant = self.request_token(credentials).await?;

        let prepared = Endpoint::SelfProfile.build(
            &Params::new(),
            &self.context(Some(&grant.access_token), None),
        )?;
        let response = ensure_success(self.execute(&prepared).await?)?;
        let profile = response.json::<SelfProfile>()?.into_fields();

        let info = SessionInfo {
            access_token: grant.access_token,
            nick: profile.nick,
            user_id: profile.user_id,
        };
        self.inner.session.bind(info.clone());
        tracing::info!(nick = %info.nick, "Authenticated");
        Ok(info)
    }

    /// Install an identity obtained elsewhere.
    pub fn bind(&self, info: SessionInfo) {
        self.inner.session.bind(info);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a request against the current session without sending it.
    pub fn prepare(&self, endpoint: Endpoint, params: &Params) -> Result<PreparedRequest> {
        let session = self.inner.session.info();
        let ctx = self.context(
            session.as_ref().map(|s| s.access_token.as_str()),
            session.as_ref().map(|s| s.nick.as_str()),
        );
        endpoint.build(params, &ctx)
    }

    /// Run one catalog operation.
    ///
    /// The upstream status and body are returned untouched. Non-2xx answers
    /// become [`Error::Upstream`], or [`Error::Auth`] for the token request.
    pub async fn invoke(&self, endpoint: Endpoint, params: &Params) -> Result<ApiResponse> {
        let prepared = self.prepare(endpoint, params)?;
        let response = self.execute(&prepared).await?;

        if endpoint == Endpoint::Token && !response.is_success() {
            return Err(Error::Auth {
                status: response.status,
                body: response.text(),
            });
        }
        ensure_success(response)
    }

    /// Run a catalog operation by name.
    pub async fn invoke_named(&self, operation: &str, params: &Params) -> Result<ApiResponse> {
        let endpoint: Endpoint = operation.parse()?;
        self.invoke(endpoint, params).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the entries API.
    pub fn entries(&self) -> EntriesApi {
        EntriesApi::new(self.clone())
    }

    /// Access the topics API.
    pub fn topics(&self) -> TopicsApi {
        TopicsApi::new(self.clone())
    }

    /// Access the feeds API.
    pub fn feeds(&self) -> FeedsApi {
        FeedsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    fn context<'a>(
        &'a self,
        access_token: Option<&'a str>,
        nick: Option<&'a str>,
    ) -> RequestContext<'a> {
        RequestContext {
            api_version: &self.inner.identity.api_version,
            client_secret: &self.inner.identity.client_secret,
            access_token,
            nick,
        }
    }

    /// Resolve a relative path against the base URI.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let mut base = Url::parse(&self.inner.identity.base_uri)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path.trim_start_matches('/')).map_err(Error::from)
    }

    /// Send a prepared request and collect the response, whatever its status.
    async fn execute(&self, prepared: &PreparedRequest) -> Result<ApiResponse> {
        let url = self.url(&prepared.path_and_query())?;
        tracing::debug!(
            operation = %prepared.endpoint,
            method = prepared.method.as_str(),
            path = %prepared.path,
            "Dispatching request"
        );

        let mut request = self.inner.http.request(prepared.method.into(), url);
        if let Some(value) = &prepared.authorization {
            request = request.header(AUTHORIZATION, value);
        }
        if prepared.method == HttpMethod::Post {
            request = request.form(&prepared.form);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn ensure_success(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    tracing::warn!(status = response.status, "Upstream returned an error");
    Err(Error::Upstream {
        status: response.status,
        body: response.text(),
    })
}

/// Builder for creating an [`EksiClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    uri: String,
    client_secret: String,
    api_version: String,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            uri: String::new(),
            client_secret: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: None,
        }
    }

    /// Set the base URI of the API (or of a forwarding proxy).
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Set the application secret.
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = secret.into();
        self
    }

    /// Set the API version segment. Surrounding slashes are ignored.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use every field of an existing identity.
    pub fn identity(self, identity: ClientIdentity) -> Self {
        self.uri(identity.base_uri)
            .client_secret(identity.client_secret)
            .api_version(identity.api_version)
    }

    /// Build the client.
    ///
    /// An empty URI or secret is accepted here and only fails once a request
    /// is attempted.
    pub fn build(self) -> Result<EksiClient> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("eksi-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        let identity =
            ClientIdentity::new(self.uri, self.client_secret).with_api_version(self.api_version);

        Ok(EksiClient {
            inner: Arc::new(ClientInner {
                http,
                identity,
                session: Session::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
