//! CLI command handlers.

pub mod call;
pub mod entry;
pub mod feed;
pub mod me;
pub mod operations;
pub mod token;
pub mod topic;

use anyhow::{Context as _, Result, bail};
use console::Style;
use eksi_client::{ApiResponse, Credentials, EksiClient, SessionInfo};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// API base URI.
    pub uri: String,
    /// Application client secret.
    pub client_secret: Option<String>,
    /// API version path segment.
    pub api_version: String,
    /// Account nick.
    pub username: Option<String>,
    /// Account password; prompted for when absent.
    pub password: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build an unauthenticated client. No request is sent.
    pub fn client(&self) -> Result<EksiClient> {
        let Some(secret) = self.client_secret.as_deref() else {
            bail!("no client secret given (use --client-secret or EKSI_CLIENT_SECRET)");
        };
        let client = EksiClient::builder()
            .uri(&self.uri)
            .client_secret(secret)
            .api_version(&self.api_version)
            .build()?;
        Ok(client)
    }

    /// Username and password, prompting for the password when needed.
    pub fn credentials(&self) -> Result<Credentials> {
        let Some(username) = self.username.clone() else {
            bail!("no username given (use --username or EKSI_USERNAME)");
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password(format!("Password for {}: ", username))
                .context("failed to read password")?,
        };
        Ok(Credentials::new(username, password))
    }

    /// Build a client and log it in.
    pub async fn login(&self) -> Result<(EksiClient, SessionInfo)> {
        let client = self.client()?;
        let session = client
            .authenticate(self.credentials()?)
            .await
            .context("login failed")?;
        tracing::debug!(nick = %session.nick, "Logged in");
        Ok((client, session))
    }
}

/// Print an API response as JSON or as a status line plus body.
pub fn print_response(response: &ApiResponse, ctx: &Context) -> Result<()> {
    let body: Option<serde_json::Value> = response.json().ok();

    if ctx.json_output {
        let output = serde_json::json!({
            "status": response.status,
            "body": body.unwrap_or_else(|| serde_json::Value::String(response.text())),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let status_style = if response.is_success() {
        Style::new().green()
    } else {
        Style::new().red()
    };
    println!("{}", status_style.apply_to(format!("HTTP {}", response.status)));
    match body {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("{}", response.text()),
    }
    Ok(())
}
