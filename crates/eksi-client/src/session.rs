//! Per-user session state.
//!
//! The session starts empty and is filled in one step by [`Session::bind`].
//! There is no refresh path: a token stays bound until the next `bind`.
//!
//! Concurrent use of one client is not serialized. An operation racing an
//! `authenticate` call may see either the old or the new session; callers
//! that depend on the identity must await `authenticate` first.

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::SessionInfo;

/// Mutable session slot shared by all clones of a client.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionInfo>>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace token, nick and user id together.
    pub fn bind(&self, info: SessionInfo) {
        tracing::debug!(nick = %info.nick, user_id = info.user_id, "Binding session");
        *self.state.write() = Some(info);
    }

    /// Copy of the bound identity, if any.
    pub fn info(&self) -> Option<SessionInfo> {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    /// Nick of the bound user.
    pub fn nick(&self) -> Option<String> {
        self.state.read().as_ref().map(|info| info.nick.clone())
    }

    /// `Authorization` header value for the bound token.
    pub fn authorization_header(&self) -> Result<String> {
        self.state
            .read()
            .as_ref()
            .map(|info| bearer(&info.access_token))
            .ok_or_else(|| Error::Unauthenticated("no session is bound".to_string()))
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
