//! The verified login session entity.

use serde::{Deserialize, Serialize};
use warden_web::ServerSession;

use crate::error::{OAuthError, Result};
use crate::flow::TokenSet;

/// Session-store key holding the verification key of the current login.
pub(crate) const KEY_SLOT: &str = "oauth.key";

/// Session-store key holding the serialized session.
pub(crate) const SESSION_SLOT: &str = "oauth.session";

/// A completed OAuth login.
///
/// Carries the provider tokens plus a random verification key that is
/// mirrored into the server session store when the login is established.
/// [`verify`](Self::verify) compares the two copies: if the store no longer
/// holds this login (cleared, or replaced by a newer login), the keys stop
/// matching and the cached entity is stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthSession {
    provider: String,
    tokens: TokenSet,
    key: String,
}

impl OAuthSession {
    /// Create a session for `provider` with a verification key.
    ///
    /// Library code mints the key during the callback exchange; hosts only
    /// construct sessions directly in tests or data migrations.
    pub fn new(provider: impl Into<String>, tokens: TokenSet, key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tokens,
            key: key.into(),
        }
    }

    /// Cheap consistency check against the current server session state.
    ///
    /// Pure key comparison, no I/O.
    pub fn verify(&self, session: &dyn ServerSession) -> bool {
        session.get(KEY_SLOT).as_deref() == Some(self.key.as_str())
    }

    /// Write this session into the server session store as durable state:
    /// the serialized session plus its verification key.
    pub fn persist(&self, session: &mut dyn ServerSession) -> Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| OAuthError::Serialization(format!("Failed to serialize session: {}", e)))?;
        session.set(SESSION_SLOT, &json);
        session.set(KEY_SLOT, &self.key);
        Ok(())
    }

    /// Provider this login belongs to.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The current access token.
    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    /// The refresh token, if the provider issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.refresh_token.as_deref()
    }

    /// Scopes granted by the provider.
    pub fn scopes(&self) -> Vec<&str> {
        self.tokens
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the access token is expired.
    pub fn is_expired(&self) -> bool {
        self.tokens.is_expired()
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// Same login with a replacement token set (after a refresh).
    pub(crate) fn with_tokens(&self, tokens: TokenSet) -> Self {
        Self {
            provider: self.provider.clone(),
            tokens,
            key: self.key.clone(),
        }
    }
}
