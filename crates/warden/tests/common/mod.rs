//! Shared test fixtures for the integration suites.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use warden::{AuthSettings, OAuthSession, Result, ServerSession, TokenSet};

pub const AUTH_URI: &str = "https://id.example.com/authorize?state=s";

/// Token set that never expires.
pub fn fresh_tokens() -> TokenSet {
    TokenSet {
        access_token: "access-1".to_string(),
        refresh_token: None,
        token_type: "Bearer".to_string(),
        expires_in: None,
        scope: Some("read:user".to_string()),
        expires_at: None,
    }
}

/// A login session bound to `key`.
pub fn login_session(key: &str) -> OAuthSession {
    OAuthSession::new("github", fresh_tokens(), key)
}

/// Settings double that counts collaborator calls and serves canned
/// outcomes, standing in for a provider that cannot be reached from tests.
#[derive(Default)]
pub struct StubSettings {
    pub exchange_result: Option<OAuthSession>,
    pub stored_result: Option<OAuthSession>,
    pub exchange_calls: AtomicU32,
    pub load_calls: AtomicU32,
}

impl StubSettings {
    pub fn with_exchange(session: OAuthSession) -> Self {
        Self {
            exchange_result: Some(session),
            ..Self::default()
        }
    }

    pub fn with_stored(session: OAuthSession) -> Self {
        Self {
            stored_result: Some(session),
            ..Self::default()
        }
    }

    pub fn exchange_count(&self) -> u32 {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn load_count(&self) -> u32 {
        self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthSettings for StubSettings {
    async fn user_auth_uri(
        &self,
        session: &mut dyn ServerSession,
        _extra_params: &[(String, String)],
        _scopes: &[String],
    ) -> Result<String> {
        session.set("oauth.state", "s");
        Ok(AUTH_URI.to_string())
    }

    async fn user_session(
        &self,
        session: &mut dyn ServerSession,
        _state: &str,
        _code: &str,
    ) -> Result<Option<OAuthSession>> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(established) = &self.exchange_result {
            established.persist(session)?;
        }
        Ok(self.exchange_result.clone())
    }

    async fn load_session(&self, _session: &mut dyn ServerSession) -> Result<Option<OAuthSession>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored_result.clone())
    }
}
