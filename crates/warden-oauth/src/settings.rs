//! Client settings and the settings collaborator contract.

use async_trait::async_trait;
use tracing::{debug, warn};
use warden_web::ServerSession;

use crate::error::Result;
use crate::flow::{self, PkceChallenge};
use crate::provider::ProviderEndpoints;
use crate::session::{OAuthSession, SESSION_SLOT};

/// Session-store key holding the CSRF state nonce between redirect and
/// callback.
const STATE_SLOT: &str = "oauth.state";

/// Session-store key holding the PKCE verifier between redirect and
/// callback.
const VERIFIER_SLOT: &str = "oauth.verifier";

/// The settings collaborator the login manager drives.
///
/// One implementation is bound to one provider + client configuration. The
/// manager never inspects tokens or URLs itself; it only orchestrates these
/// three operations.
#[async_trait]
pub trait AuthSettings: Send + Sync {
    /// Build the provider authorization URL for a fresh login, parking
    /// whatever transient material the callback will need (state nonce,
    /// PKCE verifier) in the server session.
    async fn user_auth_uri(
        &self,
        session: &mut dyn ServerSession,
        extra_params: &[(String, String)],
        scopes: &[String],
    ) -> Result<String>;

    /// Exchange a callback's code for a verified session.
    ///
    /// `Ok(None)` means the provider or the CSRF check rejected the login
    /// (a routine outcome, not an error). On success the established session
    /// has been written into the server session store as durable state.
    async fn user_session(
        &self,
        session: &mut dyn ServerSession,
        state: &str,
        code: &str,
    ) -> Result<Option<OAuthSession>>;

    /// Load and verify a session from the durable server session store.
    ///
    /// The expensive path: decodes persisted credentials and may talk to the
    /// provider to refresh an expired access token (persisting the result
    /// back). `Ok(None)` when the store holds no usable login.
    async fn load_session(&self, session: &mut dyn ServerSession) -> Result<Option<OAuthSession>>;
}

/// Settings for one OAuth 2.0 provider + client registration.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    provider_name: String,
    endpoints: ProviderEndpoints,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    default_scopes: Vec<String>,
    http: reqwest::Client,
}

impl OAuthSettings {
    /// Bind a provider to a client registration.
    pub fn new(
        provider_name: impl Into<String>,
        endpoints: ProviderEndpoints,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            endpoints,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            default_scopes: Vec::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Scopes requested when the caller passes none.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Provider name this client is registered with.
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// The client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl AuthSettings for OAuthSettings {
    async fn user_auth_uri(
        &self,
        session: &mut dyn ServerSession,
        extra_params: &[(String, String)],
        scopes: &[String],
    ) -> Result<String> {
        let state = flow::random_token();
        let pkce = PkceChallenge::generate();
        session.set(STATE_SLOT, &state);
        session.set(VERIFIER_SLOT, &pkce.verifier);

        let scopes = if scopes.is_empty() {
            self.default_scopes.as_slice()
        } else {
            scopes
        };

        Ok(flow::build_authorization_url(
            &self.endpoints,
            &self.client_id,
            &self.redirect_uri,
            scopes,
            &state,
            &pkce.challenge,
            extra_params,
        ))
    }

    async fn user_session(
        &self,
        session: &mut dyn ServerSession,
        state: &str,
        code: &str,
    ) -> Result<Option<OAuthSession>> {
        let Some(expected) = session.get(STATE_SLOT) else {
            warn!(provider = %self.provider_name, "callback without a pending state nonce");
            return Ok(None);
        };
        if expected != state {
            warn!(provider = %self.provider_name, "state mismatch on callback, rejecting code");
            return Ok(None);
        }
        let verifier = session.get(VERIFIER_SLOT).unwrap_or_default();

        let tokens = flow::exchange_code(
            &self.http,
            &self.endpoints,
            &self.client_id,
            &self.client_secret,
            &self.redirect_uri,
            code,
            &verifier,
        )
        .await?;

        session.remove(STATE_SLOT);
        session.remove(VERIFIER_SLOT);

        let established =
            OAuthSession::new(self.provider_name.as_str(), tokens, flow::random_token());
        established.persist(session)?;
        debug!(provider = %self.provider_name, "callback exchange established a session");

        Ok(Some(established))
    }

    async fn load_session(&self, session: &mut dyn ServerSession) -> Result<Option<OAuthSession>> {
        let Some(raw) = session.get(SESSION_SLOT) else {
            return Ok(None);
        };
        let stored: OAuthSession = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "stored session is not decodable, discarding");
                return Ok(None);
            }
        };

        if !stored.verify(&*session) {
            debug!("stored session failed key verification");
            return Ok(None);
        }
        if stored.provider() != self.provider_name {
            debug!(
                stored = %stored.provider(),
                expected = %self.provider_name,
                "stored session belongs to a different provider"
            );
            return Ok(None);
        }

        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        // Expired access token: refresh on demand, or give up.
        let Some(refresh_token) = stored.refresh_token() else {
            debug!(provider = %self.provider_name, "stored session expired with no refresh token");
            return Ok(None);
        };
        let tokens = flow::refresh_tokens(
            &self.http,
            &self.endpoints,
            &self.client_id,
            &self.client_secret,
            refresh_token,
        )
        .await?;

        let refreshed = stored.with_tokens(tokens);
        refreshed.persist(session)?;
        debug!(provider = %self.provider_name, "stored session refreshed");

        Ok(Some(refreshed))
    }
}
