//! The login manager: fast authenticated-request checks and the two-step
//! redirect/callback dance.

use std::sync::Arc;

use tracing::{debug, trace, warn};
use warden_session::SessionCache;
use warden_web::{ServerSession, WebRequest, WebResponse};

use crate::error::{OAuthError, Result};
use crate::session::OAuthSession;
use crate::settings::AuthSettings;

/// How [`LoginManager::oauth_session`] treats calls that arrive before any
/// authentication check ran on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreconditionMode {
    /// Violations return [`OAuthError::CheckNotPerformed`].
    #[default]
    Strict,
    /// Violations fall through to the cache; the caller may observe a
    /// session that was never verified during this request.
    Fast,
}

/// Per-request authentication context.
///
/// Create one per request and pass it to every manager call for that
/// request. Records that a check ran, and carries the session resolved
/// mid-request so later code does not go back to the cache.
#[derive(Debug, Clone, Default)]
pub struct RequestAuth {
    checked: bool,
    session: Option<Arc<OAuthSession>>,
}

impl RequestAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an authentication check already ran for this request.
    pub fn checked(&self) -> bool {
        self.checked
    }
}

/// Orchestrates login initiation, callback handling, and per-request
/// authentication checks against an injected [`SessionCache`].
///
/// Under steady-state traffic the expensive store-backed load runs once per
/// login; every later request inside the cache's validity window settles
/// with a key comparison against the request's own session.
///
/// The cache is keyed by server-session identifier alone. Deployments with
/// several OAuth providers should run one manager (with its own cache) per
/// provider, so a login under one provider is never reported for another.
#[derive(Clone)]
pub struct LoginManager {
    cache: SessionCache<Arc<OAuthSession>>,
    mode: PreconditionMode,
}

impl LoginManager {
    /// Create a manager around an injected cache, in strict mode.
    pub fn new(cache: SessionCache<Arc<OAuthSession>>) -> Self {
        Self {
            cache,
            mode: PreconditionMode::Strict,
        }
    }

    /// Select the precondition mode for [`oauth_session`](Self::oauth_session).
    pub fn with_mode(mut self, mode: PreconditionMode) -> Self {
        self.mode = mode;
        self
    }

    /// The underlying cache.
    pub fn cache(&self) -> &SessionCache<Arc<OAuthSession>> {
        &self.cache
    }

    /// Fast authentication check, meant to run on every request that needs
    /// access control.
    ///
    /// Resolution order: no server session → false; cache hit → cheap
    /// re-verification (success refreshes the entry's timestamp, failure
    /// evicts the stale entry); cache miss with `settings` → store-backed
    /// load, cached on success. Collaborator failures degrade to false.
    pub async fn is_logged_in<R: WebRequest>(
        &self,
        request: &mut R,
        auth: &mut RequestAuth,
        settings: Option<&dyn AuthSettings>,
    ) -> bool {
        auth.checked = true;

        let Some(session) = request.session_mut() else {
            trace!("request carries no server session");
            return false;
        };
        let session_id = session.id().to_string();

        if let Some(entry) = self.cache.lookup(&session_id) {
            if entry.value.verify(&*session) {
                self.cache.touch(&session_id);
                trace!(session_id = %session_id, "cached session confirmed");
                return true;
            }
            debug!(session_id = %session_id, "cached session failed re-verification, evicting");
            self.cache.remove(&session_id);
        }

        let Some(settings) = settings else {
            return false;
        };
        match settings.load_session(session).await {
            Ok(Some(loaded)) => {
                let shared = Arc::new(loaded);
                auth.session = Some(Arc::clone(&shared));
                self.cache.insert(&session_id, shared);
                debug!(session_id = %session_id, "session loaded from store and cached");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "session load failed");
                false
            }
        }
    }

    /// Drive the login state machine for this request.
    ///
    /// A request that already has a server session and carries both `code`
    /// and `state` query parameters is a provider callback: the code is
    /// exchanged, and on success the session is cached. A rejected or failed
    /// exchange mutates nothing and issues no redirect; the caller observes
    /// the outcome through [`oauth_session`](Self::oauth_session).
    ///
    /// Any other request initiates a login: a server session is started if
    /// needed and the response is redirected to the provider's authorization
    /// URL, built with the given extra query parameters and scopes.
    pub async fn login<R: WebRequest, W: WebResponse>(
        &self,
        request: &mut R,
        response: &mut W,
        auth: &mut RequestAuth,
        settings: &dyn AuthSettings,
        extra_params: &[(String, String)],
        scopes: &[String],
    ) -> Result<()> {
        let code = request.query_param("code").map(str::to_owned);
        let state = request.query_param("state").map(str::to_owned);

        if let Some(session) = request.session_mut() {
            if let (Some(code), Some(state)) = (code.as_deref(), state.as_deref()) {
                auth.checked = true;
                let session_id = session.id().to_string();
                match settings.user_session(session, state, code).await {
                    Ok(Some(established)) => {
                        let shared = Arc::new(established);
                        auth.session = Some(Arc::clone(&shared));
                        self.cache.insert(&session_id, shared);
                        debug!(session_id = %session_id, "callback exchange succeeded, session cached");
                    }
                    Ok(None) => {
                        debug!(session_id = %session_id, "callback exchange rejected, request stays unauthenticated");
                    }
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "callback exchange failed");
                    }
                }
                return Ok(());
            }
        }

        let session = request.start_session();
        let session_id = session.id().to_string();
        let uri = settings.user_auth_uri(session, extra_params, scopes).await?;
        debug!(session_id = %session_id, "redirecting to provider authorization URL");
        response.redirect(&uri);
        Ok(())
    }

    /// Fast accessor for the request's authenticated session.
    ///
    /// Precondition: [`is_logged_in`](Self::is_logged_in) or
    /// [`login`](Self::login) already ran for this exact request. In strict
    /// mode a violation returns [`OAuthError::CheckNotPerformed`]; in fast
    /// mode the lookup proceeds and may surface a cached session nothing
    /// re-verified during this request.
    ///
    /// Performs no verification and never mutates the cache.
    pub fn oauth_session<R: WebRequest>(
        &self,
        request: &R,
        auth: &RequestAuth,
    ) -> Result<Option<Arc<OAuthSession>>> {
        if !auth.checked && self.mode == PreconditionMode::Strict {
            return Err(OAuthError::CheckNotPerformed);
        }

        if let Some(session) = &auth.session {
            return Ok(Some(Arc::clone(session)));
        }

        let Some(session) = request.session() else {
            return Ok(None);
        };
        Ok(self.cache.lookup(session.id()).map(|entry| entry.value))
    }
}
