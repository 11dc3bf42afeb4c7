//! End-to-end login flow over the in-memory host.
//!
//! Simulates the three legs an application sees: the initiate redirect, the
//! provider callback, and steady-state authenticated traffic.

mod common;

use anyhow::Result;
use warden::{
    LoginManager, MemoryRequest, MemoryResponse, MemorySession, RequestAuth, ServerSession,
    SessionCache, WebRequest,
};

use common::{StubSettings, login_session};

#[tokio::test]
async fn test_initiate_then_callback_then_steady_state() -> Result<()> {
    let manager = LoginManager::new(SessionCache::new());
    let settings = StubSettings::with_exchange(login_session("key-1"));

    // Leg 1: a fresh visitor hits the login endpoint.
    let mut request = MemoryRequest::new();
    let mut response = MemoryResponse::new();
    let mut auth = RequestAuth::new();
    manager
        .login(&mut request, &mut response, &mut auth, &settings, &[], &[])
        .await?;

    assert_eq!(response.redirected_to(), Some(common::AUTH_URI));
    let session = request.session().expect("initiate starts a server session");
    let session_id = session.id().to_string();
    let session_after_redirect = session.clone();

    // Leg 2: the provider sends the user back with code and state.
    let mut request = MemoryRequest::new()
        .with_session(session_after_redirect)
        .with_query_param("code", "ABC123")
        .with_query_param("state", "s");
    let mut response = MemoryResponse::new();
    let mut auth = RequestAuth::new();
    manager
        .login(&mut request, &mut response, &mut auth, &settings, &[], &[])
        .await?;

    assert!(response.redirected_to().is_none());
    let established = manager
        .oauth_session(&request, &auth)?
        .expect("callback established a session");
    assert_eq!(established.access_token(), "access-1");
    let durable_session = request.session().unwrap().clone();

    // Leg 3: later requests in the same browser session hit the cache; the
    // durable store is never consulted.
    for _ in 0..3 {
        let mut request = MemoryRequest::new().with_session(durable_session.clone());
        let mut auth = RequestAuth::new();
        assert!(
            manager
                .is_logged_in(&mut request, &mut auth, Some(&settings))
                .await
        );
        let resolved = manager.oauth_session(&request, &auth)?;
        assert_eq!(resolved.unwrap().access_token(), "access-1");
    }
    assert_eq!(settings.load_count(), 0, "cache served every check");
    assert_eq!(settings.exchange_count(), 1);
    assert!(manager.cache().lookup(&session_id).is_some());

    Ok(())
}

#[tokio::test]
async fn test_initiate_with_real_settings() -> Result<()> {
    use warden::{OAuthSettings, ProviderEndpoints};

    let manager = LoginManager::new(SessionCache::new());
    let settings = OAuthSettings::new(
        "github",
        ProviderEndpoints::github(),
        "client-1",
        "secret-1",
        "https://app.example.com/callback",
    )
    .with_scopes(vec!["read:user".to_string()]);

    let mut request = MemoryRequest::new();
    let mut response = MemoryResponse::new();
    let mut auth = RequestAuth::new();
    manager
        .login(&mut request, &mut response, &mut auth, &settings, &[], &[])
        .await?;

    let uri = response.redirected_to().expect("initiate redirects");
    assert!(uri.starts_with("https://github.com/login/oauth/authorize?"));
    assert!(uri.contains("client_id=client-1"));
    assert!(uri.contains("state="));
    assert!(request.session().is_some());

    Ok(())
}

#[tokio::test]
async fn test_cold_start_loads_from_store_once() -> Result<()> {
    // Process restart: the cache is empty but the durable store still holds
    // the login.
    let manager = LoginManager::new(SessionCache::new());
    let login = login_session("key-1");
    let settings = StubSettings::with_stored(login.clone());

    let mut durable = MemorySession::with_id("sid-1");
    login.persist(&mut durable)?;

    for _ in 0..3 {
        let mut request = MemoryRequest::new().with_session(durable.clone());
        let mut auth = RequestAuth::new();
        assert!(
            manager
                .is_logged_in(&mut request, &mut auth, Some(&settings))
                .await
        );
    }

    assert_eq!(
        settings.load_count(),
        1,
        "the expensive load ran once per login, not once per request"
    );
    Ok(())
}

#[tokio::test]
async fn test_logged_out_store_invalidates_cache() -> Result<()> {
    let manager = LoginManager::new(SessionCache::new());
    let login = login_session("key-1");
    let settings = StubSettings::default();

    let mut durable = MemorySession::with_id("sid-1");
    login.persist(&mut durable)?;

    let mut request = MemoryRequest::new().with_session(durable.clone());
    let mut auth = RequestAuth::new();
    manager.cache().insert("sid-1", std::sync::Arc::new(login));
    assert!(
        manager
            .is_logged_in(&mut request, &mut auth, Some(&settings))
            .await
    );

    // The host rotated the session store out from under the cache (logout,
    // re-login as someone else). The cached entry must not survive.
    let mut rotated = MemorySession::with_id("sid-1");
    login_session("other-key").persist(&mut rotated)?;

    let mut request = MemoryRequest::new().with_session(rotated);
    let mut auth = RequestAuth::new();
    assert!(
        !manager
            .is_logged_in(&mut request, &mut auth, Some(&settings))
            .await
    );
    assert!(manager.cache().lookup("sid-1").is_none());

    Ok(())
}
