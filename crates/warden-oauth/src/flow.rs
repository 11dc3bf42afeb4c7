//! OAuth 2.0 authorization-code flow primitives.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{OAuthError, Result};
use crate::provider::ProviderEndpoints;

/// Buffer before expiry during which a token already counts as expired.
const REFRESH_BUFFER_SECS: i64 = 5 * 60;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Tokens returned by the provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,

    /// Absolute expiry, stamped at exchange time from `expires_in`.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Whether the access token is expired (or close enough to expiry that
    /// it should be refreshed before use). Tokens without an expiry never
    /// expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(at) => Utc::now() >= at - Duration::seconds(REFRESH_BUFFER_SECS),
        }
    }

    fn stamp_expiry(&mut self) {
        if let Some(secs) = self.expires_in {
            self.expires_at = Some(Utc::now() + Duration::seconds(secs as i64));
        }
    }
}

/// PKCE code verifier and challenge pair.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair (S256).
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge_bytes = hasher.finalize();
        let challenge = URL_SAFE_NO_PAD.encode(challenge_bytes);

        Self {
            verifier,
            challenge,
        }
    }
}

/// Generate a random URL-safe token, used for CSRF state nonces and session
/// verification keys.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the provider authorization URL for the redirect leg of the flow.
pub fn build_authorization_url(
    endpoints: &ProviderEndpoints,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
    challenge: &str,
    extra_params: &[(String, String)],
) -> String {
    let scope = scopes.join(" ");
    let mut params: Vec<(&str, &str)> = vec![
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("code_challenge", challenge),
        ("code_challenge_method", "S256"),
        ("state", state),
    ];
    if !scope.is_empty() {
        params.push(("scope", &scope));
    }
    for (k, v) in extra_params {
        params.push((k, v));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", endpoints.authorize_url, query)
}

/// Exchange an authorization code for tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    endpoints: &ProviderEndpoints,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<TokenSet> {
    let params = [
        ("grant_type", "authorization_code"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
        ("code", code),
        ("code_verifier", verifier),
    ];

    let response = http
        .post(&endpoints.token_url)
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("Token exchange request failed: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(OAuthError::Provider(format!(
            "Token exchange failed: {}",
            error_text
        )));
    }

    let mut tokens: TokenSet = response
        .json()
        .await
        .map_err(|e| OAuthError::Provider(format!("Failed to parse token response: {}", e)))?;
    tokens.stamp_expiry();

    Ok(tokens)
}

/// Refresh an access token using a refresh token.
pub async fn refresh_tokens(
    http: &reqwest::Client,
    endpoints: &ProviderEndpoints,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenSet> {
    let params = [
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
    ];

    let response = http
        .post(&endpoints.token_url)
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("Token refresh request failed: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(OAuthError::Provider(format!(
            "Token refresh failed: {}",
            error_text
        )));
    }

    let mut tokens: TokenSet = response
        .json()
        .await
        .map_err(|e| OAuthError::Provider(format!("Failed to parse refresh response: {}", e)))?;

    // Providers may omit the refresh token on rotation; keep the old one.
    if tokens.refresh_token.is_none() {
        tokens.refresh_token = Some(refresh_token.to_string());
    }
    tokens.stamp_expiry();

    Ok(tokens)
}
