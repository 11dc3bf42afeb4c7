//! Provider endpoint configuration.

/// Authorization and token endpoints of an OAuth 2.0 provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    /// Where the user agent is sent to approve the login.
    pub authorize_url: String,

    /// Where authorization codes are exchanged for tokens.
    pub token_url: String,
}

impl ProviderEndpoints {
    /// Endpoints for an arbitrary provider.
    pub fn new(authorize_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
        }
    }

    /// GitHub OAuth endpoints.
    pub fn github() -> Self {
        Self::new(
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
        )
    }

    /// Google OAuth endpoints.
    pub fn google() -> Self {
        Self::new(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "https://oauth2.googleapis.com/token",
        )
    }
}
