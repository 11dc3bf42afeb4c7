//! Error types for the OAuth login layer.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur in the OAuth login layer.
///
/// Routine negative outcomes (no session yet, a rejected code, a stale cache
/// entry) are not errors; they surface as `false` or `None`.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Network/HTTP error talking to the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider returned an error response.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The session accessor ran before any authentication check on this
    /// request. Raised in strict mode only.
    #[error("authentication check has not run for this request")]
    CheckNotPerformed,
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        OAuthError::Network(e.to_string())
    }
}
